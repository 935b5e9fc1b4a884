//! Prompt construction for the generative model.

use std::collections::HashMap;
use std::fmt::Write;

use crate::article::{ArticleIndex, Token};
use crate::settings::settings;

/// Per-category document summary: the most frequent surfaces with their
/// occurrence counts. Documents below the configured size get a fixed
/// "insufficient information" line instead.
pub fn article_summary(index: &ArticleIndex) -> String {
    let p = &settings().prompt;
    if index.all_tokens().len() < p.min_summary_tokens {
        return "記事情報が不足しています".to_string();
    }

    let mut summary = String::from("この記事には以下の主要要素が含まれています:\n");
    for &category in index.categories() {
        // Count per-surface occurrences within this category, keeping
        // first-appearance order so ties are deterministic.
        let mut order: Vec<(&str, u32)> = Vec::new();
        let mut by_surface: HashMap<&str, usize> = HashMap::new();
        for token in index.all_tokens() {
            if token.category != category {
                continue;
            }
            match by_surface.get(token.surface.as_str()) {
                Some(&idx) => order[idx].1 += 1,
                None => {
                    by_surface.insert(token.surface.as_str(), order.len());
                    order.push((token.surface.as_str(), 1));
                }
            }
        }
        order.sort_by(|a, b| b.1.cmp(&a.1));
        let listed: Vec<String> = order
            .iter()
            .take(p.summary_top_n)
            .map(|(surface, freq)| format!("{surface}({freq}回)"))
            .collect();
        if !listed.is_empty() {
            let _ = writeln!(summary, "- {}: {}", category, listed.join(", "));
        }
    }
    summary
}

/// Build the full prediction prompt: category-tagged history, document
/// summary, and the JSON output contract the parser expects.
pub fn build_prompt(history: &[Token], index: &ArticleIndex) -> String {
    let history_lines: Vec<String> = history
        .iter()
        .map(|t| format!("- \"{}\" ({})", t.surface, t.category))
        .collect();

    format!(
        r#"
JSON: 以下は記事のこれまでのトークン列とカテゴリです。これに続く最も可能性の高い語句を3つ、確率付きで予測してください。

【これまでのトークンとカテゴリ】
{}

【記事の概要】
{}

【指示】
1. 上記の文脈とトークン候補から、次に最も自然に続くと思われるトークンを3つ選んでください。
2. 回答は必ず以下のJSON形式のみで提供してください:

[
  {{"token": "最適候補", "category": "カテゴリ名", "score": 0.9}},
  {{"token": "次善候補", "category": "カテゴリ名", "score": 0.8}},
  {{"token": "第三候補", "category": "カテゴリ名", "score": 0.7}}
]
"#,
        history_lines.join("\n"),
        article_summary(index)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleIndex;
    use crate::category::TokenCategory::{General, ProperNoun};

    fn rich_index() -> ArticleIndex {
        let mut tokens = vec![Token::new("東京", ProperNoun), Token::new("東京", ProperNoun)];
        for i in 0..10 {
            tokens.push(Token::new(format!("語{i}"), General));
        }
        ArticleIndex::build(tokens).unwrap()
    }

    #[test]
    fn test_summary_lists_frequent_surfaces() {
        let summary = article_summary(&rich_index());
        assert!(summary.contains("固有名詞: 東京(2回)"));
        assert!(summary.contains("一般:"));
    }

    #[test]
    fn test_summary_caps_per_category() {
        let summary = article_summary(&rich_index());
        let general_line = summary.lines().find(|l| l.contains("一般")).unwrap();
        assert_eq!(general_line.matches("回)").count(), 5);
    }

    #[test]
    fn test_short_document_summary() {
        let index = ArticleIndex::build(vec![Token::new("短い", General)]).unwrap();
        assert_eq!(article_summary(&index), "記事情報が不足しています");
    }

    #[test]
    fn test_prompt_tags_history() {
        let history = vec![Token::new("東京", ProperNoun)];
        let prompt = build_prompt(&history, &rich_index());
        assert!(prompt.contains("- \"東京\" (固有名詞)"));
        assert!(prompt.contains("JSON形式"));
        assert!(prompt.contains("\"token\""));
    }
}
