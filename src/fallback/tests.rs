use crate::article::{ArticleIndex, Token};
use crate::category::TokenCategory::{self, General, Numeric, ProperNoun, Symbol};

use super::*;

fn tok(surface: &str, category: TokenCategory) -> Token {
    Token::new(surface, category)
}

fn index_of(tokens: Vec<Token>) -> ArticleIndex {
    ArticleIndex::build(tokens).unwrap()
}

fn shibuya_article() -> ArticleIndex {
    index_of(vec![
        tok("昨日", General),
        tok("東京", ProperNoun),
        tok("都", General),
        tok("渋谷区", ProperNoun),
        tok("に", General),
        tok("行った", General),
        tok("。", Symbol),
    ])
}

#[test]
fn test_ngram_surfaces_document_continuation() {
    let index = shibuya_article();
    let history = vec![tok("東京", ProperNoun), tok("都", General)];
    let candidates = ngram::predict(&history, &index);
    assert_eq!(candidates[0].surface, "渋谷区");
    assert!(candidates[0].score >= 0.5);
}

#[test]
fn test_ngram_repeat_bonus() {
    // 東京 都 appears twice, both times followed by 渋谷区
    let index = index_of(vec![
        tok("東京", ProperNoun),
        tok("都", General),
        tok("渋谷区", ProperNoun),
        tok("と", General),
        tok("東京", ProperNoun),
        tok("都", General),
        tok("渋谷区", ProperNoun),
    ]);
    let history = vec![tok("東京", ProperNoun), tok("都", General)];
    let candidates = ngram::predict(&history, &index);
    assert_eq!(candidates[0].surface, "渋谷区");
    assert_eq!(candidates[0].score, 0.7);
}

#[test]
fn test_ngram_empty_history() {
    let index = shibuya_article();
    assert!(ngram::predict(&[], &index).is_empty());
}

#[test]
fn test_ngram_skips_history_surfaces() {
    // あ is followed once by い and once by う, but い is already used
    let index = index_of(vec![
        tok("あ", General),
        tok("い", General),
        tok("あ", General),
        tok("う", General),
    ]);
    let history = vec![tok("い", General), tok("あ", General)];
    let candidates = ngram::predict(&history, &index);
    assert!(candidates.iter().all(|c| c.surface != "い"));
    assert!(candidates.iter().any(|c| c.surface == "う"));
}

#[test]
fn test_short_ngram_yield_is_discarded() {
    // Only one n-gram continuation exists, so the chain falls through to
    // the transition strategy and its score ladder.
    let index = shibuya_article();
    let history = vec![tok("東京", ProperNoun), tok("都", General)];
    let results = predict(&history, &index);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].score, 0.8);
}

#[test]
fn test_chain_scores_descend_across_strategies() {
    // Transition yields 。 (0.8) and 渋谷区 (0.6); the frequency fill adds
    // 昨日 at 0.7, which must rank between them.
    let index = shibuya_article();
    let history = vec![tok("東京", ProperNoun), tok("都", General)];
    let results = predict(&history, &index);
    assert_eq!(results.len(), 3);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    let surfaces: Vec<&str> = results.iter().map(|c| c.surface.as_str()).collect();
    assert_eq!(surfaces, ["。", "昨日", "渋谷区"]);
}

#[test]
fn test_transition_score_ladder() {
    // History ends on ProperNoun → successors are Symbol, Date, General.
    // Document has Symbol and General buckets; Date is absent and skipped
    // without consuming a score step.
    let index = shibuya_article();
    let history = vec![tok("渋谷区", ProperNoun)];
    let results = transition::predict(&history, &index);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].category, "記号");
    assert_eq!(results[0].score, 0.8);
    assert_eq!(results[1].category, "一般");
    assert_eq!(results[1].score, 0.6);
}

#[test]
fn test_transition_prefers_frequent_bucket_tokens() {
    let index = index_of(vec![
        tok("東京", ProperNoun),
        tok("の", General),
        tok("天気", General),
        tok("の", General),
    ]);
    let history = vec![tok("東京", ProperNoun)];
    let results = transition::predict(&history, &index);
    // General bucket: の (×2) beats 天気 (×1)
    let general = results.iter().find(|c| c.category == "一般").unwrap();
    assert_eq!(general.surface, "の");
}

#[test]
fn test_frequency_fill_scores() {
    let index = index_of(vec![
        tok("の", General),
        tok("の", General),
        tok("の", General),
        tok("は", General),
        tok("は", General),
        tok("桜", General),
    ]);
    let results = frequency::predict(&[], &index, 3, &[]);
    let surfaces: Vec<&str> = results.iter().map(|c| c.surface.as_str()).collect();
    assert_eq!(surfaces, ["の", "は", "桜"]);
    assert_eq!(results[0].score, 0.7);
    assert_eq!(results[1].score, 0.6);
    assert_eq!(results[2].score, 0.5);
}

#[test]
fn test_never_returns_history_surfaces() {
    let index = shibuya_article();
    let history = vec![tok("東京", ProperNoun), tok("都", General)];
    for candidate in predict(&history, &index) {
        assert!(history.iter().all(|h| h.surface != candidate.surface));
    }
}

#[test]
fn test_exactly_three_when_document_is_rich() {
    let index = shibuya_article();
    let history = vec![tok("昨日", General)];
    assert_eq!(predict(&history, &index).len(), 3);
}

#[test]
fn test_at_most_three() {
    let index = index_of(vec![tok("あ", General), tok("い", General)]);
    let history = vec![tok("あ", General)];
    assert!(predict(&history, &index).len() <= 3);
}

#[test]
fn test_initial_suggestions_span_categories() {
    let index = index_of(vec![
        tok("3月14日", TokenCategory::Date),
        tok("東京", ProperNoun),
        tok("で", General),
        tok("100", Numeric),
        tok("人", General),
    ]);
    let results = predict(&[], &index);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].score, 0.9);
    assert_eq!(results[1].score, 0.8);
    assert_eq!(results[2].score, 0.7);
    let distinct: std::collections::HashSet<&str> =
        results.iter().map(|c| c.category.as_str()).collect();
    assert!(distinct.len() >= 2);
}

#[test]
fn test_initial_suggestions_top_up_from_frequency() {
    // Single-category document: only one category-diverse pick is possible,
    // the rest comes from global frequency.
    let index = index_of(vec![
        tok("犬", General),
        tok("猫", General),
        tok("鳥", General),
        tok("猫", General),
    ]);
    let results = predict(&[], &index);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].surface, "犬");
    assert_eq!(results[0].score, 0.9);
    // Frequency fill skips the already chosen 犬
    assert_eq!(results[1].surface, "猫");
    assert_eq!(results[1].score, 0.7);
}
