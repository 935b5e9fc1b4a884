//! Per-document token index.
//!
//! A document is analyzed once: every morphological unit is categorized and
//! collected into an [`ArticleIndex`], which is then shared read-only by the
//! scoring engine and the fallback predictor for the rest of the session.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::{categorize, TokenCategory};

/// A categorized lexical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub surface: String,
    pub category: TokenCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
}

impl Token {
    pub fn new(surface: impl Into<String>, category: TokenCategory) -> Self {
        Self {
            surface: surface.into(),
            category,
            reading: None,
            pos: None,
        }
    }
}

/// Raw morphological-analyzer output, before categorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawToken {
    pub surface_form: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub pos_subtype: String,
    #[serde(default)]
    pub reading: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("document produced no categorizable tokens")]
    EmptyDocument,
    #[error("tokenizer failed: {0}")]
    Tokenizer(String),
}

/// External morphological analyzer. The engine never tokenizes raw text
/// itself; it consumes whatever unit sequence the collaborator emits.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<RawToken>, AnalyzeError>;
}

/// Immutable per-document index: category order, de-duplicated per-category
/// buckets, the full token sequence, and precomputed surface frequencies.
#[derive(Debug, Clone)]
pub struct ArticleIndex {
    categories: Vec<TokenCategory>,
    tokens_by_category: HashMap<TokenCategory, Vec<Token>>,
    all_tokens: Vec<Token>,
    surface_counts: HashMap<String, u32>,
}

impl ArticleIndex {
    /// Build the index in a single pass. Bucket membership is de-duplicated
    /// by surface form (first occurrence kept); `all_tokens` keeps duplicates.
    pub fn build(tokens: Vec<Token>) -> Result<Self, AnalyzeError> {
        if tokens.is_empty() {
            return Err(AnalyzeError::EmptyDocument);
        }

        let mut categories = Vec::new();
        let mut tokens_by_category: HashMap<TokenCategory, Vec<Token>> = HashMap::new();
        let mut seen: HashMap<TokenCategory, HashSet<String>> = HashMap::new();
        let mut surface_counts: HashMap<String, u32> = HashMap::new();

        for token in &tokens {
            let bucket = tokens_by_category.entry(token.category).or_insert_with(|| {
                categories.push(token.category);
                Vec::new()
            });
            if seen
                .entry(token.category)
                .or_default()
                .insert(token.surface.clone())
            {
                bucket.push(token.clone());
            }
            *surface_counts.entry(token.surface.clone()).or_insert(0) += 1;
        }

        debug!(
            token_count = tokens.len(),
            category_count = categories.len(),
            "article index built"
        );

        Ok(Self {
            categories,
            tokens_by_category,
            all_tokens: tokens,
            surface_counts,
        })
    }

    /// Distinct categories in first-appearance order.
    pub fn categories(&self) -> &[TokenCategory] {
        &self.categories
    }

    /// De-duplicated bucket for a category. Empty slice for absent categories.
    pub fn tokens_in(&self, category: TokenCategory) -> &[Token] {
        self.tokens_by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Full token sequence in document order, duplicates retained.
    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    /// How many times a surface form occurs in the document.
    pub fn occurrence_count(&self, surface: &str) -> u32 {
        self.surface_counts.get(surface).copied().unwrap_or(0)
    }
}

/// Analyze raw text: tokenize via the collaborator, categorize every unit,
/// build the index. Tokenizer failures and empty documents are terminal for
/// the document and surfaced to the caller.
pub fn analyze_document(
    tokenizer: &dyn Tokenizer,
    text: &str,
) -> Result<ArticleIndex, AnalyzeError> {
    let raw = tokenizer.tokenize(text)?;
    let tokens = categorize_all(raw);
    ArticleIndex::build(tokens)
}

/// Categorize a raw analyzer output sequence.
pub fn categorize_all(raw: Vec<RawToken>) -> Vec<Token> {
    raw.into_iter()
        .map(|r| {
            let category = categorize(&r.surface_form, &r.part_of_speech, &r.pos_subtype);
            Token {
                surface: r.surface_form,
                category,
                reading: r.reading,
                pos: if r.part_of_speech.is_empty() {
                    None
                } else {
                    Some(r.part_of_speech)
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(surface: &str, category: TokenCategory) -> Token {
        Token::new(surface, category)
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(
            ArticleIndex::build(Vec::new()),
            Err(AnalyzeError::EmptyDocument)
        ));
    }

    #[test]
    fn test_category_order_is_first_appearance() {
        let index = ArticleIndex::build(vec![
            tok("東京", TokenCategory::ProperNoun),
            tok("、", TokenCategory::Symbol),
            tok("3月14日", TokenCategory::Date),
            tok("、", TokenCategory::Symbol),
        ])
        .unwrap();
        assert_eq!(
            index.categories(),
            &[
                TokenCategory::ProperNoun,
                TokenCategory::Symbol,
                TokenCategory::Date
            ]
        );
    }

    #[test]
    fn test_bucket_dedup_keeps_first() {
        let index = ArticleIndex::build(vec![
            tok("東京", TokenCategory::ProperNoun),
            tok("大阪", TokenCategory::ProperNoun),
            tok("東京", TokenCategory::ProperNoun),
        ])
        .unwrap();
        let bucket = index.tokens_in(TokenCategory::ProperNoun);
        let surfaces: Vec<&str> = bucket.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, ["東京", "大阪"]);
        // all_tokens keeps duplicates
        assert_eq!(index.all_tokens().len(), 3);
        assert_eq!(index.occurrence_count("東京"), 2);
        assert_eq!(index.occurrence_count("京都"), 0);
    }

    #[test]
    fn test_bucket_tokens_appear_in_all_tokens() {
        let index = ArticleIndex::build(vec![
            tok("AI", TokenCategory::Alphabetic),
            tok("が", TokenCategory::General),
            tok("2024", TokenCategory::Numeric),
        ])
        .unwrap();
        for cat in index.categories() {
            for t in index.tokens_in(*cat) {
                assert!(index.all_tokens().iter().any(|a| a == t));
            }
        }
    }

    #[test]
    fn test_categorize_all_assigns_categories() {
        let raw = vec![
            RawToken {
                surface_form: "東京".into(),
                part_of_speech: "名詞".into(),
                pos_subtype: "固有名詞".into(),
                reading: Some("トウキョウ".into()),
            },
            RawToken {
                surface_form: "。".into(),
                part_of_speech: "記号".into(),
                pos_subtype: "句点".into(),
                reading: None,
            },
        ];
        let tokens = categorize_all(raw);
        assert_eq!(tokens[0].category, TokenCategory::ProperNoun);
        assert_eq!(tokens[0].reading.as_deref(), Some("トウキョウ"));
        assert_eq!(tokens[1].category, TokenCategory::Symbol);
    }

    struct FailingTokenizer;
    impl Tokenizer for FailingTokenizer {
        fn tokenize(&self, _text: &str) -> Result<Vec<RawToken>, AnalyzeError> {
            Err(AnalyzeError::Tokenizer("analyzer unavailable".into()))
        }
    }

    #[test]
    fn test_tokenizer_failure_is_surfaced() {
        let err = analyze_document(&FailingTokenizer, "テスト").unwrap_err();
        assert!(matches!(err, AnalyzeError::Tokenizer(_)));
    }
}
