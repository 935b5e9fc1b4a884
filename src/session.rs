//! Prediction session: one analyzed document plus the selection history.
//!
//! The session is the single writer. The article index is built once per
//! analyzed document and shared read-only with the scoring engine and the
//! fallback predictor; the history only ever grows, one token per selection.

use tracing::debug;

use crate::article::{analyze_document, AnalyzeError, ArticleIndex, Token, Tokenizer};
use crate::fallback::{self, PredictionCandidate};
use crate::predictor::{GenerativeModel, Predictor};

/// Append-only selection history. Grows by exactly one token per selection
/// and never shrinks within a session.
#[derive(Debug, Default)]
pub struct InputHistory(Vec<Token>);

impl InputHistory {
    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct Session {
    predictor: Predictor,
    article: Option<ArticleIndex>,
    history: InputHistory,
}

impl Session {
    pub fn new(model: Box<dyn GenerativeModel>) -> Self {
        Self {
            predictor: Predictor::new(model),
            article: None,
            history: InputHistory::default(),
        }
    }

    /// Analyze a document and start over: the previous index and history
    /// are replaced. Tokenizer failures and empty documents are surfaced.
    pub fn analyze(
        &mut self,
        tokenizer: &dyn Tokenizer,
        text: &str,
    ) -> Result<&ArticleIndex, AnalyzeError> {
        let index = analyze_document(tokenizer, text)?;
        debug!(
            categories = index.categories().len(),
            tokens = index.all_tokens().len(),
            "session document analyzed"
        );
        self.history = InputHistory::default();
        Ok(self.article.insert(index))
    }

    pub fn article(&self) -> Option<&ArticleIndex> {
        self.article.as_ref()
    }

    pub fn history(&self) -> &[Token] {
        self.history.as_slice()
    }

    /// Record a user selection.
    pub fn select(&mut self, token: Token) {
        self.history.push(token);
    }

    /// Predict the next token. Without an analyzed document the request is
    /// invalid and yields an empty list. The first prediction of a session
    /// (empty history) is served locally; afterwards the model is consulted
    /// with the fallback chain behind it.
    pub fn predict(&self) -> Vec<PredictionCandidate> {
        let Some(index) = &self.article else {
            return Vec::new();
        };
        if self.history.is_empty() {
            return fallback::predict(&[], index);
        }
        self.predictor
            .get_predictions(self.history.as_slice(), index)
    }
}
