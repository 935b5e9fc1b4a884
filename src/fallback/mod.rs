//! Deterministic, model-free prediction.
//!
//! An ordered chain of pure strategies: n-gram continuation, category
//! transition, then global frequency. The n-gram strategy is all-or-nothing;
//! the transition strategy is topped up from global frequency when it comes
//! up short. Every strategy only reads the history and the article index.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::article::{ArticleIndex, Token};
use crate::settings::settings;

pub mod frequency;
pub mod ngram;
pub mod transition;

#[cfg(test)]
mod tests;

/// A proposed continuation with its relevance score.
///
/// The category stays a plain string: model-produced candidates may carry
/// labels outside the fixed category set and are returned verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionCandidate {
    pub surface: String,
    pub category: String,
    pub score: f64,
}

impl PredictionCandidate {
    pub(crate) fn from_token(token: &Token, score: f64) -> Self {
        Self {
            surface: token.surface.clone(),
            category: token.category.as_str().to_string(),
            score,
        }
    }
}

/// Predict up to `fallback.max_results` continuations without the model.
pub fn predict(history: &[Token], index: &ArticleIndex) -> Vec<PredictionCandidate> {
    let _span = debug_span!("fallback_predict", history_len = history.len()).entered();
    let max = settings().fallback.max_results;

    if history.is_empty() {
        return initial_suggestions(index);
    }

    let ngram = ngram::predict(history, index);
    if ngram.len() >= max {
        debug!(count = ngram.len(), "ngram strategy satisfied");
        return ngram;
    }

    let mut results = transition::predict(history, index);
    if results.len() < max {
        let fill = frequency::predict(history, index, max - results.len(), &results);
        results.extend(fill);
        // A fill score can exceed the tail of the transition ladder.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    debug!(count = results.len(), "transition/frequency strategies");
    results
}

/// First prediction of a session: seed from the document's opening tokens,
/// one per distinct category, then top up from global frequency.
fn initial_suggestions(index: &ArticleIndex) -> Vec<PredictionCandidate> {
    let s = &settings().fallback;
    let window = index.all_tokens().len().min(s.initial_window);

    let mut suggestions: Vec<PredictionCandidate> = Vec::new();
    let mut seen_categories = Vec::new();

    for token in &index.all_tokens()[..window] {
        if suggestions.len() >= s.max_results {
            break;
        }
        if !seen_categories.contains(&token.category) {
            let score =
                crate::scoring::round2(s.initial_start - s.initial_step * suggestions.len() as f64);
            suggestions.push(PredictionCandidate::from_token(token, score));
            seen_categories.push(token.category);
        }
    }

    if suggestions.len() < s.max_results {
        let fill = frequency::predict(&[], index, s.max_results - suggestions.len(), &suggestions);
        suggestions.extend(fill);
    }
    suggestions
}
