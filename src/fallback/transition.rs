//! Category-transition-guided selection.

use std::collections::HashSet;

use tracing::debug;

use crate::article::{ArticleIndex, Token};
use crate::category::TokenCategory;
use crate::scoring::{round2, successors};
use crate::settings::settings;

use super::PredictionCandidate;

/// Walk the last history token's successor categories in preference order,
/// taking the highest-frequency unused token from each bucket. Categories
/// without a transition entry fall back to every category in the document.
pub fn predict(history: &[Token], index: &ArticleIndex) -> Vec<PredictionCandidate> {
    let Some(last) = history.last() else {
        return Vec::new();
    };
    let s = &settings().fallback;

    let categories: Vec<TokenCategory> = match successors(last.category) {
        Some(set) => set.to_vec(),
        None => index.categories().to_vec(),
    };

    let used: HashSet<&str> = history.iter().map(|t| t.surface.as_str()).collect();
    let mut results: Vec<PredictionCandidate> = Vec::new();

    for category in categories {
        if results.len() >= s.max_results {
            break;
        }
        // First highest-frequency token wins ties, keeping bucket order.
        let mut best: Option<&Token> = None;
        let mut best_freq = 0;
        for t in index.tokens_in(category) {
            if used.contains(t.surface.as_str()) {
                continue;
            }
            let freq = index.occurrence_count(&t.surface);
            if best.is_none() || freq > best_freq {
                best = Some(t);
                best_freq = freq;
            }
        }
        if let Some(token) = best {
            let score = round2(s.transition_start - s.transition_step * results.len() as f64);
            results.push(PredictionCandidate::from_token(token, score));
        }
    }

    debug!(
        last_category = %last.category,
        count = results.len(),
        "transition candidates"
    );
    results
}
