//! N-gram continuation matching against the document's token sequence.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::article::{ArticleIndex, Token};
use crate::scoring::round2;
use crate::settings::settings;

use super::PredictionCandidate;

/// Pattern length cap in tokens. Fixed at two: longer windows are
/// unexplored territory and must not be enabled by configuration.
const MAX_WINDOW: usize = 2;

/// Predict continuations of the most recent history tokens.
///
/// The surfaces of the last `min(2, |history|)` history tokens are joined
/// into a pattern; a same-sized token window slides over the document, and
/// wherever the windowed surfaces match the pattern, the immediately
/// following token becomes a candidate. Repeat matches raise the score.
/// Returns an empty vector for empty history.
pub fn predict(history: &[Token], index: &ArticleIndex) -> Vec<PredictionCandidate> {
    if history.is_empty() {
        return Vec::new();
    }
    let s = &settings().fallback;

    let window = history.len().min(MAX_WINDOW);
    let pattern: String = history[history.len() - window..]
        .iter()
        .map(|t| t.surface.as_str())
        .collect();

    let used: HashSet<&str> = history.iter().map(|t| t.surface.as_str()).collect();
    let all = index.all_tokens();

    // Dedup key is surface + category; order of first match is preserved
    // so equal scores keep document order after the stable sort.
    let mut order: Vec<PredictionCandidate> = Vec::new();
    let mut by_key: HashMap<(String, String), usize> = HashMap::new();

    for (i, window_tokens) in all.windows(window).enumerate() {
        let Some(next) = all.get(i + window) else {
            break;
        };
        let windowed: String = window_tokens.iter().map(|t| t.surface.as_str()).collect();
        if windowed != pattern || used.contains(next.surface.as_str()) {
            continue;
        }

        let key = (next.surface.clone(), next.category.as_str().to_string());
        match by_key.get(&key) {
            Some(&idx) => {
                let candidate = &mut order[idx];
                candidate.score = round2((candidate.score + s.ngram_repeat_bonus).min(1.0));
            }
            None => {
                by_key.insert(key, order.len());
                order.push(PredictionCandidate::from_token(next, round2(s.ngram_base)));
            }
        }
    }

    order.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(s.max_results);
    debug!(pattern = %pattern, count = order.len(), "ngram candidates");
    order
}
