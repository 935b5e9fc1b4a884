//! Global frequency completion.

use std::collections::{HashMap, HashSet};

use crate::article::{ArticleIndex, Token};
use crate::scoring::round2;
use crate::settings::settings;

use super::PredictionCandidate;

/// Take the `count` highest document-frequency tokens that are neither in
/// history nor among the already collected candidates. Ties keep first
/// document appearance order.
pub fn predict(
    history: &[Token],
    index: &ArticleIndex,
    count: usize,
    exclude: &[PredictionCandidate],
) -> Vec<PredictionCandidate> {
    let s = &settings().fallback;

    let mut used: HashSet<&str> = history.iter().map(|t| t.surface.as_str()).collect();
    used.extend(exclude.iter().map(|c| c.surface.as_str()));

    // (surface, category) keyed, in first-appearance order.
    let mut order: Vec<(&Token, u32)> = Vec::new();
    let mut by_key: HashMap<(&str, &str), usize> = HashMap::new();
    for token in index.all_tokens() {
        if used.contains(token.surface.as_str()) {
            continue;
        }
        let key = (token.surface.as_str(), token.category.as_str());
        match by_key.get(&key) {
            Some(&idx) => order[idx].1 += 1,
            None => {
                by_key.insert(key, order.len());
                order.push((token, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(count)
        .enumerate()
        .map(|(i, (token, _))| {
            let score = round2(s.frequency_start - s.frequency_step * i as f64);
            PredictionCandidate::from_token(token, score)
        })
        .collect()
}
