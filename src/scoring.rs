//! Candidate relevance scoring.
//!
//! A candidate token is scored against the current input history and the
//! article index: document frequency raises the score, and category changes
//! that match natural transition patterns raise it further. Scores are
//! clamped to the configured range and rounded to two decimals, so they are
//! directly comparable across strategies.

use std::collections::HashSet;

use crate::article::{ArticleIndex, Token};
use crate::category::TokenCategory::{self, Alphabetic, Date, General, Numeric, ProperNoun, Symbol};
use crate::settings::settings;

/// Category transition patterns: which categories plausibly follow each
/// category. Immutable configuration; order within a successor set is the
/// preference order used by the transition fallback strategy.
static NATURAL_TRANSITIONS: &[(TokenCategory, &[TokenCategory])] = &[
    (ProperNoun, &[Symbol, Date, General]),
    (Date, &[Symbol, ProperNoun, General]),
    (Symbol, &[ProperNoun, General, Date]),
    (Alphabetic, &[Symbol, General, ProperNoun]),
    (Numeric, &[Symbol, Date, General]),
    (General, &[Symbol, ProperNoun, Date]),
];

/// Ranked successor categories for a category, if it has a transition entry.
pub fn successors(category: TokenCategory) -> Option<&'static [TokenCategory]> {
    NATURAL_TRANSITIONS
        .iter()
        .find(|&&(c, _)| c == category)
        .map(|&(_, s)| s)
}

/// A token with its relevance score attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredToken {
    pub token: Token,
    pub score: f64,
}

/// Round to two decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score one candidate token for a candidate category.
///
/// Base score plus a capped frequency bonus; when history is non-empty and
/// the candidate category differs from the most recent history token's
/// category, a diversity bonus applies, plus a transition bonus when the
/// change matches a natural transition pattern. Pure function of its inputs.
pub fn score(
    token: &Token,
    candidate_category: TokenCategory,
    history: &[Token],
    index: &ArticleIndex,
) -> f64 {
    let s = &settings().scoring;
    let mut value = s.base;

    let frequency = index.occurrence_count(&token.surface) as f64;
    value += (frequency / s.frequency_divisor).min(s.frequency_cap);

    if let Some(last) = history.last() {
        if last.category != candidate_category {
            value += s.diversity_bonus;
            if successors(last.category).is_some_and(|set| set.contains(&candidate_category)) {
                value += s.transition_bonus;
            }
        }
    }

    round2(value.clamp(s.min, s.max))
}

/// Score and rank one category's unused tokens.
///
/// Tokens whose surface already appears in history are excluded. The sort is
/// stable and descending by score, so ties keep their original article order.
/// At most `scoring.rank_limit` tokens are returned.
pub fn rank_category(
    category: TokenCategory,
    history: &[Token],
    index: &ArticleIndex,
) -> Vec<ScoredToken> {
    let used: HashSet<&str> = history.iter().map(|t| t.surface.as_str()).collect();

    let mut ranked: Vec<ScoredToken> = index
        .tokens_in(category)
        .iter()
        .filter(|t| !used.contains(t.surface.as_str()))
        .map(|t| ScoredToken {
            score: score(t, category, history, index),
            token: t.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(settings().scoring.rank_limit);
    ranked
}
