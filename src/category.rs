//! Token categorization from surface form and part-of-speech signals.
//!
//! Every morphological unit gets exactly one category out of a fixed set.
//! Rules are ordered; the first match wins, so a proper noun containing
//! digits stays a proper noun.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed category set. Labels are the analyzer-facing Japanese strings,
/// which also appear in model prompts and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    #[serde(rename = "固有名詞")]
    ProperNoun,
    #[serde(rename = "日付")]
    Date,
    #[serde(rename = "記号")]
    Symbol,
    #[serde(rename = "英字")]
    Alphabetic,
    #[serde(rename = "数字")]
    Numeric,
    #[serde(rename = "一般")]
    General,
}

impl TokenCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProperNoun => "固有名詞",
            Self::Date => "日付",
            Self::Symbol => "記号",
            Self::Alphabetic => "英字",
            Self::Numeric => "数字",
            Self::General => "一般",
        }
    }

    /// Parse an analyzer/model-facing label. Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "固有名詞" => Some(Self::ProperNoun),
            "日付" => Some(Self::Date),
            "記号" => Some(Self::Symbol),
            "英字" => Some(Self::Alphabetic),
            "数字" => Some(Self::Numeric),
            "一般" => Some(Self::General),
            _ => None,
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Punctuation, bracket and quotation characters that form the 記号 category.
fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        '！' | '!' | '？' | '?' | '、' | '。' | '（' | '）' | '(' | ')' | '…'
    )
}

/// Check for a contiguous `<digits>月<digits>日` month/day run anywhere in `s`.
fn contains_month_day(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let mut j = i;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j < chars.len() && chars[j] == '月' {
            let mut k = j + 1;
            while k < chars.len() && chars[k].is_ascii_digit() {
                k += 1;
            }
            if k > j + 1 && k < chars.len() && chars[k] == '日' {
                return true;
            }
        }
        i = j;
    }
    false
}

/// Classify one morphological unit. Pure and deterministic; rule order matters.
pub fn categorize(surface: &str, pos: &str, pos_subtype: &str) -> TokenCategory {
    if pos == "名詞" && pos_subtype == "固有名詞" {
        return TokenCategory::ProperNoun;
    }
    if contains_month_day(surface) {
        return TokenCategory::Date;
    }
    if !surface.is_empty() && surface.chars().all(is_symbol_char) {
        return TokenCategory::Symbol;
    }
    if !surface.is_empty() && surface.chars().all(|c| c.is_ascii_alphabetic()) {
        return TokenCategory::Alphabetic;
    }
    if surface.chars().any(|c| c.is_ascii_digit()) {
        return TokenCategory::Numeric;
    }
    TokenCategory::General
}
