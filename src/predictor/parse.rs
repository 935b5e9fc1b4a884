//! Extraction and validation of model output.
//!
//! Model replies are free text that should contain a JSON array of
//! candidate objects. The first well-formed array fragment is parsed;
//! objects must carry a non-empty surface (under the `token` or `surface`
//! key), a non-empty category, and a numeric score.

use serde::Deserialize;

use crate::fallback::PredictionCandidate;

use super::model::ModelError;

#[derive(Debug, Deserialize)]
struct RawCandidate {
    #[serde(default)]
    token: String,
    #[serde(default)]
    surface: String,
    #[serde(default)]
    category: String,
    score: Option<f64>,
}

impl RawCandidate {
    fn validate(self) -> Option<PredictionCandidate> {
        let surface = if self.token.is_empty() {
            self.surface
        } else {
            self.token
        };
        let score = self.score?;
        if surface.is_empty() || self.category.is_empty() || !score.is_finite() {
            return None;
        }
        Some(PredictionCandidate {
            surface,
            category: self.category,
            score,
        })
    }
}

/// Parse candidates out of a raw model reply.
///
/// The reply is scanned for the first array-of-objects fragment that
/// deserializes; bracketed prose before the candidates (e.g. a `[参考]`
/// marker) is skipped over.
pub fn parse_candidates(text: &str) -> Result<Vec<PredictionCandidate>, ModelError> {
    let mut from = 0;
    let mut fragment_seen = false;
    while let Some((fragment, next)) = extract_json_array(text, from) {
        from = next;
        fragment_seen = true;
        let Ok(raw) = serde_json::from_str::<Vec<RawCandidate>>(fragment) else {
            continue;
        };

        let candidates: Vec<PredictionCandidate> =
            raw.into_iter().filter_map(RawCandidate::validate).collect();
        if candidates.is_empty() {
            return Err(ModelError::InvalidPayload(
                "no candidate passed validation".to_string(),
            ));
        }
        return Ok(candidates);
    }

    if fragment_seen {
        Err(ModelError::InvalidPayload(
            "no array fragment deserialized".to_string(),
        ))
    } else {
        Err(ModelError::NoJsonFragment)
    }
}

/// Find the next balanced array-of-objects fragment (`[` whose first
/// non-whitespace content is `{`) at or after byte offset `from`. Bracket
/// depth is tracked outside JSON string literals so surfaces containing
/// brackets don't break the scan. Returns the fragment and the offset to
/// resume scanning from.
fn extract_json_array(text: &str, mut from: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    while from < bytes.len() {
        let start = from + text[from..].find('[')?;
        let first = bytes[start + 1..].iter().find(|b| !b.is_ascii_whitespace());
        if first != Some(&b'{') {
            from = start + 1;
            continue;
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, &b) in bytes.iter().enumerate().skip(start) {
            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'[' => depth += 1,
                b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((&text[start..=i], i + 1));
                    }
                }
                _ => {}
            }
        }
        // Unbalanced from this start; no later fragment can close either.
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_array() {
        let text = r#"[{"token": "渋谷", "category": "固有名詞", "score": 0.9}]"#;
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].surface, "渋谷");
        assert_eq!(candidates[0].category, "固有名詞");
        assert_eq!(candidates[0].score, 0.9);
    }

    #[test]
    fn test_extracts_array_from_prose() {
        let text = "予測結果は次の通りです。\n```json\n[{\"token\": \"都\", \"category\": \"一般\", \"score\": 0.8}]\n```\n以上です。";
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates[0].surface, "都");
    }

    #[test]
    fn test_accepts_surface_key() {
        let text = r#"[{"surface": "桜", "category": "一般", "score": 0.5}]"#;
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates[0].surface, "桜");
    }

    #[test]
    fn test_skips_bracketed_prose_before_candidates() {
        let text = "[参考] 予測結果:\n[{\"token\": \"桜\", \"category\": \"一般\", \"score\": 0.5}]";
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].surface, "桜");
        assert_eq!(candidates[0].score, 0.5);
    }

    #[test]
    fn test_skips_non_object_array_before_candidates() {
        let text = r#"候補: ["桜", "梅"]
            [{"token": "梅", "category": "一般", "score": 0.4}]"#;
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates[0].surface, "梅");
    }

    #[test]
    fn test_non_json_is_rejected() {
        assert!(matches!(
            parse_candidates("すみません、予測できません。"),
            Err(ModelError::NoJsonFragment)
        ));
    }

    #[test]
    fn test_missing_score_filtered_out() {
        let text = r#"[{"token": "桜", "category": "一般"}]"#;
        assert!(matches!(
            parse_candidates(text),
            Err(ModelError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_partial_validation_keeps_good_entries() {
        let text = r#"[
            {"token": "", "category": "一般", "score": 0.9},
            {"token": "桜", "category": "一般", "score": 0.5}
        ]"#;
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].surface, "桜");
    }

    #[test]
    fn test_bracket_inside_string() {
        let text = r#"[{"token": "（笑）]", "category": "記号", "score": 0.4}]"#;
        let candidates = parse_candidates(text).unwrap();
        assert_eq!(candidates[0].surface, "（笑）]");
    }

    #[test]
    fn test_unterminated_array() {
        assert!(extract_json_array("[{\"token\": \"a\"", 0).is_none());
    }
}
