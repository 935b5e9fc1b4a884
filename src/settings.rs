//! Global engine settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub scoring: ScoringSettings,
    pub fallback: FallbackSettings,
    pub prompt: PromptSettings,
    pub model: ModelSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    /// Starting score before any bonus.
    pub base: f64,
    /// Occurrence count is divided by this before capping.
    pub frequency_divisor: f64,
    pub frequency_cap: f64,
    pub diversity_bonus: f64,
    pub transition_bonus: f64,
    pub min: f64,
    pub max: f64,
    /// Tokens kept per category by `rank_category`.
    pub rank_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackSettings {
    pub max_results: usize,
    pub ngram_base: f64,
    pub ngram_repeat_bonus: f64,
    pub transition_start: f64,
    pub transition_step: f64,
    pub frequency_start: f64,
    pub frequency_step: f64,
    pub initial_start: f64,
    pub initial_step: f64,
    /// Leading token window scanned for first-prediction suggestions.
    pub initial_window: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptSettings {
    /// Surfaces listed per category in the document summary.
    pub summary_top_n: usize,
    /// Below this token count the summary degrades to a fixed notice.
    pub min_summary_tokens: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub name: String,
    pub base_url: String,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
}

fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let settings: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;

    if settings.scoring.min > settings.scoring.max {
        return Err(SettingsError::InvalidValue {
            field: "scoring.min".into(),
            reason: "must not exceed scoring.max".into(),
        });
    }
    if settings.scoring.frequency_divisor <= 0.0 {
        return Err(SettingsError::InvalidValue {
            field: "scoring.frequency_divisor".into(),
            reason: "must be positive".into(),
        });
    }
    if settings.fallback.max_results == 0 {
        return Err(SettingsError::InvalidValue {
            field: "fallback.max_results".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toml_parses() {
        let s = parse_settings_toml(default_toml()).unwrap();
        assert_eq!(s.scoring.base, 0.5);
        assert_eq!(s.fallback.max_results, 3);
        assert_eq!(s.model.name, "gemini-1.5-pro");
    }

    #[test]
    fn test_invalid_range_rejected() {
        let toml_str = DEFAULT_SETTINGS_TOML.replace("min = 0.1", "min = 2.0");
        assert!(matches!(
            parse_settings_toml(&toml_str),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_max_results_rejected() {
        let toml_str = DEFAULT_SETTINGS_TOML.replace("max_results = 3", "max_results = 0");
        assert!(matches!(
            parse_settings_toml(&toml_str),
            Err(SettingsError::InvalidValue { .. })
        ));
    }
}
