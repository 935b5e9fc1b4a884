//! Generative-model collaborator.
//!
//! The engine only needs "prompt in, completion text out". `GeminiClient`
//! is the production implementation over the Gemini REST API; tests plug in
//! stub implementations of [`GenerativeModel`].

use serde::{Deserialize, Serialize};

use crate::settings::settings;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("model returned an empty completion")]
    EmptyCompletion,
    #[error("no JSON array found in model output")]
    NoJsonFragment,
    #[error("model output failed validation: {0}")]
    InvalidPayload(String),
}

/// Opaque text-completion capability. Exactly one attempt per call; no
/// retries, no internal timeout.
pub trait GenerativeModel {
    fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Gemini REST client (`models/{name}:generateContent`).
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    top_k: u32,
    top_p: f64,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        let m = &settings().model;
        Self {
            api_key: api_key.into(),
            model: m.name.clone(),
            base_url: m.base_url.trim_end_matches('/').to_string(),
            temperature: m.temperature,
            top_k: m.top_k,
            top_p: m.top_p,
        }
    }
}

impl GenerativeModel for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let payload = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                top_k: self.top_k,
                top_p: self.top_p,
            },
        };

        let body = ureq::post(&url)
            .send_json(&payload)
            .map_err(|e| ModelError::Http(e.to_string()))?
            .into_body()
            .read_to_string()
            .map_err(|e| ModelError::Http(e.to_string()))?;

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ModelError::InvalidPayload(format!("response envelope: {e}")))?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::EmptyCompletion);
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}
