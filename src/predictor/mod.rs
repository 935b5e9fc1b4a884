//! Prediction orchestration.
//!
//! One model attempt per request. Anything that goes wrong on the model
//! path (transport, missing JSON, validation) is absorbed and answered by
//! the local fallback chain; the caller always gets a candidate list.

use tracing::{debug, debug_span, warn};

use crate::article::{ArticleIndex, Token};
use crate::fallback::{self, PredictionCandidate};
use crate::settings::settings;

pub mod model;
pub mod parse;
pub mod prompt;

pub use model::{GeminiClient, GenerativeModel, ModelError};

pub struct Predictor {
    model: Box<dyn GenerativeModel>,
}

impl Predictor {
    pub fn new(model: Box<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Predict up to three continuations for a non-empty history.
    ///
    /// Empty history is an invalid request and returns an empty list without
    /// touching the model. Model-path failures degrade to the fallback
    /// predictor; this method never fails.
    pub fn get_predictions(
        &self,
        history: &[Token],
        index: &ArticleIndex,
    ) -> Vec<PredictionCandidate> {
        if history.is_empty() {
            return Vec::new();
        }
        let _span = debug_span!("get_predictions", history_len = history.len()).entered();

        match self.query_model(history, index) {
            Ok(candidates) => {
                debug!(count = candidates.len(), "model candidates accepted");
                candidates
            }
            Err(error) => {
                warn!(%error, "model prediction failed, using local fallback");
                fallback::predict(history, index)
            }
        }
    }

    fn query_model(
        &self,
        history: &[Token],
        index: &ArticleIndex,
    ) -> Result<Vec<PredictionCandidate>, ModelError> {
        let prompt = prompt::build_prompt(history, index);
        let reply = self.model.complete(&prompt)?;
        let mut candidates = parse::parse_candidates(&reply)?;
        // Model scores are returned verbatim, only the count is capped.
        candidates.truncate(settings().fallback.max_results);
        Ok(candidates)
    }
}
