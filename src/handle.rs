//! The process-wide Model Handle.
//!
//! Built once at startup, then cloned into every request handler. Clones share the
//! same immutable pipeline.

use std::sync::Arc;

use crate::error::{ClassifyError, Result};
use crate::pipelines::sentiment::{Prediction, SentimentAnalysisPipeline};

/// Anything that can label a piece of text.
///
/// Implemented by [`SentimentAnalysisPipeline`]; tests substitute their own.
pub trait TextClassifier: Send + Sync {
    /// Top label for `text`, or the underlying failure.
    fn classify(&self, text: &str) -> Result<Prediction>;

    /// Labels the classifier can return, ordered by class id.
    fn labels(&self) -> &[String];
}

impl TextClassifier for SentimentAnalysisPipeline {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let output = self.run(text)?;
        tracing::debug!(
            label = %output.prediction.label,
            score = output.prediction.score,
            input_tokens = output.stats.input_tokens,
            elapsed_ms = output.stats.total_time.as_secs_f64() * 1000.0,
            "classified text"
        );
        Ok(output.prediction)
    }

    fn labels(&self) -> &[String] {
        SentimentAnalysisPipeline::labels(self)
    }
}

/// Shared, cheaply cloneable access to the loaded classifier.
#[derive(Clone)]
pub struct ModelHandle {
    classifier: Arc<dyn TextClassifier>,
    model_id: Arc<str>,
}

impl ModelHandle {
    /// Wrap `classifier`, remembering where it was loaded from for logs and `/health`.
    pub fn new(model_id: impl Into<Arc<str>>, classifier: impl TextClassifier + 'static) -> Self {
        Self {
            classifier: Arc::new(classifier),
            model_id: model_id.into(),
        }
    }

    /// Classify `text`, returning the top prediction.
    ///
    /// Empty or whitespace-only text is rejected before the model runs. Any model failure,
    /// including a score outside `[0, 1]`, is logged and reported as
    /// [`ClassifyError::InferenceFailure`] without its cause.
    pub fn classify(&self, text: &str) -> std::result::Result<Vec<Prediction>, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::InvalidInput);
        }

        let prediction = self.classifier.classify(text).map_err(|e| {
            tracing::error!(model = %self.model_id, error = %e, "classification failed");
            ClassifyError::InferenceFailure
        })?;

        if !(0.0..=1.0).contains(&prediction.score) {
            tracing::error!(
                model = %self.model_id,
                label = %prediction.label,
                score = prediction.score,
                "classifier returned a score outside [0, 1]"
            );
            return Err(ClassifyError::InferenceFailure);
        }

        Ok(vec![prediction])
    }

    /// Labels the classifier can return, ordered by class id.
    pub fn labels(&self) -> &[String] {
        self.classifier.labels()
    }

    /// Hub repo id or local path the model was loaded from.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model_id", &self.model_id)
            .field("labels", &self.labels())
            .finish()
    }
}
