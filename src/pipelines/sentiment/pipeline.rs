use super::model::SentimentAnalysisModel;
use crate::error::{PipelineError, Result};
use crate::models::Architecture;
use crate::pipelines::stats::PipelineStats;
use candle_core::{Tensor, D};
use candle_nn::ops::softmax;
use serde::Serialize;
use tokenizers::Tokenizer;

// ============ Output types ============

/// A sentiment prediction with label and confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The predicted sentiment, as named in the checkpoint's `id2label` (e.g. "POSITIVE").
    pub label: String,
    /// Softmax probability of `label` (0.0 to 1.0).
    pub score: f32,
}

/// Output from `run()`.
#[derive(Debug)]
pub struct Output {
    /// Sentiment prediction.
    pub prediction: Prediction,
    /// Execution statistics.
    pub stats: PipelineStats,
}

// ============ Pipeline ============

/// Classifies text sentiment with a loaded checkpoint.
///
/// Construct with [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder).
/// The pipeline is immutable once built and can be shared across threads.
pub struct SentimentAnalysisPipeline {
    pub(crate) model: Box<dyn SentimentAnalysisModel>,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) labels: Vec<String>,
    pub(crate) architecture: Architecture,
}

impl SentimentAnalysisPipeline {
    /// Analyze text sentiment, returning the top label.
    pub fn run(&self, text: &str) -> Result<Output> {
        let stats_builder = PipelineStats::start();

        let encoding = self.tokenizer.encode(text, true).map_err(|e| {
            PipelineError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                &text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let logits = self.model.forward(&encoding)?;
        let prediction = top_prediction(&logits, &self.labels)?;

        Ok(Output {
            prediction,
            stats: stats_builder.finish(encoding.len()),
        })
    }

    /// Labels the model can return, ordered by class id.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Architecture detected from the checkpoint's `config.json`.
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

/// Softmax over `(1, num_labels)` logits, then the most probable label.
pub(crate) fn top_prediction(logits: &Tensor, labels: &[String]) -> Result<Prediction> {
    let probs = softmax(logits, D::Minus1)?
        .squeeze(0)?
        .to_dtype(candle_core::DType::F32)?
        .to_vec1::<f32>()?;

    let (pred_id, score) = probs
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| PipelineError::Unexpected("Model returned no logits".into()))?;

    let label = labels
        .get(pred_id)
        .ok_or_else(|| {
            PipelineError::Unexpected(format!(
                "Predicted label ID {} not in id2label. Available: {}",
                pred_id,
                labels.join(", ")
            ))
        })?
        .clone();

    Ok(Prediction { label, score })
}
