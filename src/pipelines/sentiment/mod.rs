//! Sentiment analysis pipeline.
//!
//! Classify text with a pre-trained sequence-classification checkpoint and get back
//! the top label with its softmax probability.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sentiment_serve::sentiment::SentimentAnalysisPipelineBuilder;
//!
//! # fn main() -> sentiment_serve::error::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::distilbert_sst2().build()?;
//!
//! let output = pipeline.run("I absolutely love this product!")?;
//! println!("sentiment: {} (confidence: {:.2})", output.prediction.label, output.prediction.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! The architecture is picked from the checkpoint's `config.json`.
//!
//! | Architecture | Builder Method |
//! |--------------|----------------|
//! | DistilBERT | [`SentimentAnalysisPipelineBuilder::distilbert_sst2`], [`SentimentAnalysisPipelineBuilder::new`] |
//! | ModernBERT | [`SentimentAnalysisPipelineBuilder::modernbert`], [`SentimentAnalysisPipelineBuilder::new`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::{Architecture, ModernBertSize};
pub use crate::pipelines::stats::PipelineStats;
pub use crate::pipelines::utils::DeviceRequest;
pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::SentimentAnalysisModel;
pub use pipeline::{Output, Prediction, SentimentAnalysisPipeline};
