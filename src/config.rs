//! Process configuration.
//!
//! Every option can be given as a flag or through its `SENTIMENT_*` environment variable.
//! Defaults match a small CPU deployment: 4 workers on `0.0.0.0:8000`, 120 s request timeout.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::loaders::ModelSource;
use crate::models::DISTILBERT_SST2;
use crate::pipelines::utils::DeviceRequest;
use crate::sentiment::SentimentAnalysisPipelineBuilder;

/// Sentiment analysis over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "sentiment-serve", version)]
#[command(about = "Serve a sentiment-classification model over HTTP")]
#[command(after_help = r#"Examples:
    # Default DistilBERT SST-2 model on port 8000
    sentiment-serve

    # Multilingual ModernBERT on the first GPU
    sentiment-serve --model clapAI/modernBERT-base-multilingual-sentiment --cuda 0

    # Local checkpoint directory, no network needed
    sentiment-serve --model ./checkpoints/sst2
"#)]
pub struct Config {
    // Server options
    /// Address to listen on
    #[arg(long, env = "SENTIMENT_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Maximum concurrent model calls; also sizes the runtime worker threads
    #[arg(
        long,
        env = "SENTIMENT_WORKERS",
        default_value_t = 4,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub workers: u16,

    /// Seconds a request may take before it is answered with 408
    #[arg(
        long,
        env = "SENTIMENT_TIMEOUT_SECS",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Log filter used when RUST_LOG is unset (e.g. info, debug, sentiment_serve=trace)
    #[arg(long, env = "SENTIMENT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    // Model options
    /// HuggingFace Hub repo id or path to a local checkpoint directory
    #[arg(long, env = "SENTIMENT_MODEL", default_value = DISTILBERT_SST2)]
    pub model: String,

    /// Hub revision (branch, tag or commit); ignored for local checkpoints
    #[arg(long, env = "SENTIMENT_MODEL_REVISION", default_value = "main")]
    pub revision: String,

    /// Directory for downloaded model files (default: the HuggingFace cache)
    #[arg(long, env = "SENTIMENT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Run on this CUDA device instead of the CPU
    #[arg(long, env = "SENTIMENT_CUDA_DEVICE", value_name = "INDEX")]
    pub cuda: Option<usize>,
}

impl Config {
    /// Hub repo or local directory named by `--model`.
    pub fn model_source(&self) -> ModelSource {
        ModelSource::parse(&self.model, &self.revision)
    }

    /// CUDA device from `--cuda`, otherwise the CPU.
    pub fn device_request(&self) -> DeviceRequest {
        self.cuda.map(DeviceRequest::Cuda).unwrap_or_default()
    }

    /// Time a request may take before the serving layer answers 408.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pipeline builder for the configured model and device.
    pub fn pipeline_builder(&self) -> SentimentAnalysisPipelineBuilder {
        let builder =
            SentimentAnalysisPipelineBuilder::new(self.model_source()).device(self.device_request());
        match &self.cache_dir {
            Some(dir) => builder.cache_dir(dir.clone()),
            None => builder,
        }
    }
}
