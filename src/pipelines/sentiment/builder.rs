use std::path::PathBuf;

use super::model::SentimentAnalysisModel;
use super::pipeline::SentimentAnalysisPipeline;
use crate::error::{PipelineError, Result};
use crate::loaders::{
    ClassifierConfigLoader, ModelFiles, ModelSource, TokenizerLoader, WeightsLoader,
};
use crate::models::{
    Architecture, ModernBertSize, SentimentDistilBertModel, SentimentModernBertModel,
    DISTILBERT_SST2,
};
use crate::pipelines::utils::DeviceRequest;

/// Builder for creating [`SentimentAnalysisPipeline`] instances.
///
/// # Examples
///
/// ```rust,no_run
/// # use sentiment_serve::sentiment::{SentimentAnalysisPipelineBuilder, ModernBertSize};
/// # fn main() -> sentiment_serve::error::Result<()> {
/// let pipeline = SentimentAnalysisPipelineBuilder::modernbert(ModernBertSize::Base)
///     .cuda(0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SentimentAnalysisPipelineBuilder {
    source: ModelSource,
    device_request: DeviceRequest,
    cache_dir: Option<PathBuf>,
}

impl SentimentAnalysisPipelineBuilder {
    /// Any supported sequence-classification checkpoint, from the Hub or a local directory.
    pub fn new(source: impl Into<ModelSource>) -> Self {
        Self {
            source: source.into(),
            device_request: DeviceRequest::Cpu,
            cache_dir: None,
        }
    }

    /// DistilBERT fine-tuned on SST-2. Labels: `NEGATIVE`, `POSITIVE`.
    pub fn distilbert_sst2() -> Self {
        Self::new(ModelSource::hub(DISTILBERT_SST2))
    }

    /// Multilingual ModernBERT sentiment. Labels: `negative`, `neutral`, `positive`.
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self::new(size)
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Use the given device for inference.
    pub fn device(mut self, device_request: DeviceRequest) -> Self {
        self.device_request = device_request;
        self
    }

    /// Download Hub files into `dir` instead of the default HuggingFace cache.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Checkpoint the pipeline will be built from.
    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be fetched, its architecture is unsupported,
    /// or model loading or device initialization fails.
    pub fn build(self) -> Result<SentimentAnalysisPipeline> {
        let device = self.device_request.resolve()?;
        let files = ModelFiles::open(&self.source, self.cache_dir.as_deref())?;

        let (config, raw_config) = ClassifierConfigLoader::new(&files).load()?;
        let architecture = Architecture::detect(&config)?;
        let labels = config.labels()?;
        if config.num_labels() != labels.len() {
            return Err(PipelineError::Config(format!(
                "id2label has {} entries but label2id has {}",
                labels.len(),
                config.label2id.len()
            )));
        }

        tracing::debug!(model = %files.source(), %architecture, "loading weights");
        let vb = WeightsLoader::new(&files).load(&device)?;
        let model: Box<dyn SentimentAnalysisModel> = match architecture {
            Architecture::DistilBert => Box::new(SentimentDistilBertModel::load(
                &raw_config,
                labels.len(),
                vb,
                device,
            )?),
            Architecture::ModernBert => Box::new(SentimentModernBertModel::load(
                &raw_config,
                labels.len(),
                vb,
                device,
            )?),
        };

        let max_length = config
            .max_position_embeddings
            .unwrap_or_else(|| architecture.default_max_length());
        let tokenizer = TokenizerLoader::new(&files).load(max_length)?;

        Ok(SentimentAnalysisPipeline {
            model,
            tokenizer,
            labels,
            architecture,
        })
    }
}
