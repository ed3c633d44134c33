// ============ Model implementations ============

pub(crate) mod distilbert;
pub(crate) mod modernbert;

pub use distilbert::{SentimentDistilBertModel, DISTILBERT_SST2};
pub use modernbert::{ModernBertSize, SentimentModernBertModel};

use crate::error::{PipelineError, Result};
use crate::loaders::ClassifierConfig;

/// Sequence-classification architectures the service can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    /// `model_type: "distilbert"`.
    DistilBert,
    /// `model_type: "modernbert"`.
    ModernBert,
}

impl Architecture {
    /// Pick the architecture from a checkpoint's `model_type`.
    pub fn detect(config: &ClassifierConfig) -> Result<Self> {
        match config.model_type.as_deref() {
            Some("distilbert") => Ok(Architecture::DistilBert),
            Some("modernbert") => Ok(Architecture::ModernBert),
            Some(other) => Err(PipelineError::Config(format!(
                "Unsupported model_type '{other}'. Supported: distilbert, modernbert"
            ))),
            None => Err(PipelineError::Config(
                "config.json has no model_type; cannot pick an architecture".into(),
            )),
        }
    }

    /// Sequence length used when the checkpoint does not state one.
    pub(crate) fn default_max_length(&self) -> usize {
        match self {
            Architecture::DistilBert => 512,
            Architecture::ModernBert => 8192,
        }
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Architecture::DistilBert => "distilbert",
            Architecture::ModernBert => "modernbert",
        };
        write!(f, "{name}")
    }
}
