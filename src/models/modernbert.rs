use std::collections::HashMap;

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use tokenizers::Encoding;

use crate::error::Result;
use crate::loaders::ModelSource;
use crate::pipelines::sentiment::model::SentimentAnalysisModel;

/// Available ModernBERT sentiment model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    /// Hub repository of the preset.
    pub fn repo_id(&self) -> &'static str {
        match self {
            ModernBertSize::Base => "clapAI/modernBERT-base-multilingual-sentiment",
            ModernBertSize::Large => "clapAI/modernBERT-large-multilingual-sentiment",
        }
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

impl From<ModernBertSize> for ModelSource {
    fn from(size: ModernBertSize) -> Self {
        ModelSource::hub(size.repo_id())
    }
}

pub struct SentimentModernBertModel {
    model: CandleModernBertForSequenceClassification,
    device: Device,
}

impl SentimentModernBertModel {
    pub fn load(
        raw_config: &str,
        num_labels: usize,
        vb: VarBuilder<'static>,
        device: Device,
    ) -> Result<Self> {
        let mut config: Config = serde_json::from_str(raw_config)?;
        patch_config_num_labels(&mut config, num_labels);

        let model = CandleModernBertForSequenceClassification::load(vb, &config)?;

        Ok(Self { model, device })
    }
}

impl SentimentAnalysisModel for SentimentModernBertModel {
    fn forward(&self, encoding: &Encoding) -> Result<Tensor> {
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        Ok(self.model.forward(&input_ids, &attention_mask)?)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

// The classification head is sized from `classifier_config.id2label`, which some
// checkpoints omit or only carry at the top level of config.json.
fn patch_config_num_labels(config: &mut Config, num_labels: usize) {
    if config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0)
        != num_labels
    {
        let id2label: HashMap<String, String> = (0..num_labels)
            .map(|i| (i.to_string(), format!("label_{i}")))
            .collect();
        let label2id: HashMap<String, String> = id2label
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();

        config.classifier_config = Some(ClassifierConfig {
            id2label,
            label2id,
            classifier_pooling: ClassifierPooling::default(),
        });
    }
}
