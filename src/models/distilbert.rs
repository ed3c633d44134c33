use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use serde::Deserialize;
use tokenizers::Encoding;

use crate::error::Result;
use crate::pipelines::sentiment::model::SentimentAnalysisModel;

/// Default checkpoint: DistilBERT fine-tuned on SST-2 (`NEGATIVE` / `POSITIVE`).
pub const DISTILBERT_SST2: &str = "distilbert-base-uncased-finetuned-sst-2-english";

#[derive(Deserialize)]
struct HeadConfig {
    dim: usize,
}

/// DistilBERT encoder with the `DistilBertForSequenceClassification` head:
/// first-token pooling, `pre_classifier` + ReLU, then `classifier`.
pub struct SentimentDistilBertModel {
    encoder: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    device: Device,
}

impl SentimentDistilBertModel {
    pub fn load(
        raw_config: &str,
        num_labels: usize,
        vb: VarBuilder<'static>,
        device: Device,
    ) -> Result<Self> {
        let config: Config = serde_json::from_str(raw_config)?;
        let head: HeadConfig = serde_json::from_str(raw_config)?;

        let encoder = DistilBertModel::load(vb.pp("distilbert"), &config)?;
        let pre_classifier = linear(head.dim, head.dim, vb.pp("pre_classifier"))?;
        let classifier = linear(head.dim, num_labels, vb.pp("classifier"))?;

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            device,
        })
    }
}

impl SentimentAnalysisModel for SentimentDistilBertModel {
    fn forward(&self, encoding: &Encoding) -> Result<Tensor> {
        let seq_len = encoding.get_ids().len();
        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        // Non-zero entries are masked out; a single unpadded sequence attends everywhere.
        let attention_mask = Tensor::zeros((seq_len, seq_len), DType::U8, &self.device)?;

        let hidden = self.encoder.forward(&input_ids, &attention_mask)?;
        let pooled = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&pooled)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;

        Ok(logits)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
