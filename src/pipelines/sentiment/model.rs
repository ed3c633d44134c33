use crate::error::Result;
use candle_core::{Device, Tensor};
use tokenizers::Encoding;

/// A sequence-classification model: one encoded text in, class logits out.
pub trait SentimentAnalysisModel: Send + Sync {
    /// Logits of shape `(1, num_labels)` for a single, unpadded encoding.
    fn forward(&self, encoding: &Encoding) -> Result<Tensor>;

    /// Device the weights live on.
    fn device(&self) -> &Device;
}
