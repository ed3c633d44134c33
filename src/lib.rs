//! Sentiment analysis over HTTP.
//!
//! A pre-trained sequence-classification checkpoint, loaded once with
//! [Candle](https://github.com/huggingface/candle), behind a single `POST /predict` endpoint.
//!
//! - [`sentiment`]: the classification pipeline (tokenizer + model + softmax scoring).
//! - [`handle`]: the shared Model Handle, which validates input and hides model failures.
//! - [`server`]: the axum router mapping handle outcomes to HTTP statuses.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod config;
pub mod error;
pub mod handle;
pub mod server;

pub use loaders::ModelSource;
pub use pipelines::sentiment;
