//! Error types for this crate.
//!
//! Loading and inference return [`Result<T>`], which uses [`PipelineError`] as the error type.
//! The [`ModelHandle`](crate::handle::ModelHandle) narrows these down to [`ClassifyError`]
//! before anything reaches a client.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for model loading and inference.
///
/// # Example
///
/// ```rust,no_run
/// use sentiment_serve::error::PipelineError;
///
/// fn handle_error(e: PipelineError) {
///     match &e {
///         PipelineError::Download(_) => {
///             // Network issue - retry with backoff
///         }
///         PipelineError::Device(_) => {
///             // GPU unavailable - fall back to CPU
///         }
///         PipelineError::Config(_) => {
///             // Unsupported or malformed checkpoint - pick another model
///         }
///         _ => {
///             eprintln!("Internal error: {e}");
///         }
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenizer loading or tokenization failure.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// The checkpoint's configuration is missing, malformed or unsupported.
    #[error("{0}")]
    Config(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::Config(value.to_string())
    }
}

/// Failure of a single [`classify`](crate::handle::ModelHandle::classify) call.
///
/// Messages are safe to show to clients; the underlying cause is only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// The text was empty or whitespace-only.
    #[error("Input text must be a non-empty string.")]
    InvalidInput,

    /// The model failed to produce a usable prediction.
    #[error("Inference failed due to an internal error.")]
    InferenceFailure,
}
