use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::error::ClassifyError;

/// One entry of a 422 response's `detail` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Path to the offending value, starting at `"body"`.
    pub loc: Vec<String>,
    /// Human-readable description.
    pub msg: String,
    /// Machine-readable error kind, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldError {
    pub(crate) fn new(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind,
        }
    }
}

/// Every way a request can fail, and the status each one maps to.
#[derive(Debug)]
pub enum ApiError {
    /// The body does not match `{ "text": <string> }`. 422.
    Schema(Vec<FieldError>),
    /// The body could not be read at all (too large, connection error).
    Body(BytesRejection),
    /// The text is well-typed but unusable. 400.
    Validation(ClassifyError),
    /// The model failed. 500.
    Inference,
}

impl From<ClassifyError> for ApiError {
    fn from(value: ClassifyError) -> Self {
        match value {
            ClassifyError::InvalidInput => ApiError::Validation(value),
            ClassifyError::InferenceFailure => ApiError::Inference,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(value: BytesRejection) -> Self {
        ApiError::Body(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Schema(detail) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": detail })))
                    .into_response()
            }
            ApiError::Body(rejection) => rejection.into_response(),
            ApiError::Validation(err) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": err.to_string() })))
                    .into_response()
            }
            ApiError::Inference => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": ClassifyError::InferenceFailure.to_string() })),
            )
                .into_response(),
        }
    }
}
