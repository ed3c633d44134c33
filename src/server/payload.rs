use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ApiError, FieldError};
use crate::pipelines::sentiment::Prediction;

/// Body of `POST /predict`.
///
/// Extracting it checks the shape only; emptiness is left to the
/// [`ModelHandle`](crate::handle::ModelHandle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Text to classify.
    pub text: String,
}

impl InferenceRequest {
    /// Parse a raw body, reporting shape problems with the path of the offending value.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(schema_error(&["body"], "Field required", "missing"));
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            schema_error(&["body"], format!("JSON decode error: {e}"), "json_invalid")
        })?;

        let Value::Object(mut fields) = value else {
            return Err(schema_error(
                &["body"],
                "Input should be a valid dictionary or object to extract fields from",
                "model_attributes_type",
            ));
        };

        match fields.remove("text") {
            Some(Value::String(text)) => Ok(Self { text }),
            Some(_) => Err(schema_error(
                &["body", "text"],
                "Input should be a valid string",
                "string_type",
            )),
            None => Err(schema_error(&["body", "text"], "Field required", "missing")),
        }
    }
}

fn schema_error(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> ApiError {
    ApiError::Schema(vec![FieldError::new(loc, msg, kind)])
}

impl<S> FromRequest<S> for InferenceRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        Self::from_json_slice(&body)
    }
}

/// Body of a successful `POST /predict`.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceResponse {
    /// Predictions, top label first.
    pub result: Vec<Prediction>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` once the server is up.
    pub status: &'static str,
    /// Hub repo id or local path of the loaded model.
    pub model: String,
    /// Labels the model can return.
    pub labels: Vec<String>,
}
