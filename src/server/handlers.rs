use axum::extract::State;
use axum::Json;

use super::error::ApiError;
use super::payload::{HealthResponse, InferenceRequest, InferenceResponse};
use super::AppState;

/// `POST /predict`
///
/// The model call runs on the blocking pool so a slow inference never stalls the
/// executor threads serving other connections. The inference slot is held by the
/// blocking task itself, so a request abandoned by the timeout layer keeps its slot
/// until the model call actually returns.
pub async fn predict(
    State(state): State<AppState>,
    request: InferenceRequest,
) -> Result<Json<InferenceResponse>, ApiError> {
    let slot = state
        .inference_slots
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "inference slots closed");
            ApiError::Inference
        })?;

    let handle = state.model.clone();
    let result = tokio::task::spawn_blocking(move || {
        let _slot = slot;
        handle.classify(&request.text)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "classification task did not complete");
        ApiError::Inference
    })??;

    Ok(Json(InferenceResponse { result }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model.model_id().to_string(),
        labels: state.model.labels().to_vec(),
    })
}
