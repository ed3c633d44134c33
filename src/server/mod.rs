//! HTTP surface: `POST /predict` and `GET /health`.

mod error;
mod handlers;
mod payload;

pub use error::{ApiError, FieldError};
pub use payload::{HealthResponse, InferenceRequest, InferenceResponse};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Semaphore;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handle::ModelHandle;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The loaded classifier.
    pub model: ModelHandle,
    /// One permit per model call allowed to run at the same time.
    pub inference_slots: Arc<Semaphore>,
}

impl AppState {
    /// State allowing at most `workers` concurrent model calls (at least one).
    pub fn new(model: ModelHandle, workers: usize) -> Self {
        Self {
            model,
            inference_slots: Arc::new(Semaphore::new(workers.max(1))),
        }
    }
}

/// Routes without the serving-layer middleware. Tests drive this directly.
///
/// At most `workers` requests run the model at once; the rest wait for a slot.
pub fn router(model: ModelHandle, workers: usize) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(AppState::new(model, workers))
}

/// [`router`] plus request tracing and a per-request timeout (408 when exceeded).
pub fn app(model: ModelHandle, workers: usize, request_timeout: Duration) -> Router {
    router(model, workers)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::handle::TextClassifier;
    use crate::pipelines::sentiment::Prediction;

    struct Unused;

    impl TextClassifier for Unused {
        fn classify(&self, _text: &str) -> Result<Prediction> {
            unreachable!("state tests never classify")
        }

        fn labels(&self) -> &[String] {
            &[]
        }
    }

    #[test]
    fn inference_slots_match_worker_count() {
        let state = AppState::new(ModelHandle::new("test", Unused), 3);
        assert_eq!(state.inference_slots.available_permits(), 3);

        let state = AppState::new(ModelHandle::new("test", Unused), 0);
        assert_eq!(state.inference_slots.available_permits(), 1);
    }
}
