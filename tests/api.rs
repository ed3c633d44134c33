//! HTTP contract tests for `/predict` and `/health`, run against a stub classifier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sentiment_serve::error::{PipelineError, Result};
use sentiment_serve::handle::{ModelHandle, TextClassifier};
use sentiment_serve::sentiment::Prediction;
use sentiment_serve::server::{app, router};
use serde_json::{json, Value};
use tower::ServiceExt;

const WORKERS: usize = 4;

/// Keyword classifier: "love"/"wonderful" is positive, "hate"/"garbage" negative,
/// "explode" fails, "slow" sleeps.
struct StubClassifier {
    calls: Arc<AtomicUsize>,
    labels: Vec<String>,
}

impl TextClassifier for StubClassifier {
    fn classify(&self, text: &str) -> Result<Prediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = text.to_lowercase();
        if text.contains("explode") {
            return Err(PipelineError::Unexpected(
                "CUDA_ERROR_ILLEGAL_ADDRESS at 0xdeadbeef".into(),
            ));
        }
        if text.contains("slow") {
            std::thread::sleep(Duration::from_millis(300));
        }

        let positive = ["love", "wonderful"].iter().any(|w| text.contains(w));
        let negative = ["hate", "garbage"].iter().any(|w| text.contains(w));
        let (label, score) = match (positive, negative) {
            (true, false) => ("POSITIVE", 0.998),
            (false, true) => ("NEGATIVE", 0.995),
            _ => ("POSITIVE", 0.61),
        };
        Ok(Prediction {
            label: label.into(),
            score,
        })
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn stub_handle() -> (ModelHandle, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let classifier = StubClassifier {
        calls: calls.clone(),
        labels: vec!["NEGATIVE".into(), "POSITIVE".into()],
    };
    (ModelHandle::new("stub/sst2", classifier), calls)
}

async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/predict")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

#[tokio::test]
async fn predict_valid_input() {
    let (handle, _) = stub_handle();
    let (status, body) = post_json(
        router(handle, WORKERS),
        json!({ "text": "The service was outstanding and fast!" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let result = body["result"].as_array().unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0]["label"].is_string());
    assert!(result[0]["score"].is_number());
}

#[tokio::test]
async fn predict_known_sentiments() {
    let (handle, _) = stub_handle();
    let app = router(handle, WORKERS);

    let (status, body) = post_json(app.clone(), json!({ "text": "I love it." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["label"], "POSITIVE");
    assert!(body["result"][0]["score"].as_f64().unwrap() > 0.5);

    let (status, body) = post_json(app, json!({ "text": "I hate this." })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"][0]["label"], "NEGATIVE");
    assert!(body["result"][0]["score"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn predict_multiple_inputs_stay_in_label_set() {
    let (handle, _) = stub_handle();
    let app = router(handle, WORKERS);

    for text in [
        "I love it.",
        "I hate this.",
        "It was okay.",
        "This product is garbage.",
        "Absolutely wonderful!",
    ] {
        let (status, body) = post_json(app.clone(), json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK, "{text}");
        let result = &body["result"][0];
        assert!(["POSITIVE", "NEGATIVE"].contains(&result["label"].as_str().unwrap()));
        let score = result["score"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&score));
    }
}

#[tokio::test]
async fn predict_missing_text_field() {
    let (handle, calls) = stub_handle();
    let (status, body) = post_json(router(handle, WORKERS), json!({})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"].as_array().unwrap().last().unwrap(), "text");
    assert_eq!(body["detail"][0]["type"], "missing");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn predict_non_string_text_never_reaches_the_model() {
    let (handle, calls) = stub_handle();
    let app = router(handle, WORKERS);

    for text in [
        Value::Null,
        json!(42),
        json!(1.5),
        json!(true),
        json!(["I love it."]),
        json!({ "nested": "I love it." }),
    ] {
        let (status, body) = post_json(app.clone(), json!({ "text": text })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], json!(["body", "text"]));
        assert_eq!(body["detail"][0]["type"], "string_type");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn predict_malformed_bodies() {
    let (handle, calls) = stub_handle();
    let app = router(handle, WORKERS);

    let (status, body) = post_raw(app.clone(), "{\"text\": ").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["type"], "json_invalid");

    let (status, body) = post_json(app.clone(), json!(["I love it."])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));

    let (status, _) = post_raw(app, "").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn predict_empty_text_is_a_client_error() {
    let (handle, calls) = stub_handle();
    let app = router(handle, WORKERS);

    for text in ["", "   ", "\n\t"] {
        let (status, body) = post_json(app.clone(), json!({ "text": text })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("non-empty"));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn predict_model_failure_is_generic_500() {
    let (handle, _) = stub_handle();
    let (status, body) = post_json(
        router(handle, WORKERS),
        json!({ "text": "please explode" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(!detail.contains("CUDA"));
    assert!(!detail.contains("0xdeadbeef"));
}

#[tokio::test]
async fn predict_is_deterministic() {
    let (handle, _) = stub_handle();
    let app = router(handle, WORKERS);

    let (_, first) = post_json(app.clone(), json!({ "text": "It was okay." })).await;
    let (_, second) = post_json(app, json!({ "text": "It was okay." })).await;
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn predict_handles_concurrent_requests() {
    let (handle, calls) = stub_handle();
    let app = router(handle, WORKERS);

    let requests: Vec<_> = (0..16)
        .map(|i| {
            let app = app.clone();
            let text = if i % 2 == 0 { "I love it." } else { "I hate this." };
            tokio::spawn(async move { post_json(app, json!({ "text": text })).await })
        })
        .collect();

    for (i, request) in requests.into_iter().enumerate() {
        let (status, body) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let expected = if i % 2 == 0 { "POSITIVE" } else { "NEGATIVE" };
        assert_eq!(body["result"][0]["label"], expected);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 16);
}

/// Sleeps on every call and records the most calls it ever saw running at once.
struct PeakTracker {
    in_flight: AtomicUsize,
    peak: Arc<AtomicUsize>,
    labels: Vec<String>,
}

impl TextClassifier for PeakTracker {
    fn classify(&self, _text: &str) -> Result<Prediction> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Prediction {
            label: "POSITIVE".into(),
            score: 0.9,
        })
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn model_calls_never_exceed_worker_limit() {
    let peak = Arc::new(AtomicUsize::new(0));
    let classifier = PeakTracker {
        in_flight: AtomicUsize::new(0),
        peak: peak.clone(),
        labels: vec!["NEGATIVE".into(), "POSITIVE".into()],
    };
    let app = router(ModelHandle::new("stub/peak", classifier), 2);

    let requests: Vec<_> = (0..12)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { post_json(app, json!({ "text": "I love it." })).await })
        })
        .collect();

    for request in requests {
        let (status, _) = request.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 2, "peak concurrent model calls: {peak}");
}

#[tokio::test]
async fn predict_times_out_in_serving_layer() {
    let (handle, _) = stub_handle();
    let app = app(handle, WORKERS, Duration::from_millis(50));

    let (status, _) = post_json(app, json!({ "text": "slow" })).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn health_reports_model_and_labels() {
    let (handle, _) = stub_handle();
    let response = router(handle, WORKERS)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({ "status": "ok", "model": "stub/sst2", "labels": ["NEGATIVE", "POSITIVE"] })
    );
}

#[tokio::test]
async fn predict_rejects_get() {
    let (handle, _) = stub_handle();
    let response = router(handle, WORKERS)
        .oneshot(Request::get("/predict").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
