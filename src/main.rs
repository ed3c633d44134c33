//! sentiment-serve - HTTP sentiment analysis
//!
//! Usage:
//!     sentiment-serve [OPTIONS]
//!
//! The model is loaded before the socket is bound; if loading fails the process exits
//! with an error and never accepts a connection.

use anyhow::{Context, Result};
use clap::Parser;
use sentiment_serve::config::Config;
use sentiment_serve::handle::ModelHandle;
use sentiment_serve::server;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config.log_level);

    let handle = load_model(&config).inspect_err(|e| {
        tracing::error!(error = ?e, "model failed to load; not serving");
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(usize::from(config.workers))
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let app = server::app(handle, usize::from(config.workers), config.request_timeout());
    runtime.block_on(server::serve(config.bind, app))
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_model(config: &Config) -> Result<ModelHandle> {
    let source = config.model_source();
    tracing::info!(model = %source, device = ?config.device_request(), "loading model");

    let pipeline = config
        .pipeline_builder()
        .build()
        .with_context(|| format!("failed to load model '{source}'"))?;

    tracing::info!(
        model = %source,
        architecture = %pipeline.architecture(),
        labels = ?pipeline.labels(),
        device = ?pipeline.device().location(),
        "model ready"
    );

    Ok(ModelHandle::new(source.to_string(), pipeline))
}
