//! Loan prediction API server
//!
//! Loads the model artifact once at startup and serves predictions over
//! JSON. A missing or corrupt artifact puts the service into degraded
//! mode instead of failing startup.

use anyhow::Result;
use prediction_api::{api, config};
use serving_lib::{ApiMetrics, ModelArtifact, StructuredLogger, TokenRegistry};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = config::ApiConfig::load()?;
    info!(service = %config.service_name, port = config.port, "Service configured");

    let logger = StructuredLogger::new(&config.service_name);
    let metrics = ApiMetrics::new();

    // Artifact load failure degrades the service rather than killing it
    let model = match ModelArtifact::load(&config.model_path) {
        Ok(artifact) => {
            metrics.set_model_info(&artifact.model_type, artifact.accuracy);
            Some(Arc::new(artifact))
        }
        Err(e) => {
            logger.log_degraded_start(&e);
            None
        }
    };

    let tokens = TokenRegistry::from_env();
    if config.auth_enabled && tokens.is_empty() {
        warn!("Auth is enabled but the token allow-list is empty; every POST /predict will be rejected");
    }

    logger.log_startup(SERVICE_VERSION, model.is_some());

    let state = Arc::new(api::AppState {
        service_name: config.service_name.clone(),
        model,
        tokens,
        auth_enabled: config.auth_enabled,
        metrics,
        logger: logger.clone(),
    });

    let _api_handle = tokio::spawn(api::serve(config.port, state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");

    Ok(())
}
