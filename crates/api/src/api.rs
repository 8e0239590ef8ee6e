//! HTTP surface: routes, handlers, and the auth gate

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};
use serving_lib::{
    bearer_token, predict_batch, ApiMetrics, ModelArtifact, PredictInput, StructuredLogger,
    TokenRegistry,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Shared application state, injected into every handler
pub struct AppState {
    pub service_name: String,
    /// None when the artifact failed to load; the service then runs in
    /// degraded mode and model-dependent routes report unavailability
    pub model: Option<Arc<ModelArtifact>>,
    pub tokens: TokenRegistry,
    pub auth_enabled: bool,
    pub metrics: ApiMetrics,
    pub logger: StructuredLogger,
}

fn example_payload() -> Value {
    json!({
        "no_of_dependents": 1,
        "education": "Graduate",
        "self_employed": "No",
        "income_annum": 120000,
        "loan_amount": 7000,
        "loan_term": 72,
        "cibil_score": 690,
        "residential_assets_value": 0,
        "commercial_assets_value": 0,
        "luxury_assets_value": 0,
        "bank_asset_value": 0
    })
}

/// Service metadata, no validation involved
async fn home(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "model_accuracy": state.model.as_ref().map(|m| m.accuracy),
        "endpoints": {
            "/": "GET service metadata",
            "/health": "GET liveness and model status",
            "/model-info": "GET loaded model metadata",
            "/predict": "GET usage example, POST prediction request",
            "/metrics": "GET Prometheus metrics"
        },
        "example_payload": example_payload()
    }))
}

/// Liveness plus whether the artifact loaded; always answers 200
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "model_loaded": state.model.is_some()
    }))
}

async fn model_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.model.as_ref() {
        Some(model) => (
            StatusCode::OK,
            Json(json!({
                "model_type": model.model_type,
                "accuracy": model.accuracy,
                "feature_names": model.feature_names,
                "n_features": model.feature_names.len(),
                "target_names": model.target_names,
                "n_classes": model.target_names.len()
            })),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Model not loaded"})),
        ),
    }
}

async fn predict_usage() -> impl IntoResponse {
    Json(json!({
        "message": "Send a POST request with one JSON record or a list of records",
        "example_payload": example_payload()
    }))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictInput>, JsonRejection>,
) -> impl IntoResponse {
    let start = Instant::now();

    let Some(model) = state.model.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Model not loaded"})),
        );
    };

    let Json(input) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            debug!(reason = %rejection, "Rejected malformed request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Request body must be a JSON record or a list of records"
                })),
            );
        }
    };

    match predict_batch(model, &input) {
        Ok(output) => {
            let outcomes = output.outcomes();
            state.metrics.add_predictions_served(outcomes.len() as i64);
            state
                .metrics
                .observe_prediction_latency(start.elapsed().as_secs_f64());
            if let Some(first) = outcomes.first() {
                state
                    .logger
                    .log_prediction(outcomes.len(), &first.class, first.confidence);
            }
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "prediction": output,
                    "timestamp": Utc::now().to_rfc3339()
                })),
            )
        }
        Err(err) if err.is_client_fault() => {
            state.metrics.inc_validation_failures();
            state.logger.log_rejected_input(&err.to_string());
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": err.to_string()})),
            )
        }
        Err(err) => {
            // Detail stays server-side; the caller gets a generic message
            error!(error = %err, "Prediction pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
        }
    }
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Endpoint not found"})),
    )
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({"error": "Method not allowed"})),
    )
}

fn requires_token(method: &Method, path: &str) -> bool {
    *method == Method::POST && path == "/predict"
}

/// Bearer-token gate in front of the protected routes
pub async fn auth_gate(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    if !state.auth_enabled || !requires_token(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    match token {
        Some(t) if state.tokens.authorize(t, req.uri().path()) => next.run(req).await,
        _ => {
            state.metrics.inc_auth_rejections();
            // Known mismatch carried over from the previous service:
            // failed auth answers 200 with an Unauthorized body, not 401.
            Json(json!({"Status": "Unauthorized"})).into_response()
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/model-info", get(model_info).fallback(method_not_allowed))
        .route(
            "/predict",
            get(predict_usage).post(predict).fallback(method_not_allowed),
        )
        .route("/metrics", get(metrics).fallback(method_not_allowed))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .fallback(not_found)
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
