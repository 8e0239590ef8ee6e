//! Observability infrastructure for the prediction API
//!
//! Provides:
//! - Prometheus metrics (request latency, predictions served, rejected
//!   inputs, model info)
//! - Structured JSON logging with tracing

use prometheus::{register_gauge_vec, register_histogram, register_int_gauge, GaugeVec, Histogram, IntGauge};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ApiMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ApiMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_served: IntGauge,
    validation_failures: IntGauge,
    auth_rejections: IntGauge,
    model_info: GaugeVec,
}

impl ApiMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "prediction_api_prediction_latency_seconds",
                "Time spent serving one predict request",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_served: register_int_gauge!(
                "prediction_api_predictions_served_total",
                "Total number of prediction rows served"
            )
            .expect("Failed to register predictions_served"),

            validation_failures: register_int_gauge!(
                "prediction_api_validation_failures_total",
                "Total number of requests rejected by input validation"
            )
            .expect("Failed to register validation_failures"),

            auth_rejections: register_int_gauge!(
                "prediction_api_auth_rejections_total",
                "Total number of requests rejected by the auth gate"
            )
            .expect("Failed to register auth_rejections"),

            model_info: register_gauge_vec!(
                "prediction_api_model_info",
                "Recorded training accuracy of the currently loaded model",
                &["model_type"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// API metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ApiMetrics {
    _private: (),
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ApiMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ApiMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record how long one predict request took
    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Count served prediction rows
    pub fn add_predictions_served(&self, rows: i64) {
        self.inner().predictions_served.add(rows);
    }

    /// Count a request the validator or encoder rejected
    pub fn inc_validation_failures(&self) {
        self.inner().validation_failures.inc();
    }

    /// Count a request the auth gate turned away
    pub fn inc_auth_rejections(&self) {
        self.inner().auth_rejections.inc();
    }

    /// Publish the loaded model's type and accuracy
    pub fn set_model_info(&self, model_type: &str, accuracy: f64) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[model_type])
            .set(accuracy);
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for startup, shutdown,
/// and prediction traffic.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_loaded: bool) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            model_loaded = model_loaded,
            "Prediction API started"
        );
    }

    /// Log a startup that fell back to degraded mode
    pub fn log_degraded_start(&self, error: &dyn std::error::Error) {
        warn!(
            event = "degraded_start",
            service = %self.service_name,
            error = %error,
            "Model artifact failed to load, serving in degraded mode"
        );
    }

    /// Log a served prediction
    pub fn log_prediction(&self, rows: usize, predicted_class: &str, confidence: f64) {
        info!(
            event = "prediction_served",
            service = %self.service_name,
            rows = rows,
            predicted_class = %predicted_class,
            confidence = confidence,
            "Prediction served"
        );
    }

    /// Log a rejected input; the message is the one returned to the caller
    pub fn log_rejected_input(&self, message: &str) {
        info!(
            event = "input_rejected",
            service = %self.service_name,
            reason = %message,
            "Input rejected by validation"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Prediction API shutting down"
        );
    }
}
