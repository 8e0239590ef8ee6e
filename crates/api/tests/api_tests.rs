//! Integration tests for the prediction API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use prediction_api::api::{create_router, AppState};
use serde_json::{json, Value};
use serving_lib::{
    ApiMetrics, FeatureSpec, FittedEncoder, LinearClassifier, ModelArtifact, Schema,
    StructuredLogger, TokenRegistry,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

fn loan_artifact() -> ModelArtifact {
    let feature_names: Vec<String> = [
        "no_of_dependents",
        "education",
        "self_employed",
        "income_annum",
        "loan_amount",
        "loan_term",
        "cibil_score",
        "residential_assets_value",
        "commercial_assets_value",
        "luxury_assets_value",
        "bank_asset_value",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    let schema = Schema::new(vec![
        FeatureSpec::numeric("no_of_dependents"),
        FeatureSpec::categorical("education", &["Graduate", "Not Graduate"]),
        FeatureSpec::categorical("self_employed", &["Yes", "No"]),
        FeatureSpec::numeric("income_annum"),
        FeatureSpec::numeric("loan_amount"),
        FeatureSpec::numeric("loan_term"),
        FeatureSpec::numeric("cibil_score"),
        FeatureSpec::numeric("residential_assets_value"),
        FeatureSpec::numeric("commercial_assets_value"),
        FeatureSpec::numeric("luxury_assets_value"),
        FeatureSpec::numeric("bank_asset_value"),
    ]);

    let mut categories = BTreeMap::new();
    categories.insert(
        "education".to_string(),
        vec!["Graduate".to_string(), "Not Graduate".to_string()],
    );
    categories.insert(
        "self_employed".to_string(),
        vec!["Yes".to_string(), "No".to_string()],
    );

    // Small weights keep the softmax away from saturation
    let approved: Vec<f64> = vec![
        -0.01, -0.05, 0.01, 0.0000001, -0.0000002, -0.002, 0.004, 0.0, 0.0, 0.0, 0.0,
    ];
    let rejected: Vec<f64> = approved.iter().map(|w| -w).collect();

    ModelArtifact {
        model_type: "logistic_regression".to_string(),
        accuracy: 0.9342,
        feature_names,
        target_names: vec!["Approved".to_string(), "Rejected".to_string()],
        schema,
        encoder: FittedEncoder {
            categories,
            scaling: BTreeMap::new(),
        },
        classifier: LinearClassifier {
            weights: vec![approved, rejected],
            intercepts: vec![0.1, -0.1],
        },
    }
}

fn reference_record() -> Value {
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

fn app_with_model() -> Router {
    let state = Arc::new(AppState {
        service_name: "loan-prediction-api".to_string(),
        model: Some(Arc::new(loan_artifact())),
        tokens: TokenRegistry::new(),
        auth_enabled: false,
        metrics: ApiMetrics::new(),
        logger: StructuredLogger::new("test"),
    });
    create_router(state)
}

fn app_without_model() -> Router {
    let state = Arc::new(AppState {
        service_name: "loan-prediction-api".to_string(),
        model: None,
        tokens: TokenRegistry::new(),
        auth_enabled: false,
        metrics: ApiMetrics::new(),
        logger: StructuredLogger::new("test"),
    });
    create_router(state)
}

fn app_with_auth(tokens: TokenRegistry) -> Router {
    let state = Arc::new(AppState {
        service_name: "loan-prediction-api".to_string(),
        model: Some(Arc::new(loan_artifact())),
        tokens,
        auth_enabled: true,
        metrics: ApiMetrics::new(),
        logger: StructuredLogger::new("test"),
    });
    create_router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string(), Some("application/json"), None).await
}

async fn post_raw(
    app: Router,
    uri: &str,
    body: String,
    content_type: Option<&str>,
    auth: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    if let Some(header) = auth {
        builder = builder.header("authorization", header);
    }
    let response = app
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_home_reports_service_metadata() {
    let (status, body) = get(app_with_model(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "loan-prediction-api");
    assert_eq!(body["model_accuracy"], 0.9342);
    assert!(body["endpoints"]["/predict"].is_string());
    assert_eq!(body["example_payload"]["education"], "Graduate");
}

#[tokio::test]
async fn test_health_reports_loaded_model() {
    let (status, body) = get(app_with_model(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_still_200_without_model() {
    let (status, body) = get(app_without_model(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn test_model_info_when_loaded() {
    let (status, body) = get(app_with_model(), "/model-info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "logistic_regression");
    assert_eq!(body["n_features"], 11);
    assert_eq!(body["n_classes"], 2);
    assert_eq!(body["target_names"], json!(["Approved", "Rejected"]));
}

#[tokio::test]
async fn test_model_info_returns_500_without_model() {
    let (status, body) = get(app_without_model(), "/model-info").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Model not loaded");
}

#[tokio::test]
async fn test_predict_get_returns_usage_example() {
    let (status, body) = get(app_with_model(), "/predict").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["example_payload"]["cibil_score"], 690);
}

#[tokio::test]
async fn test_predict_reference_record() {
    let (status, body) = post_json(app_with_model(), "/predict", &reference_record()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["timestamp"].is_string());

    let prediction = &body["prediction"];
    assert!(prediction["class"].is_string());
    let probabilities = prediction["probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 2);
    let total: f64 = probabilities.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 1.0).abs() < 1e-6);

    let confidence = prediction["confidence"].as_f64().unwrap();
    let max = probabilities
        .values()
        .map(|v| v.as_f64().unwrap())
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((confidence - max).abs() < 1e-12);
}

#[tokio::test]
async fn test_predict_batch_preserves_order() {
    let mut second = reference_record();
    second["cibil_score"] = json!(300);
    let batch = json!([reference_record(), second]);

    let (status, body) = post_json(app_with_model(), "/predict", &batch).await;

    assert_eq!(status, StatusCode::OK);
    let predictions = body["prediction"].as_array().unwrap();
    assert_eq!(predictions.len(), 2);
    for p in predictions {
        assert!(p["class"].is_string());
    }
}

#[tokio::test]
async fn test_predict_is_idempotent() {
    let (_, first) = post_json(app_with_model(), "/predict", &reference_record()).await;
    let (_, second) = post_json(app_with_model(), "/predict", &reference_record()).await;

    assert_eq!(first["prediction"], second["prediction"]);
}

#[tokio::test]
async fn test_predict_unknown_education_rejected() {
    let mut record = reference_record();
    record["education"] = json!("Unknown");

    let (status, body) = post_json(app_with_model(), "/predict", &record).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("education"));
    assert!(message.contains("Unknown"));
    assert!(message.contains("Graduate"));
    assert!(message.contains("Not Graduate"));
}

#[tokio::test]
async fn test_predict_missing_features_all_listed() {
    let record = json!({"education": "Graduate", "self_employed": "No"});

    let (status, body) = post_json(app_with_model(), "/predict", &record).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("Missing features"));
    assert!(message.contains("cibil_score"));
    assert!(message.contains("loan_amount"));
    assert!(message.contains("bank_asset_value"));
}

#[tokio::test]
async fn test_predict_negative_value_rejected() {
    let mut record = reference_record();
    record["loan_amount"] = json!(-7000);

    let (status, body) = post_json(app_with_model(), "/predict", &record).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("loan_amount"));
    assert!(message.contains("negative"));
}

#[tokio::test]
async fn test_predict_malformed_body_rejected() {
    let (status, body) = post_raw(
        app_with_model(),
        "/predict",
        "this is not json".to_string(),
        Some("application/json"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_returns_500_without_model() {
    let (status, body) = post_json(app_without_model(), "/predict", &reference_record()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Model not loaded");
}

#[tokio::test]
async fn test_unknown_route_404() {
    let (status, body) = get(app_with_model(), "/nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}

#[tokio::test]
async fn test_wrong_method_405() {
    let (status, body) = post_json(app_with_model(), "/health", &json!({})).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn test_auth_missing_token_gets_unauthorized_body() {
    // Known mismatch preserved from the previous service: 200, not 401
    let (status, body) = post_json(
        app_with_auth(TokenRegistry::new()),
        "/predict",
        &reference_record(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Status"], "Unauthorized");
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn test_auth_unknown_token_rejected() {
    let mut tokens = TokenRegistry::new();
    tokens.insert("real-token", "analyst", vec!["/predict".to_string()]);

    let (status, body) = post_raw(
        app_with_auth(tokens),
        "/predict",
        reference_record().to_string(),
        Some("application/json"),
        Some("Bearer wrong-token"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Status"], "Unauthorized");
}

#[tokio::test]
async fn test_auth_valid_token_passes() {
    let mut tokens = TokenRegistry::new();
    tokens.insert("real-token", "analyst", vec!["/predict".to_string()]);

    let (status, body) = post_raw(
        app_with_auth(tokens),
        "/predict",
        reference_record().to_string(),
        Some("application/json"),
        Some("Bearer real-token"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_auth_token_limited_to_other_endpoint_rejected() {
    let mut tokens = TokenRegistry::new();
    tokens.insert("narrow-token", "probe", vec!["/health".to_string()]);

    let (status, body) = post_raw(
        app_with_auth(tokens),
        "/predict",
        reference_record().to_string(),
        Some("application/json"),
        Some("Bearer narrow-token"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Status"], "Unauthorized");
}

#[tokio::test]
async fn test_auth_does_not_gate_get_routes() {
    let (status, _) = get(app_with_auth(TokenRegistry::new()), "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let app = app_with_model();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("prediction_api_prediction_latency_seconds"));
    assert!(text.contains("prediction_api_predictions_served_total"));
}
