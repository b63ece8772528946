//! HTTP contract tests for the anomaly endpoints.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use fin_anomaly_guard::anomaly_detection::{
    DemoDetector, DetectionService, OutlierModel, RuleBasedDetector, StatisticalDetector,
    StubHistoryProvider,
};
use fin_anomaly_guard::api::ApiServer;
use fin_anomaly_guard::config::AppConfig;

fn server_without_model() -> TestServer {
    let mut config = AppConfig::default();
    config.detection.model_path = "/nonexistent/outlier_model.json".into();
    TestServer::new(ApiServer::new(config).router()).unwrap()
}

/// Server whose statistical strategy uses an in-memory model instead of a
/// disk artifact.
fn server_with_model(model: OutlierModel) -> TestServer {
    let service = DetectionService::from_parts(
        Arc::new(StubHistoryProvider),
        RuleBasedDetector::new(),
        StatisticalDetector::preloaded(model),
        DemoDetector::with_seed(5),
    );
    let server = ApiServer::with_service(AppConfig::default(), Arc::new(service));
    TestServer::new(server.router()).unwrap()
}

fn flagrant_payload() -> Value {
    json!({
        "userId": "user-7",
        "amount": 25000,
        "timestamp": "2024-06-01T02:00:00Z",
        "merchant": "Unknown Shop",
        "is_international": true
    })
}

#[tokio::test]
async fn test_health() {
    let server = server_without_model();
    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_rule_endpoint_flags_flagrant_transaction() {
    let server = server_without_model();
    let response = server.post("/anomaly/rule").json(&flagrant_payload()).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["anomaly"], json!(true));
    assert_eq!(body["score"], json!(1.0));
    assert_eq!(
        body["reasons"],
        json!([
            "Very large transaction amount",
            "High compared to user's typical transaction",
            "Amount is far outside typical variance",
            "Transaction at unusual hour",
            "Merchant is new/unfamiliar",
            "International high-value transaction",
        ])
    );
}

#[tokio::test]
async fn test_rule_endpoint_clean_transaction() {
    let server = server_without_model();
    let response = server
        .post("/anomaly/rule")
        .json(&json!({
            "userId": "user-7",
            "amount": 300,
            "timestamp": "2024-06-01T14:00:00Z",
            "merchant": "Zomato"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(
        body,
        json!({ "anomaly": false, "score": 0.0, "reasons": [] })
    );
}

#[tokio::test]
async fn test_rule_endpoint_applies_defaults_for_sparse_payload() {
    let server = server_without_model();
    // No timestamp, category, flag, or currency; hour comes from meta.
    let response = server
        .post("/anomaly/rule")
        .json(&json!({
            "userId": "user-7",
            "amount": 200,
            "merchant": "Amazon",
            "meta": { "hour": 12 }
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["anomaly"], json!(false));
}

#[tokio::test]
async fn test_missing_user_id_rejected() {
    let server = server_without_model();

    let response = server
        .post("/anomaly/rule")
        .json(&json!({ "userId": "  ", "amount": 100, "merchant": "Zomato" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        json!("userId is required")
    );

    let response = server
        .post("/anomaly/ml")
        .json(&json!({ "userId": "", "amount": 100, "merchant": "Zomato" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_amount_rejected() {
    let server = server_without_model();
    let response = server
        .post("/anomaly/rule")
        .json(&json!({ "userId": "user-7", "amount": -5, "merchant": "Zomato" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ml_endpoint_unavailable_without_artifact() {
    let server = server_without_model();
    let response = server.post("/anomaly/ml").json(&flagrant_payload()).await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["error"],
        json!("detection backend unavailable")
    );
}

#[tokio::test]
async fn test_ml_endpoint_with_preloaded_model() {
    // Margin 1 - amount/1000: flags anything above 1000 units.
    let server = server_with_model(OutlierModel::new(vec![-0.001, 0.0, 0.0, 0.0], 1.0, -1));

    let response = server
        .post("/anomaly/ml")
        .json(&json!({
            "userId": "user-7",
            "amount": 50000,
            "timestamp": "2024-06-01T14:00:00Z",
            "merchant": "Unknown Shop"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["anomaly"], json!(true));
    assert_eq!(body["reasons"], json!(["ML model flagged as outlier"]));

    let response = server
        .post("/anomaly/ml")
        .json(&json!({
            "userId": "user-7",
            "amount": 100,
            "timestamp": "2024-06-01T14:00:00Z",
            "merchant": "Zomato"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["anomaly"], json!(false));
    assert_eq!(body["reasons"], json!([]));
}

#[tokio::test]
async fn test_ml_endpoint_loads_artifact_from_disk() {
    let file = tempfile::NamedTempFile::new().unwrap();
    serde_json::to_writer(
        file.as_file(),
        &OutlierModel::new(vec![-0.001, 0.0, 0.0, 0.0], 1.0, -1),
    )
    .unwrap();

    let mut config = AppConfig::default();
    config.detection.model_path = file.path().to_path_buf();
    let server = TestServer::new(ApiServer::new(config).router()).unwrap();

    let response = server
        .post("/anomaly/ml")
        .json(&json!({
            "userId": "user-7",
            "amount": 100,
            "timestamp": "2024-06-01T14:00:00Z",
            "merchant": "Zomato"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_demo_endpoint_returns_contract_shape() {
    let server = server_without_model();
    let response = server
        .post("/anomaly/demo")
        .json(&json!({ "userId": "user-7", "amount": 10, "merchant": "Zomato" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert!(body["anomaly"].is_boolean());
    let score = body["score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&score));
    assert!(body["reasons"].is_array());
}
