mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "Backend: memory");
    assert_eq!(json["checks"]["access_queue"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["checks"].get("database").is_some());
    assert!(json["checks"].get("cache").is_some());
    assert!(json["checks"].get("access_queue").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_access_queue_closed() {
    let (state, _repository, rx) = common::create_test_state();
    drop(rx);
    let server = common::test_server(state);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["access_queue"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}
