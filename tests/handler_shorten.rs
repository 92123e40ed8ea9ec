mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_shorten_url_success() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com/page" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["url"], "https://example.com/page");
    assert!(json["id"].is_string());

    let code = json["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 8);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(json.get("access_count").is_none());
}

#[tokio::test]
async fn test_shorten_stores_url_as_submitted() {
    let (state, repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "example.com/Some/Path?q=1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["url"], "example.com/Some/Path?q=1");
    assert_eq!(repository.len(), 1);
}

#[tokio::test]
async fn test_shorten_same_url_twice_creates_two_links() {
    let (state, repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let first = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json::<serde_json::Value>();
    let second = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json::<serde_json::Value>();

    assert_ne!(first["id"], second["id"]);
    assert_ne!(first["short_code"], second["short_code"]);
    assert_eq!(repository.len(), 2);
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let (state, repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "url": "not a url" }))
        .await;

    response.assert_status_bad_request();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_shorten_empty_url() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.post("/shorten").json(&json!({ "url": "" })).await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_url_too_long() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let long_url = format!("https://example.com/{}", "a".repeat(2100));
    let response = server.post("/shorten").json(&json!({ "url": long_url })).await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_shorten_missing_field() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server
        .post("/shorten")
        .json(&json!({ "link": "https://example.com" }))
        .await;

    response.assert_status_bad_request();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_malformed_body() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.post("/shorten").text("{not json").await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_shorten_does_not_schedule_access() {
    let (state, _repository, mut rx) = common::create_test_state();
    let server = common::test_server(state);

    server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .assert_status(StatusCode::CREATED);

    assert!(rx.try_recv().is_err());
}
