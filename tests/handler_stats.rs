mod common;

use linkcrush::domain::repositories::LinkRepository;
use serde_json::json;

#[tokio::test]
async fn test_stats_success() {
    let (state, repository, _rx) = common::create_test_state();
    common::create_test_link(&repository, "abcd1234", "https://example.com").await;
    repository.increment_access_count("abcd1234").await.unwrap();
    repository.increment_access_count("abcd1234").await.unwrap();
    let server = common::test_server(state);

    let response = server.get("/shorten/abcd1234/stats").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["id"], "id-abcd1234");
    assert_eq!(json["url"], "https://example.com");
    assert_eq!(json["short_code"], "abcd1234");
    assert_eq!(json["access_count"], 2);
}

#[tokio::test]
async fn test_stats_not_found() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let response = server.get("/shorten/notfound/stats").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_stats_is_not_counted_as_access() {
    let (state, repository, mut rx) = common::create_test_state();
    common::create_test_link(&repository, "abcd1234", "https://example.com").await;
    let server = common::test_server(state);

    for _ in 0..3 {
        let json = server
            .get("/shorten/abcd1234/stats")
            .await
            .json::<serde_json::Value>();
        assert_eq!(json["access_count"], 0);
    }

    assert!(rx.try_recv().is_err());
    let link = repository.find_by_code("abcd1234").await.unwrap().unwrap();
    assert_eq!(link.access_count, 0);
}

#[tokio::test]
async fn test_new_link_starts_at_zero() {
    let (state, _repository, _rx) = common::create_test_state();
    let server = common::test_server(state);

    let created = server
        .post("/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await
        .json::<serde_json::Value>();
    let code = created["short_code"].as_str().unwrap();

    let json = server
        .get(&format!("/shorten/{code}/stats"))
        .await
        .json::<serde_json::Value>();

    assert_eq!(json["access_count"], 0);
    assert_eq!(json["id"], created["id"]);
}

#[tokio::test]
async fn test_stats_reflect_every_resolve() {
    let (state, repository, _worker) = common::create_test_state_with_worker();
    common::create_test_link(&repository, "abcd1234", "https://example.com").await;
    let server = common::test_server(state);

    for _ in 0..20 {
        server.get("/shorten/abcd1234").await.assert_status_ok();
    }

    assert_eq!(
        common::wait_for_access_count(&server, "abcd1234", 20).await,
        20
    );
}
