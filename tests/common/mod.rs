#![allow(dead_code)]

use axum::{Router, routing::get};
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use linkcrush::api::handlers::health_handler;
use linkcrush::api::routes::link_routes;
use linkcrush::application::access_worker::{self, WorkerSettings, run_access_worker};
use linkcrush::application::services::link_service::DEFAULT_MAX_CODE_ATTEMPTS;
use linkcrush::application::services::{LinkService, LinkStore, StoreSettings};
use linkcrush::domain::access_event::AccessEvent;
use linkcrush::domain::entities::{Link, NewLink};
use linkcrush::domain::repositories::LinkRepository;
use linkcrush::infrastructure::cache::MemoryCache;
use linkcrush::infrastructure::persistence::InMemoryLinkRepository;
use linkcrush::state::AppState;

/// Application state over the in-memory repository and in-process cache,
/// without an access worker. The receiver collects scheduled increments.
pub fn create_test_state() -> (
    AppState,
    Arc<InMemoryLinkRepository>,
    mpsc::Receiver<AccessEvent>,
) {
    let repository = Arc::new(InMemoryLinkRepository::new());
    let cache = Arc::new(MemoryCache::new(1_000, Duration::from_secs(3600)));
    let store = Arc::new(LinkStore::new(
        repository.clone(),
        cache,
        StoreSettings::default(),
    ));

    let (recorder, rx) = access_worker::channel(100);
    let service = Arc::new(LinkService::new(
        store.clone(),
        recorder.clone(),
        DEFAULT_MAX_CODE_ATTEMPTS,
    ));

    (AppState::new(service, store, recorder), repository, rx)
}

/// Same as [`create_test_state`] with a running access worker.
pub fn create_test_state_with_worker() -> (AppState, Arc<InMemoryLinkRepository>, JoinHandle<()>) {
    let (state, repository, rx) = create_test_state();
    let worker = tokio::spawn(run_access_worker(
        rx,
        state.link_store.clone(),
        WorkerSettings::default(),
    ));
    (state, repository, worker)
}

/// Server exposing the link routes and the health check.
pub fn test_server(state: AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(link_routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

/// Inserts a link directly into the repository, bypassing the cache.
pub async fn create_test_link(repository: &InMemoryLinkRepository, code: &str, url: &str) -> Link {
    repository
        .create(NewLink {
            id: format!("id-{code}"),
            url: url.to_string(),
            short_code: code.to_string(),
        })
        .await
        .unwrap()
}

/// Polls the stats endpoint until the access count reaches `expected`.
///
/// Increments are applied in the background, so the count is only eventually
/// consistent with the resolve calls that produced it.
pub async fn wait_for_access_count(server: &TestServer, code: &str, expected: i64) -> i64 {
    let mut last = -1;
    for _ in 0..100 {
        let json = server
            .get(&format!("/shorten/{code}/stats"))
            .await
            .json::<serde_json::Value>();
        last = json["access_count"].as_i64().unwrap();
        if last == expected {
            return last;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    last
}
