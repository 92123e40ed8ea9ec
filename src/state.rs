//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::access_worker::AccessRecorder;
use crate::application::services::{LinkService, LinkStore};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Create, resolve and stats operations.
    pub link_service: Arc<LinkService>,
    /// Cache-aside store, used directly by the health check.
    pub link_store: Arc<LinkStore>,
    /// Producer side of the access counting queue.
    pub access_recorder: AccessRecorder,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        link_store: Arc<LinkStore>,
        access_recorder: AccessRecorder,
    ) -> Self {
        Self {
            link_service,
            link_store,
            access_recorder,
        }
    }
}
