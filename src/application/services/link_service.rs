//! Link creation, resolution and statistics service.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::access_worker::AccessRecorder;
use crate::application::services::link_store::{CodePresence, LinkStore};
use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use crate::utils::code_generator::generate_code;
use crate::utils::url_validator::validate_url;

/// Default cap on candidate codes tried by the uniqueness check.
pub const DEFAULT_MAX_CODE_ATTEMPTS: usize = 10;

/// Number of inserts attempted when the store rejects a code that passed the
/// pre-check (a concurrent create took it first).
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Service behind the three public operations: create, resolve and stats.
///
/// Reads and writes go through the cache-aside [`LinkStore`]. Access counting
/// is handed to the background worker through an [`AccessRecorder`], so a
/// resolve never waits for the counter update.
pub struct LinkService {
    store: Arc<LinkStore>,
    recorder: AccessRecorder,
    max_code_attempts: usize,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(store: Arc<LinkStore>, recorder: AccessRecorder, max_code_attempts: usize) -> Self {
        Self {
            store,
            recorder,
            max_code_attempts: max_code_attempts.max(1),
        }
    }

    /// Creates a short link for `url`.
    ///
    /// The URL is stored exactly as submitted. The returned link always has
    /// `access_count == 0`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the URL does not have a valid shape (no I/O is done)
    /// - [`AppError::GenerationExhausted`] if no free code could be found
    /// - [`AppError::Internal`] / [`AppError::Unavailable`] if the store fails
    pub async fn create(&self, url: &str) -> Result<Link, AppError> {
        validate_url(url)?;

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let short_code = self.generate_unique_code(url).await?;
            let new_link = NewLink {
                id: Uuid::new_v4().to_string(),
                url: url.to_string(),
                short_code,
            };

            match self.store.put(new_link).await {
                Ok(link) => {
                    info!("Created short link {} -> {}", link.short_code, link.url);
                    return Ok(link);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(
                        "Short code taken concurrently (insert attempt {}/{})",
                        attempt, MAX_INSERT_ATTEMPTS
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::GenerationExhausted {
            attempts: MAX_INSERT_ATTEMPTS,
        })
    }

    /// Resolves a short code and schedules an access count increment.
    ///
    /// The returned record reflects the state at lookup time; the increment is
    /// applied later by the access worker.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown to both cache and store.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        let link = self.find(code).await?;
        self.recorder.record(&link.short_code);
        Ok(link)
    }

    /// Returns the full record for a short code, including its access count.
    ///
    /// Viewing statistics is not counted as an access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown to both cache and store.
    pub async fn stats(&self, code: &str) -> Result<Link, AppError> {
        self.find(code).await
    }

    async fn find(&self, code: &str) -> Result<Link, AppError> {
        self.store.get_by_code(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "short_code": code }))
        })
    }

    /// Generates a code that is, at check time, absent from both cache and store.
    ///
    /// Each attempt hashes the URL with a fresh salt. Gives up after
    /// `max_code_attempts` collisions.
    async fn generate_unique_code(&self, url: &str) -> Result<String, AppError> {
        for attempt in 1..=self.max_code_attempts {
            let code = generate_code(url);

            match self.store.check_code(&code).await? {
                CodePresence::Available => return Ok(code),
                CodePresence::Taken => {
                    debug!(
                        "Generated code {} already in use (attempt {}/{})",
                        code, attempt, self.max_code_attempts
                    );
                }
            }
        }

        warn!(
            "Gave up generating a unique code after {} attempts",
            self.max_code_attempts
        );
        Err(AppError::GenerationExhausted {
            attempts: self.max_code_attempts,
        })
    }
}
