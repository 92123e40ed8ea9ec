//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the durable link store.
///
/// The repository is the source of truth for links. It must enforce short code
/// uniqueness itself (a unique index), independently of any pre-check done by
/// callers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with `access_count = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code (or id) already exists.
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if the code is confirmed absent
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup itself failed; this never means "absent".
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically increments the access counter of a link in the store
    /// (`access_count = access_count + 1`) and returns the updated row.
    ///
    /// Returns `Ok(None)` if no link has this code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn increment_access_count(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Verifies that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
