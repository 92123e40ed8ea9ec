//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls, validation, and background work.
//!
//! - [`services::LinkStore`] - Cache-aside reads and writes
//! - [`services::LinkService`] - Create, resolve and stats operations
//! - [`access_worker`] - Detached access counting

pub mod access_worker;
pub mod services;
