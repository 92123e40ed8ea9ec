//! Domain layer containing business entities and repository contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access_event`] - Access counting event model
//!
//! The domain layer has no dependencies on infrastructure or presentation layers.
//!
//! # Access Counting Flow
//!
//! 1. A resolve request finds the link (cache or store)
//! 2. An [`access_event::AccessEvent`] is queued without blocking the response
//! 3. [`crate::application::access_worker::run_access_worker`] applies the increment
//! 4. The refreshed record is written back to the cache

pub mod access_event;
pub mod entities;
pub mod repositories;
