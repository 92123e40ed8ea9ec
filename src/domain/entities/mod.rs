//! Core domain entities.
//!
//! - [`Link`] - A shortened URL with its access counter
//! - [`NewLink`] - Input for creating a link

pub mod link;

pub use link::{Link, NewLink};
