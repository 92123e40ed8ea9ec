//! Utility functions for code generation and input validation.
//!
//! - [`code_generator`] - Hash-based short code generation
//! - [`url_validator`] - Permissive URL shape check
//! - [`db_error`] - sqlx error classification

pub mod code_generator;
pub mod db_error;
pub mod url_validator;
