//! DTOs for creating and resolving short links.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Request to shorten a URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten. Its shape is checked by the service; this only
    /// bounds the size.
    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,
}

/// Public view of a link, returned by create and resolve.
///
/// The access counter is deliberately absent; see
/// [`crate::api::dto::stats::StatsResponse`].
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: String,
    pub url: String,
    pub short_code: String,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url: link.url,
            short_code: link.short_code,
        }
    }
}
