//! DTO for link statistics.

use serde::Serialize;

use crate::domain::entities::Link;

/// Full link record including its access count.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub id: String,
    pub url: String,
    pub short_code: String,
    pub access_count: i64,
}

impl From<Link> for StatsResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url: link.url,
            short_code: link.short_code,
            access_count: link.access_count,
        }
    }
}
