//! Link entity representing a shortened URL and its access counter.

use serde::{Deserialize, Serialize};

/// A shortened URL with its access counter.
///
/// `id`, `url` and `short_code` never change after creation. `access_count`
/// only ever grows, one step per resolution of the short code.
///
/// The serde representation is also the cache entry format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub url: String,
    pub short_code: String,
    pub access_count: i64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(id: String, url: String, short_code: String, access_count: i64) -> Self {
        Self {
            id,
            url,
            short_code,
            access_count,
        }
    }
}

/// Input data for creating a new link.
///
/// The access counter always starts at zero, so it is not part of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub id: String,
    pub url: String,
    pub short_code: String,
}

impl NewLink {
    /// Builds the record as it exists right after insertion.
    pub fn into_link(self) -> Link {
        Link::new(self.id, self.url, self.short_code, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let link = Link::new(
            "4f1c".to_string(),
            "example.com/page".to_string(),
            "abcd1234".to_string(),
            3,
        );

        assert_eq!(link.id, "4f1c");
        assert_eq!(link.url, "example.com/page");
        assert_eq!(link.short_code, "abcd1234");
        assert_eq!(link.access_count, 3);
    }

    #[test]
    fn test_new_link_starts_at_zero() {
        let new_link = NewLink {
            id: "id-1".to_string(),
            url: "https://rust-lang.org".to_string(),
            short_code: "xyz78901".to_string(),
        };

        let link = new_link.into_link();
        assert_eq!(link.access_count, 0);
        assert_eq!(link.short_code, "xyz78901");
    }

    #[test]
    fn test_cache_representation_field_names() {
        let link = Link::new(
            "id-1".to_string(),
            "example.com".to_string(),
            "abcd1234".to_string(),
            7,
        );

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["id"], "id-1");
        assert_eq!(value["url"], "example.com");
        assert_eq!(value["short_code"], "abcd1234");
        assert_eq!(value["access_count"], 7);
    }
}
