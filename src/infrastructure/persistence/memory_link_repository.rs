//! In-memory implementation of link repository.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link repository backed by a `DashMap` keyed by short code.
///
/// Enforces the same short code uniqueness as the PostgreSQL schema. Data lives
/// only as long as the process, so this is meant for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, Link>,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        if self.links.iter().any(|entry| entry.id == new_link.id) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "urls_pkey" }),
            ));
        }

        match self.links.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Short code already exists",
                json!({ "constraint": "urls_short_code_key" }),
            )),
            Entry::Vacant(slot) => {
                let link = new_link.into_link();
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get(code).map(|entry| entry.clone()))
    }

    async fn increment_access_count(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get_mut(code).map(|mut entry| {
            entry.access_count += 1;
            entry.clone()
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(id: &str, code: &str) -> NewLink {
        NewLink {
            id: id.to_string(),
            url: "https://example.com".to_string(),
            short_code: code.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryLinkRepository::new();
        let link = repo.create(new_link("id-1", "abcd1234")).await.unwrap();

        assert_eq!(link.access_count, 0);
        assert_eq!(repo.find_by_code("abcd1234").await.unwrap(), Some(link));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("id-1", "abcd1234")).await.unwrap();

        let result = repo.create(new_link("id-2", "abcd1234")).await;
        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("id-1", "abcd1234")).await.unwrap();

        let result = repo.create(new_link("id-1", "efgh5678")).await;
        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_increment_access_count() {
        let repo = InMemoryLinkRepository::new();
        repo.create(new_link("id-1", "abcd1234")).await.unwrap();

        repo.increment_access_count("abcd1234").await.unwrap();
        let updated = repo.increment_access_count("abcd1234").await.unwrap();

        assert_eq!(updated.unwrap().access_count, 2);
    }

    #[tokio::test]
    async fn test_increment_unknown_code() {
        let repo = InMemoryLinkRepository::new();
        assert!(repo.increment_access_count("missing").await.unwrap().is_none());
    }
}
