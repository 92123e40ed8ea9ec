//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Debug, FromRow)]
struct LinkRow {
    id: String,
    url: String,
    short_code: String,
    access_count: i64,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link::new(row.id, row.url, row.short_code, row.access_count)
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uses SQLx prepared statements with bound parameters. Short code uniqueness
/// is enforced by the `urls_short_code_key` constraint.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO urls (id, url, short_code, access_count)
            VALUES ($1, $2, $3, 0)
            RETURNING id, url, short_code, access_count
            "#,
        )
        .bind(&new_link.id)
        .bind(&new_link.url)
        .bind(&new_link.short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, url, short_code, access_count
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn increment_access_count(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE urls
            SET access_count = access_count + 1
            WHERE short_code = $1
            RETURNING id, url, short_code, access_count
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
