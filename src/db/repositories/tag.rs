//! Tag repository
//!
//! Database operations for tags.
//!
//! This module provides:
//! - `TagRepository` trait defining the interface for tag data access
//! - `SqlxTagRepository` implementing the trait for SQLite and MySQL
//!
//! Post associations live in `post_tags` and are owned by the post
//! repository; deleting a tag removes its association rows.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{mysql::MySqlRow, sqlite::SqliteRow, MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use super::errors::TagError;
use super::storage_failure;
use crate::db::{Backend, DynDatabasePool};
use crate::models::Tag;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Create a new tag
    async fn create(&self, name: &str) -> Result<Tag, TagError>;

    /// Get tag by ID
    async fn get_by_id(&self, id: &str) -> Result<Tag, TagError>;

    /// List all tags ordered by name
    async fn list(&self) -> Result<Vec<Tag>, TagError>;

    /// Rename a tag
    async fn update(&self, id: &str, name: &str) -> Result<Tag, TagError>;

    /// Delete a tag and its post associations
    async fn delete(&self, id: &str) -> Result<(), TagError>;
}

/// SQLx-based tag repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxTagRepository {
    pool: DynDatabasePool,
}

impl SqlxTagRepository {
    /// Create a new SQLx tag repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, name: &str) -> Result<Tag, TagError> {
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => create_tag_sqlite(pool, &tag).await,
            Backend::Mysql(pool) => create_tag_mysql(pool, &tag).await,
        };

        result.map_err(|e| TagError::from(storage_failure("create_tag", &e)))?;
        Ok(tag)
    }

    async fn get_by_id(&self, id: &str) -> Result<Tag, TagError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => get_tag_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_tag_by_id_mysql(pool, id).await,
        };

        result
            .map_err(|e| TagError::from(storage_failure("get_tag", &e)))?
            .ok_or(TagError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Tag>, TagError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => list_tags_sqlite(pool).await,
            Backend::Mysql(pool) => list_tags_mysql(pool).await,
        };

        result.map_err(|e| storage_failure("list_tags", &e).into())
    }

    async fn update(&self, id: &str, name: &str) -> Result<Tag, TagError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => update_tag_sqlite(pool, id, name).await,
            Backend::Mysql(pool) => update_tag_mysql(pool, id, name).await,
        };

        result
            .map_err(|e| TagError::from(storage_failure("update_tag", &e)))?
            .ok_or(TagError::NotFound)
    }

    async fn delete(&self, id: &str) -> Result<(), TagError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => delete_tag_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_tag_mysql(pool, id).await,
        };

        match result {
            Ok(0) => Err(TagError::NotFound),
            Ok(_) => Ok(()),
            Err(e) => Err(storage_failure("delete_tag", &e).into()),
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tag_sqlite(pool: &SqlitePool, tag: &Tag) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(tag.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

async fn get_tag_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Tag>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_tag_sqlite).transpose()
}

async fn list_tags_sqlite(pool: &SqlitePool) -> Result<Vec<Tag>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, name, created_at FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_tag_sqlite).collect()
}

async fn update_tag_sqlite(
    pool: &SqlitePool,
    id: &str,
    name: &str,
) -> Result<Option<Tag>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let tag = row.as_ref().map(row_to_tag_sqlite).transpose()?;

    tx.commit().await?;
    Ok(tag)
}

async fn delete_tag_sqlite(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    // post_tags rows are removed by ON DELETE CASCADE
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn row_to_tag_sqlite(row: &SqliteRow) -> Result<Tag, sqlx::Error> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_tag_mysql(pool: &MySqlPool, tag: &Tag) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&tag.id)
        .bind(&tag.name)
        .bind(tag.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

async fn get_tag_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Tag>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_tag_mysql).transpose()
}

async fn list_tags_mysql(pool: &MySqlPool) -> Result<Vec<Tag>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, name, created_at FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_tag_mysql).collect()
}

async fn update_tag_mysql(
    pool: &MySqlPool,
    id: &str,
    name: &str,
) -> Result<Option<Tag>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE tags SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let tag = row.as_ref().map(row_to_tag_mysql).transpose()?;

    tx.commit().await?;
    Ok(tag)
}

async fn delete_tag_mysql(pool: &MySqlPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn row_to_tag_mysql(row: &MySqlRow) -> Result<Tag, sqlx::Error> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{PostRepository, SqlxPostRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreatePostInput;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxTagRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxTagRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_tag() {
        let (_pool, repo) = setup_test_repo().await;

        let tag = repo.create("rust").await.expect("Failed to create tag");

        assert_eq!(tag.name, "rust");
        assert_eq!(repo.get_by_id(&tag.id).await.unwrap(), tag);
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create("rust").await.unwrap();
        assert_eq!(repo.create("rust").await.unwrap_err(), TagError::DuplicateName);
    }

    #[tokio::test]
    async fn test_get_tag_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        assert_eq!(repo.get_by_id("missing").await.unwrap_err(), TagError::NotFound);
    }

    #[tokio::test]
    async fn test_list_tags_ordered_by_name() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create("web").await.unwrap();
        repo.create("async").await.unwrap();
        repo.create("rust").await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["async", "rust", "web"]);
    }

    #[tokio::test]
    async fn test_update_tag() {
        let (_pool, repo) = setup_test_repo().await;

        let tag = repo.create("rsut").await.unwrap();
        let updated = repo.update(&tag.id, "rust").await.unwrap();
        assert_eq!(updated.name, "rust");

        assert_eq!(
            repo.update("missing", "x").await.unwrap_err(),
            TagError::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_tag_detaches_posts() {
        let (pool, repo) = setup_test_repo().await;
        let posts = SqlxPostRepository::new(pool.clone());

        let tag = repo.create("rust").await.unwrap();
        let post = posts
            .create(&CreatePostInput::new("Tagged", "body").with_tags([tag.id.clone()]))
            .await
            .unwrap();
        assert_eq!(post.tags, vec!["rust"]);

        repo.delete(&tag.id).await.unwrap();

        let fetched = posts.get_by_id(&post.post.id).await.unwrap();
        assert!(fetched.tags.is_empty());
        assert_eq!(repo.delete(&tag.id).await.unwrap_err(), TagError::NotFound);
    }
}
