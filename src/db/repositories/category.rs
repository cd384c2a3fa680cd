//! Category repository
//!
//! Database operations for categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait for SQLite and MySQL
//!
//! Deleting a category detaches its posts (`category_id` becomes NULL).

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{mysql::MySqlRow, sqlite::SqliteRow, MySqlPool, Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use super::errors::CategoryError;
use super::storage_failure;
use crate::db::{Backend, DynDatabasePool};
use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, name: &str) -> Result<Category, CategoryError>;

    /// Get category by ID
    async fn get_by_id(&self, id: &str) -> Result<Category, CategoryError>;

    /// List all categories ordered by name
    async fn list(&self) -> Result<Vec<Category>, CategoryError>;

    /// Rename a category
    async fn update(&self, id: &str, name: &str) -> Result<Category, CategoryError>;

    /// Delete a category
    async fn delete(&self, id: &str) -> Result<(), CategoryError>;
}

/// SQLx-based category repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category, CategoryError> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => create_category_sqlite(pool, &category).await,
            Backend::Mysql(pool) => create_category_mysql(pool, &category).await,
        };

        result.map_err(|e| CategoryError::from(storage_failure("create_category", &e)))?;
        Ok(category)
    }

    async fn get_by_id(&self, id: &str) -> Result<Category, CategoryError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => get_category_by_id_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_category_by_id_mysql(pool, id).await,
        };

        result
            .map_err(|e| CategoryError::from(storage_failure("get_category", &e)))?
            .ok_or(CategoryError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Category>, CategoryError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => list_categories_sqlite(pool).await,
            Backend::Mysql(pool) => list_categories_mysql(pool).await,
        };

        result.map_err(|e| storage_failure("list_categories", &e).into())
    }

    async fn update(&self, id: &str, name: &str) -> Result<Category, CategoryError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => update_category_sqlite(pool, id, name).await,
            Backend::Mysql(pool) => update_category_mysql(pool, id, name).await,
        };

        result
            .map_err(|e| CategoryError::from(storage_failure("update_category", &e)))?
            .ok_or(CategoryError::NotFound)
    }

    async fn delete(&self, id: &str) -> Result<(), CategoryError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => delete_category_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_category_mysql(pool, id).await,
        };

        match result {
            Ok(0) => Err(CategoryError::NotFound),
            Ok(_) => Ok(()),
            Err(e) => Err(storage_failure("delete_category", &e).into()),
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

async fn get_category_by_id_sqlite(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_category_sqlite).transpose()
}

async fn list_categories_sqlite(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_category_sqlite).collect()
}

async fn update_category_sqlite(
    pool: &SqlitePool,
    id: &str,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let category = row.as_ref().map(row_to_category_sqlite).transpose()?;

    tx.commit().await?;
    Ok(category)
}

async fn delete_category_sqlite(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn row_to_category_sqlite(row: &SqliteRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO categories (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

async fn get_category_by_id_mysql(
    pool: &MySqlPool,
    id: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_category_mysql).transpose()
}

async fn list_categories_mysql(pool: &MySqlPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, name, created_at FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_category_mysql).collect()
}

async fn update_category_mysql(
    pool: &MySqlPool,
    id: &str,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Affected rows are zero for a no-op rename, so the row is read back instead
    sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query("SELECT id, name, created_at FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let category = row.as_ref().map(row_to_category_mysql).transpose()?;

    tx.commit().await?;
    Ok(category)
}

async fn delete_category_mysql(pool: &MySqlPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn row_to_category_mysql(row: &MySqlRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}
