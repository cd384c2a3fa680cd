//! Post repository
//!
//! Keeps the `posts` row, its category reference and its `post_tags`
//! associations consistent.
//!
//! This module provides:
//! - `PostRepository` trait defining the five post operations
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! Every operation runs in one transaction. Storage failures are logged and
//! classified at this boundary; callers only ever see the per-operation
//! error kinds from [`super::errors`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    mysql::MySqlRow, sqlite::SqliteRow, MySqlConnection, MySqlPool, Row, SqliteConnection,
    SqlitePool,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{
    CreatePostError, DeletePostError, GetPostError, ListPostsError, UpdatePostError,
};
use super::storage_failure;
use crate::db::{Backend, DynDatabasePool};
use crate::models::{CreatePostInput, Post, PostWithRelations, UpdatePostInput};
use crate::normalize::{normalize_title, slugify};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// List all posts in insertion order with category and tag names
    async fn list(&self) -> Result<Vec<PostWithRelations>, ListPostsError>;

    /// Get a post by ID
    async fn get_by_id(&self, id: &str) -> Result<PostWithRelations, GetPostError>;

    /// Create a post.
    ///
    /// Tags are associated only when no category is given.
    async fn create(&self, input: &CreatePostInput)
        -> Result<PostWithRelations, CreatePostError>;

    /// Update a post, replacing its tag set when `input.tag_ids` is present
    async fn update(
        &self,
        id: &str,
        input: &UpdatePostInput,
    ) -> Result<PostWithRelations, UpdatePostError>;

    /// Delete a post and its tag associations, returning the deleted ID
    async fn delete(&self, id: &str) -> Result<String, DeletePostError>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn list(&self) -> Result<Vec<PostWithRelations>, ListPostsError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => list_posts_sqlite(pool).await,
            Backend::Mysql(pool) => list_posts_mysql(pool).await,
        };

        result.map_err(|e| storage_failure("list_posts", &e).into())
    }

    async fn get_by_id(&self, id: &str) -> Result<PostWithRelations, GetPostError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => get_post_sqlite(pool, id).await,
            Backend::Mysql(pool) => get_post_mysql(pool, id).await,
        };

        match result {
            Ok(Some(post)) => Ok(post),
            Ok(None) => Err(GetPostError::NotFound),
            Err(e) => Err(storage_failure("get_post", &e).into()),
        }
    }

    async fn create(
        &self,
        input: &CreatePostInput,
    ) -> Result<PostWithRelations, CreatePostError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => create_post_sqlite(pool, input).await,
            Backend::Mysql(pool) => create_post_mysql(pool, input).await,
        };

        let post = result.map_err(|e| CreatePostError::from(storage_failure("create_post", &e)))?;
        tracing::debug!(id = %post.post.id, slug = %post.post.slug, "Created post");
        Ok(post)
    }

    async fn update(
        &self,
        id: &str,
        input: &UpdatePostInput,
    ) -> Result<PostWithRelations, UpdatePostError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => update_post_sqlite(pool, id, input).await,
            Backend::Mysql(pool) => update_post_mysql(pool, id, input).await,
        };

        match result {
            Ok(Some(post)) => {
                tracing::debug!(id = %id, "Updated post");
                Ok(post)
            }
            Ok(None) => {
                tracing::warn!(id = %id, "Update targeted a post that does not exist");
                Err(UpdatePostError::CannotUpdate)
            }
            Err(e) => Err(storage_failure("update_post", &e).into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<String, DeletePostError> {
        let result = match self.pool.backend() {
            Backend::Sqlite(pool) => delete_post_sqlite(pool, id).await,
            Backend::Mysql(pool) => delete_post_mysql(pool, id).await,
        };

        match result {
            Ok(true) => {
                tracing::debug!(id = %id, "Deleted post");
                Ok(id.to_string())
            }
            Ok(false) => Err(DeletePostError::NotFound),
            Err(e) => Err(storage_failure("delete_post", &e).into()),
        }
    }
}

// ============================================================================
// Shared statements
// ============================================================================

const INSERT_POST: &str = r#"
    INSERT INTO posts (id, title, normalized_title, slug, content, published, category_id, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_POST: &str = r#"
    UPDATE posts
    SET title = ?, normalized_title = ?, slug = ?, content = ?, category_id = ?, published = ?, updated_at = ?
    WHERE id = ?
"#;

const SELECT_POST_BY_ID: &str = r#"
    SELECT p.id, p.title, p.slug, p.content, p.published, p.category_id,
           p.created_at, p.updated_at, c.name AS category_name
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
    WHERE p.id = ?
"#;

const POST_EXISTS_FOR_UPDATE: &str = "SELECT id FROM posts WHERE id = ? FOR UPDATE";

const SELECT_CATEGORY_NAME: &str = "SELECT name FROM categories WHERE id = ?";

const SELECT_POST_TAG_NAMES: &str = r#"
    SELECT t.name
    FROM tags t
    INNER JOIN post_tags pt ON pt.tag_id = t.id
    WHERE pt.post_id = ?
    ORDER BY t.name
"#;

const SELECT_ALL_TAG_NAMES: &str = r#"
    SELECT pt.post_id, t.name
    FROM post_tags pt
    INNER JOIN tags t ON t.id = pt.tag_id
    ORDER BY t.name
"#;

/// Associates a tag only when it exists, so unknown ids insert nothing.
const INSERT_POST_TAG: &str = r#"
    INSERT INTO post_tags (post_id, tag_id)
    SELECT ?, id FROM tags WHERE id = ?
"#;

const DELETE_POST_TAGS: &str = "DELETE FROM post_tags WHERE post_id = ?";

const DELETE_POST: &str = "DELETE FROM posts WHERE id = ?";

/// Tag ids in first-seen order with duplicates removed
fn unique_ids(ids: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Build the row for a post about to be inserted
fn new_post(input: &CreatePostInput) -> Post {
    let now = Utc::now();
    Post {
        id: Uuid::new_v4().to_string(),
        title: input.title.clone(),
        slug: slugify(&input.title),
        content: input.content.clone(),
        published: input.published.unwrap_or(false),
        category_id: input.category_id.clone(),
        created_at: now,
        updated_at: now,
    }
}

fn group_tag_names(pairs: Vec<(String, String)>) -> HashMap<String, Vec<String>> {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (post_id, name) in pairs {
        grouped.entry(post_id).or_default().push(name);
    }
    grouped
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn list_posts_sqlite(pool: &SqlitePool) -> Result<Vec<PostWithRelations>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        r#"
        SELECT p.id, p.title, p.slug, p.content, p.published, p.category_id,
               p.created_at, p.updated_at, c.name AS category_name
        FROM posts p
        LEFT JOIN categories c ON c.id = p.category_id
        ORDER BY p.rowid
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let tag_rows = sqlx::query(SELECT_ALL_TAG_NAMES)
        .fetch_all(&mut *tx)
        .await?;
    tx.commit().await?;

    let mut pairs = Vec::with_capacity(tag_rows.len());
    for row in &tag_rows {
        pairs.push((row.try_get("post_id")?, row.try_get("name")?));
    }
    let mut tags = group_tag_names(pairs);

    let mut posts = Vec::with_capacity(rows.len());
    for row in &rows {
        let post = row_to_post_sqlite(row)?;
        let category = row.try_get("category_name")?;
        let post_tags = tags.remove(&post.id).unwrap_or_default();
        posts.push(PostWithRelations::new(post, category, post_tags));
    }

    Ok(posts)
}

async fn get_post_sqlite(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let post = fetch_post_sqlite(&mut tx, id).await?;
    tx.commit().await?;
    Ok(post)
}

async fn create_post_sqlite(
    pool: &SqlitePool,
    input: &CreatePostInput,
) -> Result<PostWithRelations, sqlx::Error> {
    let post = new_post(input);
    let mut tx = pool.begin().await?;

    sqlx::query(INSERT_POST)
        .bind(&post.id)
        .bind(&post.title)
        .bind(normalize_title(&post.title))
        .bind(&post.slug)
        .bind(&post.content)
        .bind(post.published)
        .bind(&post.category_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

    let (category, tags) = match &post.category_id {
        Some(category_id) => (category_name_sqlite(&mut tx, category_id).await?, Vec::new()),
        None => {
            insert_post_tags_sqlite(&mut tx, &post.id, &input.tag_ids).await?;
            (None, post_tag_names_sqlite(&mut tx, &post.id).await?)
        }
    };

    tx.commit().await?;
    Ok(PostWithRelations::new(post, category, tags))
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: &str,
    input: &UpdatePostInput,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // The write comes first so the transaction takes the write lock through
    // the busy handler instead of upgrading a read lock. SQLite counts
    // matched rows, so zero means the post is missing.
    let result = sqlx::query(UPDATE_POST)
        .bind(&input.title)
        .bind(normalize_title(&input.title))
        .bind(slugify(&input.title))
        .bind(&input.content)
        .bind(&input.category_id)
        .bind(input.published)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    if let Some(tag_ids) = &input.tag_ids {
        sqlx::query(DELETE_POST_TAGS)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_post_tags_sqlite(&mut tx, id, tag_ids).await?;
    }

    let post = fetch_post_sqlite(&mut tx, id).await?;
    tx.commit().await?;
    Ok(post)
}

async fn delete_post_sqlite(pool: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(DELETE_POST_TAGS)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query(DELETE_POST).bind(id).execute(&mut *tx).await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}

async fn fetch_post_sqlite(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let row = sqlx::query(SELECT_POST_BY_ID)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let post = row_to_post_sqlite(&row)?;
    let category = row.try_get("category_name")?;
    let tags = post_tag_names_sqlite(conn, id).await?;

    Ok(Some(PostWithRelations::new(post, category, tags)))
}

async fn category_name_sqlite(
    conn: &mut SqliteConnection,
    category_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query(SELECT_CATEGORY_NAME)
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| row.try_get("name")).transpose()
}

async fn post_tag_names_sqlite(
    conn: &mut SqliteConnection,
    post_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(SELECT_POST_TAG_NAMES)
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(|row| row.try_get("name")).collect()
}

async fn insert_post_tags_sqlite(
    conn: &mut SqliteConnection,
    post_id: &str,
    tag_ids: &[String],
) -> Result<(), sqlx::Error> {
    for tag_id in unique_ids(tag_ids) {
        sqlx::query(INSERT_POST_TAG)
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn row_to_post_sqlite(row: &SqliteRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        published: row.try_get("published")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn list_posts_mysql(pool: &MySqlPool) -> Result<Vec<PostWithRelations>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        r#"
        SELECT p.id, p.title, p.slug, p.content, p.published, p.category_id,
               p.created_at, p.updated_at, c.name AS category_name
        FROM posts p
        LEFT JOIN categories c ON c.id = p.category_id
        ORDER BY p.created_at, p.id
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let tag_rows = sqlx::query(SELECT_ALL_TAG_NAMES)
        .fetch_all(&mut *tx)
        .await?;
    tx.commit().await?;

    let mut pairs = Vec::with_capacity(tag_rows.len());
    for row in &tag_rows {
        pairs.push((row.try_get("post_id")?, row.try_get("name")?));
    }
    let mut tags = group_tag_names(pairs);

    let mut posts = Vec::with_capacity(rows.len());
    for row in &rows {
        let post = row_to_post_mysql(row)?;
        let category = row.try_get("category_name")?;
        let post_tags = tags.remove(&post.id).unwrap_or_default();
        posts.push(PostWithRelations::new(post, category, post_tags));
    }

    Ok(posts)
}

async fn get_post_mysql(
    pool: &MySqlPool,
    id: &str,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let post = fetch_post_mysql(&mut tx, id).await?;
    tx.commit().await?;
    Ok(post)
}

async fn create_post_mysql(
    pool: &MySqlPool,
    input: &CreatePostInput,
) -> Result<PostWithRelations, sqlx::Error> {
    let post = new_post(input);
    let mut tx = pool.begin().await?;

    sqlx::query(INSERT_POST)
        .bind(&post.id)
        .bind(&post.title)
        .bind(normalize_title(&post.title))
        .bind(&post.slug)
        .bind(&post.content)
        .bind(post.published)
        .bind(&post.category_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&mut *tx)
        .await?;

    let (category, tags) = match &post.category_id {
        Some(category_id) => (category_name_mysql(&mut tx, category_id).await?, Vec::new()),
        None => {
            insert_post_tags_mysql(&mut tx, &post.id, &input.tag_ids).await?;
            (None, post_tag_names_mysql(&mut tx, &post.id).await?)
        }
    };

    tx.commit().await?;
    Ok(PostWithRelations::new(post, category, tags))
}

async fn update_post_mysql(
    pool: &MySqlPool,
    id: &str,
    input: &UpdatePostInput,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // MySQL reports zero affected rows for an UPDATE that changes nothing,
    // so existence is checked up front.
    let exists = sqlx::query(POST_EXISTS_FOR_UPDATE)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .is_some();
    if !exists {
        return Ok(None);
    }

    sqlx::query(UPDATE_POST)
        .bind(&input.title)
        .bind(normalize_title(&input.title))
        .bind(slugify(&input.title))
        .bind(&input.content)
        .bind(&input.category_id)
        .bind(input.published)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if let Some(tag_ids) = &input.tag_ids {
        sqlx::query(DELETE_POST_TAGS)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_post_tags_mysql(&mut tx, id, tag_ids).await?;
    }

    let post = fetch_post_mysql(&mut tx, id).await?;
    tx.commit().await?;
    Ok(post)
}

async fn delete_post_mysql(pool: &MySqlPool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(DELETE_POST_TAGS)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query(DELETE_POST).bind(id).execute(&mut *tx).await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}

async fn fetch_post_mysql(
    conn: &mut MySqlConnection,
    id: &str,
) -> Result<Option<PostWithRelations>, sqlx::Error> {
    let row = sqlx::query(SELECT_POST_BY_ID)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let post = row_to_post_mysql(&row)?;
    let category = row.try_get("category_name")?;
    let tags = post_tag_names_mysql(conn, id).await?;

    Ok(Some(PostWithRelations::new(post, category, tags)))
}

async fn category_name_mysql(
    conn: &mut MySqlConnection,
    category_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query(SELECT_CATEGORY_NAME)
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| row.try_get("name")).transpose()
}

async fn post_tag_names_mysql(
    conn: &mut MySqlConnection,
    post_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(SELECT_POST_TAG_NAMES)
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter().map(|row| row.try_get("name")).collect()
}

async fn insert_post_tags_mysql(
    conn: &mut MySqlConnection,
    post_id: &str,
    tag_ids: &[String],
) -> Result<(), sqlx::Error> {
    for tag_id in unique_ids(tag_ids) {
        sqlx::query(INSERT_POST_TAG)
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

fn row_to_post_mysql(row: &MySqlRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        published: row.try_get("published")?,
        category_id: row.try_get("category_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
