//! Post API endpoints
//!
//! Handles HTTP requests for posts:
//! - GET /api/v1/posts - List posts
//! - GET /api/v1/posts/{id} - Get one post
//! - POST /api/v1/posts - Create a post
//! - PUT /api/v1/posts/{id} - Update a post (omitted fields keep their values)
//! - DELETE /api/v1/posts/{id} - Delete a post

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::api::{ApiError, AppState};
use crate::models::{CreatePostInput, PostWithRelations, UpdatePostInput};

/// Request body for creating a post
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category_id: Option<String>,
    pub published: Option<bool>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

/// Request body for updating a post
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    /// Absent keeps the category, `null` clears it
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<String>>,
    pub published: Option<bool>,
    pub tag_ids: Option<Vec<String>>,
}

/// Distinguish an absent field from an explicit `null`
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Response for a single post
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub published: bool,
    pub category_id: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostWithRelations> for PostResponse {
    fn from(view: PostWithRelations) -> Self {
        Self {
            id: view.post.id,
            title: view.post.title,
            slug: view.post.slug,
            content: view.post.content,
            published: view.post.published,
            category_id: view.post.category_id,
            category: view.category,
            tags: view.tags,
            created_at: view.post.created_at.to_rfc3339(),
            updated_at: view.post.updated_at.to_rfc3339(),
        }
    }
}

/// Response for post list
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
}

/// Response for a deletion
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
}

/// Build the posts router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        tracing::warn!(field, "Rejected post request with blank field");
        return Err(ApiError::validation_error(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// GET /api/v1/posts - List posts
async fn list_posts(State(state): State<AppState>) -> Result<Json<PostListResponse>, ApiError> {
    let posts = state.post_repo.list().await?;

    Ok(Json(PostListResponse {
        posts: posts.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/posts/{id} - Get one post
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_repo.get_by_id(&id).await?;
    Ok(Json(post.into()))
}

/// POST /api/v1/posts - Create a post
async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let Json(req) = payload?;
    require_text("title", &req.title)?;
    require_text("content", &req.content)?;

    let input = CreatePostInput {
        title: req.title,
        content: req.content,
        category_id: req.category_id,
        published: req.published,
        tag_ids: req.tag_ids,
    };
    let post = state.post_repo.create(&input).await?;

    tracing::info!(id = %post.post.id, "Post created");
    Ok((StatusCode::CREATED, Json(post.into())))
}

/// PUT /api/v1/posts/{id} - Update a post
///
/// The post is fetched first so a missing id is a 404 and omitted fields can
/// be filled from the stored values.
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<Json<PostResponse>, ApiError> {
    let Json(req) = payload?;
    if let Some(title) = &req.title {
        require_text("title", title)?;
    }
    if let Some(content) = &req.content {
        require_text("content", content)?;
    }

    let current = state.post_repo.get_by_id(&id).await?.post;
    let input = UpdatePostInput {
        title: req.title.unwrap_or(current.title),
        content: req.content.unwrap_or(current.content),
        category_id: req.category_id.unwrap_or(current.category_id),
        published: req.published.unwrap_or(current.published),
        tag_ids: req.tag_ids,
    };
    let post = state.post_repo.update(&id, &input).await?;

    tracing::info!(id = %id, "Post updated");
    Ok(Json(post.into()))
}

/// DELETE /api/v1/posts/{id} - Delete a post
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = state.post_repo.delete(&id).await?;

    tracing::info!(id = %id, "Post deleted");
    Ok(Json(DeletedResponse { id }))
}
