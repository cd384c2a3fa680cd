//! Category API endpoints
//!
//! Handles HTTP requests for category management:
//! - GET /api/v1/categories - List categories
//! - POST /api/v1/categories - Create a category
//! - GET /api/v1/categories/{id} - Get one category
//! - PUT /api/v1/categories/{id} - Rename a category
//! - DELETE /api/v1/categories/{id} - Delete a category

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::models::Category;

/// Request body for creating or renaming a category
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// Response for a single category
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Response for category list
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryResponse>,
}

/// Build the categories router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

fn validated_name(payload: Result<Json<CategoryRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(req) = payload?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation_error("Category name must not be empty"));
    }
    Ok(name.to_string())
}

/// GET /api/v1/categories - List categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state.category_repo.list().await?;

    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/categories - Create a category
async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let name = validated_name(payload)?;
    let category = state.category_repo.create(&name).await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// GET /api/v1/categories/{id} - Get one category
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = state.category_repo.get_by_id(&id).await?;
    Ok(Json(category.into()))
}

/// PUT /api/v1/categories/{id} - Rename a category
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryRequest>, JsonRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let name = validated_name(payload)?;
    let category = state.category_repo.update(&id, &name).await?;

    Ok(Json(category.into()))
}

/// DELETE /api/v1/categories/{id} - Delete a category
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.category_repo.delete(&id).await?;
    Ok(Json(serde_json::json!({ "id": id })))
}
