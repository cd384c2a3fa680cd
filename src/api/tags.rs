//! Tag API endpoints
//!
//! Handles HTTP requests for tags:
//! - GET /api/v1/tags - List tags
//! - POST /api/v1/tags - Create a tag
//! - GET /api/v1/tags/{id} - Get one tag
//! - PUT /api/v1/tags/{id} - Rename a tag
//! - DELETE /api/v1/tags/{id} - Delete a tag and its post associations

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::models::Tag;

/// Request body for creating or renaming a tag
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub name: String,
}

/// Response for a single tag
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            created_at: tag.created_at.to_rfc3339(),
        }
    }
}

/// Response for tag list
#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<TagResponse>,
}

/// Build the tags router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

fn validated_name(payload: Result<Json<TagRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(req) = payload?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation_error("Tag name must not be empty"));
    }
    Ok(name.to_string())
}

/// GET /api/v1/tags - List tags
async fn list_tags(State(state): State<AppState>) -> Result<Json<TagListResponse>, ApiError> {
    let tags = state.tag_repo.list().await?;

    Ok(Json(TagListResponse {
        tags: tags.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/v1/tags - Create a tag
async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<TagRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    let name = validated_name(payload)?;
    let tag = state.tag_repo.create(&name).await?;

    Ok((StatusCode::CREATED, Json(tag.into())))
}

/// GET /api/v1/tags/{id} - Get one tag
async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TagResponse>, ApiError> {
    let tag = state.tag_repo.get_by_id(&id).await?;
    Ok(Json(tag.into()))
}

/// PUT /api/v1/tags/{id} - Rename a tag
async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TagRequest>, JsonRejection>,
) -> Result<Json<TagResponse>, ApiError> {
    let name = validated_name(payload)?;
    let tag = state.tag_repo.update(&id, &name).await?;

    Ok(Json(tag.into()))
}

/// DELETE /api/v1/tags/{id} - Delete a tag
async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.tag_repo.delete(&id).await?;
    Ok(Json(serde_json::json!({ "id": id })))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_tag_crud() {
        let (_pool, app) = test_app().await;

        for name in ["web", "async"] {
            let (status, _) =
                send(&app, Method::POST, "/api/v1/tags", Some(json!({ "name": name }))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, list) = send(&app, Method::GET, "/api/v1/tags", None).await;
        assert_eq!(status, StatusCode::OK);
        let tags = list["tags"].as_array().unwrap();
        assert_eq!(tags[0]["name"], "async");
        assert_eq!(tags[1]["name"], "web");

        let uri = format!("/api/v1/tags/{}", tags[0]["id"].as_str().unwrap());
        let (status, renamed) =
            send(&app, Method::PUT, &uri, Some(json!({ "name": "tokio" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "tokio");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, err) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"]["code"], "tag-not-found");
    }

    #[tokio::test]
    async fn test_tag_duplicate_name() {
        let (_pool, app) = test_app().await;

        send(&app, Method::POST, "/api/v1/tags", Some(json!({ "name": "rust" }))).await;
        let (status, err) =
            send(&app, Method::POST, "/api/v1/tags", Some(json!({ "name": "rust" }))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"]["code"], "duplicate-tag-name");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (_pool, app) = test_app().await;

        let (status, err) =
            send(&app, Method::POST, "/api/v1/tags", Some(json!({ "label": "x" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"]["code"], "validation-error");
    }
}
