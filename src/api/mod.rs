//! API layer - HTTP handlers and routing
//!
//! Thin JSON adapter over the repositories:
//! - Post API endpoints
//! - Category API endpoints
//! - Tag API endpoints
//! - Health check

pub mod categories;
pub mod error;
pub mod posts;
pub mod tags;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::repositories::{
    CategoryRepository, PostRepository, SqlxCategoryRepository, SqlxPostRepository,
    SqlxTagRepository, TagRepository,
};
use crate::db::DynDatabasePool;

pub use error::{ApiError, ApiErrorDetail};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub post_repo: Arc<dyn PostRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub tag_repo: Arc<dyn TagRepository>,
}

impl AppState {
    /// Build the state with SQLx repositories over one shared pool
    pub fn new(pool: DynDatabasePool) -> Self {
        Self {
            post_repo: SqlxPostRepository::boxed(pool.clone()),
            category_repo: SqlxCategoryRepository::boxed(pool.clone()),
            tag_repo: SqlxTagRepository::boxed(pool.clone()),
            pool,
        }
    }
}

/// Build the main API router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/posts", posts::router())
        .nest("/categories", categories::router())
        .nest("/tags", tags::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .nest("/api/v1", build_api_router())
        .route("/health", get(health))
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        return cors.allow_origin(Any);
    }

    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            tracing::warn!(origin, "Invalid CORS origin, cross-origin requests disabled");
            cors
        }
    }
}

/// GET /health - Storage gateway liveness
async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.pool.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {:#}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(Json(json!({ "status": "ok" })))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::db::{create_test_pool, migrations};

    /// Router over a fresh, migrated in-memory database
    pub async fn test_app() -> (DynDatabasePool, Router) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let app = build_router(AppState::new(pool.clone()), "*");
        (pool, app)
    }

    /// Send one request and decode the JSON response body
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = app.clone().oneshot(request).await.expect("Request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body is not JSON")
        };

        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{send, test_app};
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let (_pool, app) = test_app().await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_health_reports_closed_pool() {
        let (pool, app) = test_app().await;
        pool.close().await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "service-unavailable");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (_pool, app) = test_app().await;

        let (status, _) = send(&app, Method::GET, "/api/v1/nothing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cors_layer_accepts_any_origin_value() {
        // Neither a wildcard nor an unparsable origin may panic
        let _ = cors_layer("*");
        let _ = cors_layer("http://localhost:3000");
        let _ = cors_layer("bad\norigin");
    }
}
