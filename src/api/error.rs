//! API error responses
//!
//! Every failure leaves a handler as an [`ApiError`], rendered as
//! `{"error": {"code": ..., "message": ...}}` with a matching status.
//! Repository error kinds keep their stable codes on the wire.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::repositories::{
    CategoryError, CreatePostError, DeletePostError, GetPostError, ListPostsError, TagError,
    UpdatePostError,
};

/// Error response for API errors
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation-error", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service-unavailable", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Malformed JSON bodies are reported in the same shape as other errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_error(rejection.body_text())
    }
}

impl From<ListPostsError> for ApiError {
    fn from(err: ListPostsError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.code(), err.to_string())
    }
}

impl From<GetPostError> for ApiError {
    fn from(err: GetPostError) -> Self {
        let status = match err {
            GetPostError::NotFound => StatusCode::NOT_FOUND,
            GetPostError::CannotGet | GetPostError::Unclassified => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<CreatePostError> for ApiError {
    fn from(err: CreatePostError) -> Self {
        let status = match err {
            CreatePostError::DuplicateTitle => StatusCode::CONFLICT,
            // The referenced category is part of the request body
            CreatePostError::CategoryNotFound => StatusCode::BAD_REQUEST,
            CreatePostError::CannotCreate | CreatePostError::Unclassified => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<UpdatePostError> for ApiError {
    fn from(err: UpdatePostError) -> Self {
        let status = match err {
            UpdatePostError::DuplicateTitle => StatusCode::CONFLICT,
            UpdatePostError::CategoryNotFound => StatusCode::BAD_REQUEST,
            UpdatePostError::CannotUpdate | UpdatePostError::Unclassified => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<DeletePostError> for ApiError {
    fn from(err: DeletePostError) -> Self {
        let status = match err {
            DeletePostError::NotFound => StatusCode::NOT_FOUND,
            DeletePostError::CannotDelete | DeletePostError::Unclassified => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        let status = match err {
            CategoryError::NotFound => StatusCode::NOT_FOUND,
            CategoryError::DuplicateName => StatusCode::CONFLICT,
            CategoryError::CannotAccess => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.code(), err.to_string())
    }
}

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        let status = match err {
            TagError::NotFound => StatusCode::NOT_FOUND,
            TagError::DuplicateName => StatusCode::CONFLICT,
            TagError::CannotAccess => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.code(), err.to_string())
    }
}
