//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity and reports
//! failures as the closed error kinds in [`errors`].

pub mod category;
pub mod errors;
pub mod post;
pub mod tag;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use errors::{
    CategoryError, CreatePostError, DeletePostError, GetPostError, ListPostsError, TagError,
    UpdatePostError,
};
pub use post::{PostRepository, SqlxPostRepository};
pub use tag::{SqlxTagRepository, TagRepository};

use crate::db::{classify, Failure};

/// Log a storage error with the operation that hit it, then classify it.
///
/// Raw `sqlx` errors stop here; only the returned [`Failure`] travels on.
pub(crate) fn storage_failure(operation: &'static str, err: &sqlx::Error) -> Failure {
    let failure = classify(err);
    tracing::error!(operation, error = %err, failure = ?failure, "Storage operation failed");
    failure
}
