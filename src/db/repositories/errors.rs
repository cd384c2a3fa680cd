//! Repository error kinds
//!
//! One closed set per post operation, plus one set each for categories and
//! tags. Every kind carries a stable string code for the request layer.
//! Raw `sqlx` errors never appear here: they are reduced to a
//! [`Failure`](crate::db::Failure) first and converted with `From`.

use thiserror::Error;

use crate::db::{Failure, StorageFault};

/// Code shared by every operation for failures with no engine code
pub const UNCLASSIFIED_FAILURE: &str = "unclassified-failure";

/// Errors from listing posts
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ListPostsError {
    #[error("Cannot list posts")]
    CannotList,
}

impl ListPostsError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CannotList => "cannot-list-posts",
        }
    }
}

impl From<Failure> for ListPostsError {
    fn from(_: Failure) -> Self {
        Self::CannotList
    }
}

/// Errors from fetching one post
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GetPostError {
    #[error("Post not found")]
    NotFound,
    #[error("Cannot get post")]
    CannotGet,
    #[error("Unclassified storage failure")]
    Unclassified,
}

impl GetPostError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "post-not-found",
            Self::CannotGet => "cannot-get-post",
            Self::Unclassified => UNCLASSIFIED_FAILURE,
        }
    }
}

impl From<Failure> for GetPostError {
    fn from(failure: Failure) -> Self {
        match failure {
            // An id the store refuses to compare is no different from a missing one
            Failure::Fault(StorageFault::InvalidInput) => Self::NotFound,
            Failure::Fault(_) | Failure::Unmapped(_) => Self::CannotGet,
            Failure::NoCode => Self::Unclassified,
        }
    }
}

/// Errors from creating a post
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CreatePostError {
    #[error("A post with this title already exists")]
    DuplicateTitle,
    #[error("Category not found")]
    CategoryNotFound,
    #[error("Cannot create post")]
    CannotCreate,
    #[error("Unclassified storage failure")]
    Unclassified,
}

impl CreatePostError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateTitle => "duplicate-post-title",
            Self::CategoryNotFound => "category-not-found",
            Self::CannotCreate => "cannot-create-post",
            Self::Unclassified => UNCLASSIFIED_FAILURE,
        }
    }
}

impl From<Failure> for CreatePostError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Fault(StorageFault::UniqueViolation) => Self::DuplicateTitle,
            Failure::Fault(StorageFault::ForeignKeyViolation)
            | Failure::Fault(StorageFault::InvalidInput) => Self::CategoryNotFound,
            Failure::Unmapped(_) => Self::CannotCreate,
            Failure::NoCode => Self::Unclassified,
        }
    }
}

/// Errors from updating a post
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePostError {
    #[error("A post with this title already exists")]
    DuplicateTitle,
    #[error("Category not found")]
    CategoryNotFound,
    #[error("Cannot update post")]
    CannotUpdate,
    #[error("Unclassified storage failure")]
    Unclassified,
}

impl UpdatePostError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateTitle => "duplicate-post-title",
            Self::CategoryNotFound => "category-not-found",
            Self::CannotUpdate => "cannot-update-post",
            Self::Unclassified => UNCLASSIFIED_FAILURE,
        }
    }
}

impl From<Failure> for UpdatePostError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Fault(StorageFault::UniqueViolation) => Self::DuplicateTitle,
            Failure::Fault(StorageFault::ForeignKeyViolation)
            | Failure::Fault(StorageFault::InvalidInput) => Self::CategoryNotFound,
            Failure::Unmapped(_) => Self::CannotUpdate,
            Failure::NoCode => Self::Unclassified,
        }
    }
}

/// Errors from deleting a post
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeletePostError {
    #[error("Post not found")]
    NotFound,
    #[error("Cannot delete post")]
    CannotDelete,
    #[error("Unclassified storage failure")]
    Unclassified,
}

impl DeletePostError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "post-not-found",
            Self::CannotDelete => "cannot-delete-post",
            Self::Unclassified => UNCLASSIFIED_FAILURE,
        }
    }
}

impl From<Failure> for DeletePostError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Fault(StorageFault::InvalidInput) => Self::NotFound,
            Failure::Fault(_) | Failure::Unmapped(_) => Self::CannotDelete,
            Failure::NoCode => Self::Unclassified,
        }
    }
}

/// Errors from category operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category not found")]
    NotFound,
    #[error("A category with this name already exists")]
    DuplicateName,
    #[error("Cannot access categories")]
    CannotAccess,
}

impl CategoryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "category-not-found",
            Self::DuplicateName => "duplicate-category-name",
            Self::CannotAccess => "cannot-access-categories",
        }
    }
}

impl From<Failure> for CategoryError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Fault(StorageFault::UniqueViolation) => Self::DuplicateName,
            _ => Self::CannotAccess,
        }
    }
}

/// Errors from tag operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TagError {
    #[error("Tag not found")]
    NotFound,
    #[error("A tag with this name already exists")]
    DuplicateName,
    #[error("Cannot access tags")]
    CannotAccess,
}

impl TagError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "tag-not-found",
            Self::DuplicateName => "duplicate-tag-name",
            Self::CannotAccess => "cannot-access-tags",
        }
    }
}

impl From<Failure> for TagError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Fault(StorageFault::UniqueViolation) => Self::DuplicateName,
            _ => Self::CannotAccess,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIQUE: Failure = Failure::Fault(StorageFault::UniqueViolation);
    const FOREIGN_KEY: Failure = Failure::Fault(StorageFault::ForeignKeyViolation);
    const INVALID: Failure = Failure::Fault(StorageFault::InvalidInput);

    fn unmapped() -> Failure {
        Failure::Unmapped("1".to_string())
    }

    #[test]
    fn test_get_post_mapping() {
        assert_eq!(GetPostError::from(INVALID), GetPostError::NotFound);
        assert_eq!(GetPostError::from(UNIQUE), GetPostError::CannotGet);
        assert_eq!(GetPostError::from(unmapped()), GetPostError::CannotGet);
        assert_eq!(GetPostError::from(Failure::NoCode), GetPostError::Unclassified);
    }

    #[test]
    fn test_create_post_mapping() {
        assert_eq!(CreatePostError::from(UNIQUE), CreatePostError::DuplicateTitle);
        assert_eq!(
            CreatePostError::from(FOREIGN_KEY),
            CreatePostError::CategoryNotFound
        );
        assert_eq!(CreatePostError::from(INVALID), CreatePostError::CategoryNotFound);
        assert_eq!(CreatePostError::from(unmapped()), CreatePostError::CannotCreate);
        assert_eq!(
            CreatePostError::from(Failure::NoCode),
            CreatePostError::Unclassified
        );
    }

    #[test]
    fn test_update_post_mapping() {
        assert_eq!(UpdatePostError::from(UNIQUE), UpdatePostError::DuplicateTitle);
        assert_eq!(
            UpdatePostError::from(FOREIGN_KEY),
            UpdatePostError::CategoryNotFound
        );
        assert_eq!(UpdatePostError::from(unmapped()), UpdatePostError::CannotUpdate);
    }

    #[test]
    fn test_delete_post_mapping() {
        assert_eq!(DeletePostError::from(INVALID), DeletePostError::NotFound);
        assert_eq!(DeletePostError::from(FOREIGN_KEY), DeletePostError::CannotDelete);
        assert_eq!(
            DeletePostError::from(Failure::NoCode),
            DeletePostError::Unclassified
        );
    }

    #[test]
    fn test_list_and_collaborator_mapping() {
        assert_eq!(ListPostsError::from(UNIQUE), ListPostsError::CannotList);
        assert_eq!(CategoryError::from(UNIQUE), CategoryError::DuplicateName);
        assert_eq!(CategoryError::from(Failure::NoCode), CategoryError::CannotAccess);
        assert_eq!(TagError::from(UNIQUE), TagError::DuplicateName);
        assert_eq!(TagError::from(FOREIGN_KEY), TagError::CannotAccess);
    }

    #[test]
    fn test_codes() {
        assert_eq!(ListPostsError::CannotList.code(), "cannot-list-posts");
        assert_eq!(GetPostError::NotFound.code(), "post-not-found");
        assert_eq!(GetPostError::CannotGet.code(), "cannot-get-post");
        assert_eq!(CreatePostError::DuplicateTitle.code(), "duplicate-post-title");
        assert_eq!(CreatePostError::CategoryNotFound.code(), "category-not-found");
        assert_eq!(CreatePostError::CannotCreate.code(), "cannot-create-post");
        assert_eq!(UpdatePostError::CannotUpdate.code(), "cannot-update-post");
        assert_eq!(DeletePostError::NotFound.code(), "post-not-found");
        assert_eq!(DeletePostError::CannotDelete.code(), "cannot-delete-post");
        assert_eq!(UpdatePostError::Unclassified.code(), "unclassified-failure");
        assert_eq!(CategoryError::DuplicateName.code(), "duplicate-category-name");
        assert_eq!(TagError::CannotAccess.code(), "cannot-access-tags");
    }
}
