//! Post model
//!
//! This module provides:
//! - `Post` entity representing one stored post row
//! - `PostWithRelations`, the post as returned by the repository with its
//!   category name and tag names resolved
//! - Input types for creating and updating posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
///
/// The normalized title used for uniqueness lives only in storage and is
/// never part of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Opaque unique identifier, assigned at creation
    pub id: String,
    /// Post title
    pub title: String,
    /// URL-friendly slug derived from the title (not unique)
    pub slug: String,
    /// Free-text content
    pub content: String,
    /// Whether the post is published
    pub published: bool,
    /// Optional category reference
    pub category_id: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A post with its category name and tag names resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostWithRelations {
    #[serde(flatten)]
    pub post: Post,
    /// Name of the referenced category, if any
    pub category: Option<String>,
    /// Names of associated tags, sorted by name
    pub tags: Vec<String>,
}

impl PostWithRelations {
    pub fn new(post: Post, category: Option<String>, tags: Vec<String>) -> Self {
        Self {
            post,
            category,
            tags,
        }
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// Free-text content
    pub content: String,
    /// Optional category reference
    pub category_id: Option<String>,
    /// Publication flag (defaults to false)
    pub published: Option<bool>,
    /// Tags to associate; unknown ids are dropped
    pub tag_ids: Vec<String>,
}

impl CreatePostInput {
    /// Create a new CreatePostInput with no category, unpublished, no tags
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category_id: None,
            published: None,
            tag_ids: Vec::new(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Set the publication flag
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    /// Set the tag ids
    pub fn with_tags<I, S>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_ids = tag_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// Input for updating an existing post
///
/// Every column is written. `tag_ids` is the exception: `None` leaves the
/// current associations untouched, `Some` (even empty) replaces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostInput {
    pub title: String,
    pub content: String,
    pub category_id: Option<String>,
    pub published: bool,
    pub tag_ids: Option<Vec<String>>,
}

impl UpdatePostInput {
    /// Create an update that keeps associations untouched
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category_id: Option<String>,
        published: bool,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category_id,
            published,
            tag_ids: None,
        }
    }

    /// Start from the current state of a post
    pub fn from_post(post: &Post) -> Self {
        Self::new(
            post.title.clone(),
            post.content.clone(),
            post.category_id.clone(),
            post.published,
        )
    }

    /// Replace the tag set
    pub fn with_tags<I, S>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_ids = Some(tag_ids.into_iter().map(Into::into).collect());
        self
    }
}
