//! Data models
//!
//! Entities stored by the blog backend (Post, Category, Tag) and the input
//! types the post repository accepts.

mod category;
mod post;
mod tag;

pub use category::Category;
pub use post::{CreatePostInput, Post, PostWithRelations, UpdatePostInput};
pub use tag::Tag;
