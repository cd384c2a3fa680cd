//! Tag model
//!
//! Tags relate to posts many-to-many through the `post_tags` table. The
//! association rows carry no attributes of their own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Opaque unique identifier
    pub id: String,
    /// Tag name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
