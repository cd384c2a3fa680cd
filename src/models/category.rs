//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity. A post references at most one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Opaque unique identifier
    pub id: String,
    /// Display name (unique)
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
