use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::now_timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl Tag {
    /// Names are kept exactly as supplied; "Rust" and "rust" are distinct tags.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: now_timestamp(),
        }
    }
}

/// A tag together with how many of one user's entries carry it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}
