use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GratitudeItem {
    pub id: String,
    pub entry_id: String,
    pub content: String,
}

impl GratitudeItem {
    pub fn new(entry_id: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entry_id,
            content,
        }
    }
}
