use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use super::{GratitudeItem, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum Mood {
    #[serde(rename = "happy")]
    #[sqlx(rename = "happy")]
    Happy,
    #[serde(rename = "neutral")]
    #[sqlx(rename = "neutral")]
    Neutral,
    #[serde(rename = "sad")]
    #[sqlx(rename = "sad")]
    Sad,
    #[serde(rename = "excited")]
    #[sqlx(rename = "excited")]
    Excited,
    #[serde(rename = "calm")]
    #[sqlx(rename = "calm")]
    Calm,
}

impl Mood {
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Neutral, Mood::Sad, Mood::Excited, Mood::Calm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Calm => "calm",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mood '{0}', expected one of happy, neutral, sad, excited, calm")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub created_at: String,
}

/// An entry with its tags and gratitude items, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct EntryDetail {
    #[serde(flatten)]
    pub entry: Entry,
    pub tags: Vec<Tag>,
    pub gratitude_items: Vec<GratitudeItem>,
}

impl EntryDetail {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn gratitude_contents(&self) -> Vec<&str> {
        self.gratitude_items.iter().map(|g| g.content.as_str()).collect()
    }
}
