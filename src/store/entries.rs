use serde::Deserialize;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{gratitude, tags, Checks};
use crate::error::{is_foreign_key_violation, AppError};
use crate::models::{now_timestamp, Entry, EntryDetail, Mood};

pub const DEFAULT_LIMIT: i64 = 100;

/// Fields supplied by the owner on create and update. Omitted or null lists
/// mean "no tags" / "no gratitude items".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub gratitude_items: Option<Vec<String>>,
}

impl EntryInput {
    pub fn tag_names(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    pub fn gratitude_texts(&self) -> &[String] {
        self.gratitude_items.as_deref().unwrap_or_default()
    }

    /// Check every field and return the parsed mood.
    pub fn validate(&self) -> Result<Option<Mood>, AppError> {
        let mut checks = Checks::default();

        checks.length("title", &self.title, 3, Some(100));
        checks.length("content", &self.content, 10, None);

        let mood = match self.mood.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<Mood>() {
                Ok(mood) => Some(mood),
                Err(e) => {
                    checks.fail("mood", e.to_string());
                    None
                }
            },
        };

        for (i, name) in self.tag_names().iter().enumerate() {
            if name.trim().is_empty() {
                checks.fail(&format!("tags[{i}]"), "must not be blank");
            } else {
                checks.length(&format!("tags[{i}]"), name, 1, Some(20));
            }
        }

        for (i, text) in self.gratitude_texts().iter().enumerate() {
            checks.length(&format!("gratitude_items[{i}]"), text, 3, Some(500));
        }

        checks.finish()?;
        Ok(mood)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    fn validate(&self) -> Result<(), AppError> {
        let mut checks = Checks::default();
        if self.skip < 0 {
            checks.fail("skip", "must not be negative");
        }
        if self.limit < 0 {
            checks.fail("limit", "must not be negative");
        }
        checks.finish()
    }
}

async fn find_owned<'e, E>(executor: E, owner_id: &str, entry_id: &str) -> Result<Option<Entry>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let entry: Option<Entry> = sqlx::query_as("SELECT * FROM entries WHERE id = ? AND user_id = ?")
        .bind(entry_id)
        .bind(owner_id)
        .fetch_optional(executor)
        .await?;
    Ok(entry)
}

async fn load_detail(conn: &mut SqliteConnection, entry: Entry) -> Result<EntryDetail, AppError> {
    let tags = tags::for_entry(&mut *conn, &entry.id).await?;
    let gratitude_items = gratitude::for_entry(&mut *conn, &entry.id).await?;
    Ok(EntryDetail {
        entry,
        tags,
        gratitude_items,
    })
}

/// Create an entry with its tag links and gratitude items in one transaction.
pub async fn create(db: &SqlitePool, owner_id: &str, input: &EntryInput) -> Result<EntryDetail, AppError> {
    let mood = input.validate()?;

    let entry = Entry {
        id: Uuid::new_v4().to_string(),
        user_id: owner_id.to_string(),
        title: input.title.clone(),
        content: input.content.clone(),
        mood,
        created_at: now_timestamp(),
    };

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO entries (id, user_id, title, content, mood, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.user_id)
    .bind(&entry.title)
    .bind(&entry.content)
    .bind(entry.mood)
    .bind(&entry.created_at)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        // The owner was deleted after its token was issued.
        if is_foreign_key_violation(&e) {
            AppError::NotFound
        } else {
            AppError::Storage(e)
        }
    })?;

    tags::replace_for_entry(&mut tx, &entry.id, input.tag_names()).await?;
    gratitude::replace_all(&mut tx, &entry.id, input.gratitude_texts()).await?;

    let detail = load_detail(&mut tx, entry).await?;
    tx.commit().await?;

    tracing::info!(entry_id = %detail.entry.id, user_id = %owner_id, "created entry");
    Ok(detail)
}

/// The owner's entries, newest first.
pub async fn list(db: &SqlitePool, owner_id: &str, page: Page) -> Result<Vec<EntryDetail>, AppError> {
    page.validate()?;

    let mut conn = db.acquire().await?;

    let entries: Vec<Entry> = sqlx::query_as(
        r#"
        SELECT * FROM entries
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(owner_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&mut *conn)
    .await?;

    let mut details = Vec::with_capacity(entries.len());
    for entry in entries {
        details.push(load_detail(&mut conn, entry).await?);
    }
    Ok(details)
}

/// Fetch one entry. An entry owned by someone else is reported as missing.
pub async fn get(db: &SqlitePool, owner_id: &str, entry_id: &str) -> Result<EntryDetail, AppError> {
    let mut conn = db.acquire().await?;

    let entry = find_owned(&mut *conn, owner_id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    load_detail(&mut conn, entry).await
}

/// Overwrite the entry's fields and replace its tag set and gratitude items
/// wholesale. Nothing is written unless every step succeeds.
pub async fn update(
    db: &SqlitePool,
    owner_id: &str,
    entry_id: &str,
    input: &EntryInput,
) -> Result<EntryDetail, AppError> {
    let mood = input.validate()?;

    let mut tx = db.begin().await?;

    // Write before reading so the transaction holds the write lock from its
    // first statement; a read-then-write transaction fails with SQLITE_BUSY
    // instead of waiting when another writer gets in between.
    let updated = sqlx::query("UPDATE entries SET title = ?, content = ?, mood = ? WHERE id = ? AND user_id = ?")
        .bind(&input.title)
        .bind(&input.content)
        .bind(mood)
        .bind(entry_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let entry = find_owned(&mut *tx, owner_id, entry_id)
        .await?
        .ok_or(AppError::NotFound)?;

    tags::replace_for_entry(&mut tx, &entry.id, input.tag_names()).await?;
    gratitude::replace_all(&mut tx, &entry.id, input.gratitude_texts()).await?;

    let detail = load_detail(&mut tx, entry).await?;
    tx.commit().await?;

    tracing::debug!(entry_id = %entry_id, "updated entry");
    Ok(detail)
}

/// Delete an entry, its gratitude items and its tag links. Tags stay.
pub async fn delete(db: &SqlitePool, owner_id: &str, entry_id: &str) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    // Dependents go first, which also takes the write lock up front. If the
    // entry turns out not to be the caller's, dropping `tx` rolls them back.
    gratitude::delete_all(&mut tx, entry_id).await?;
    tags::detach_all(&mut tx, entry_id).await?;

    let deleted = sqlx::query("DELETE FROM entries WHERE id = ? AND user_id = ?")
        .bind(entry_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tx.commit().await?;

    tracing::info!(entry_id = %entry_id, user_id = %owner_id, "deleted entry");
    Ok(())
}
