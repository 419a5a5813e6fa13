use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::error::AppError;
use crate::models::{Tag, TagCount};

pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Tag>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE name = ?")
        .bind(name)
        .fetch_optional(executor)
        .await?;
    Ok(tag)
}

/// Return the tag called `name`, creating it on first use.
///
/// The `UNIQUE(name)` constraint decides concurrent creators: whoever loses the
/// insert falls back to reading the row the winner wrote.
pub async fn resolve_or_create(conn: &mut SqliteConnection, name: &str) -> Result<Tag, AppError> {
    if let Some(tag) = find_by_name(&mut *conn, name).await? {
        return Ok(tag);
    }

    let tag = Tag::new(name.to_string());
    let inserted = sqlx::query(
        "INSERT INTO tags (id, name, created_at) VALUES (?, ?, ?) ON CONFLICT(name) DO NOTHING",
    )
    .bind(&tag.id)
    .bind(&tag.name)
    .bind(&tag.created_at)
    .execute(&mut *conn)
    .await?;

    if inserted.rows_affected() == 1 {
        tracing::debug!(tag_id = %tag.id, name = %tag.name, "created tag");
        return Ok(tag);
    }

    find_by_name(&mut *conn, name)
        .await?
        .ok_or(AppError::Storage(sqlx::Error::RowNotFound))
}

/// Link a tag to an entry. Linking the same pair twice is a no-op.
pub async fn attach(conn: &mut SqliteConnection, entry_id: &str, tag_id: &str) -> Result<(), AppError> {
    sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag_id) VALUES (?, ?)")
        .bind(entry_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Remove every tag link of an entry. Tag rows are never deleted.
pub async fn detach_all(conn: &mut SqliteConnection, entry_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM entry_tags WHERE entry_id = ?")
        .bind(entry_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Make the entry's tag set exactly `names`: clear all links, then resolve
/// and attach each name in turn.
pub async fn replace_for_entry(
    conn: &mut SqliteConnection,
    entry_id: &str,
    names: &[String],
) -> Result<(), AppError> {
    detach_all(&mut *conn, entry_id).await?;

    for name in names {
        let tag = resolve_or_create(&mut *conn, name).await?;
        attach(&mut *conn, entry_id, &tag.id).await?;
    }

    Ok(())
}

pub async fn for_entry<'e, E>(executor: E, entry_id: &str) -> Result<Vec<Tag>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let tags: Vec<Tag> = sqlx::query_as(
        r#"
        SELECT t.* FROM tags t
        JOIN entry_tags et ON et.tag_id = t.id
        WHERE et.entry_id = ?
        ORDER BY t.name ASC
        "#,
    )
    .bind(entry_id)
    .fetch_all(executor)
    .await?;
    Ok(tags)
}

/// Tags used on `user_id`'s own entries, with per-tag entry counts.
pub async fn counts_for_user(db: &SqlitePool, user_id: &str) -> Result<Vec<TagCount>, AppError> {
    let counts: Vec<TagCount> = sqlx::query_as(
        r#"
        SELECT t.name, COUNT(et.entry_id) as count
        FROM tags t
        JOIN entry_tags et ON et.tag_id = t.id
        JOIN entries e ON e.id = et.entry_id
        WHERE e.user_id = ?
        GROUP BY t.id
        ORDER BY t.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(counts)
}
