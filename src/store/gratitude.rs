use sqlx::{Sqlite, SqliteConnection};

use crate::error::AppError;
use crate::models::GratitudeItem;

/// Drop every item of the entry and insert one fresh item per text.
pub async fn replace_all(
    conn: &mut SqliteConnection,
    entry_id: &str,
    texts: &[String],
) -> Result<Vec<GratitudeItem>, AppError> {
    delete_all(&mut *conn, entry_id).await?;

    let mut items = Vec::with_capacity(texts.len());
    for text in texts {
        let item = GratitudeItem::new(entry_id.to_string(), text.clone());
        sqlx::query("INSERT INTO gratitude_items (id, entry_id, content) VALUES (?, ?, ?)")
            .bind(&item.id)
            .bind(&item.entry_id)
            .bind(&item.content)
            .execute(&mut *conn)
            .await?;
        items.push(item);
    }

    Ok(items)
}

pub async fn delete_all(conn: &mut SqliteConnection, entry_id: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM gratitude_items WHERE entry_id = ?")
        .bind(entry_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn for_entry<'e, E>(executor: E, entry_id: &str) -> Result<Vec<GratitudeItem>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let items: Vec<GratitudeItem> = sqlx::query_as("SELECT * FROM gratitude_items WHERE entry_id = ? ORDER BY rowid")
        .bind(entry_id)
        .fetch_all(executor)
        .await?;
    Ok(items)
}
