use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::Checks;
use crate::auth::PasswordHasher;
use crate::error::{is_unique_violation, AppError};
use crate::models::{now_timestamp, User};

const USERNAME_TAKEN: &str = "Username already registered";

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), AppError> {
        let mut checks = Checks::default();
        check_username(&mut checks, &self.username);
        check_password(&mut checks, &self.password);
        checks.finish()
    }
}

/// Profile changes; a field left out stays as it is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UserUpdate {
    fn validate(&self) -> Result<(), AppError> {
        let mut checks = Checks::default();
        if let Some(username) = &self.username {
            check_username(&mut checks, username);
        }
        if let Some(password) = &self.password {
            check_password(&mut checks, password);
        }
        checks.finish()
    }
}

fn check_username(checks: &mut Checks, username: &str) {
    checks.length("username", username, 3, Some(50));
}

fn check_password(checks: &mut Checks, password: &str) {
    checks.length("password", password, 5, None);
}

fn conflict_on_duplicate(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict(USERNAME_TAKEN.to_string())
    } else {
        AppError::Storage(e)
    }
}

async fn find_by_username(db: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn register(db: &SqlitePool, hasher: &PasswordHasher, input: &Credentials) -> Result<User, AppError> {
    input.validate()?;

    if find_by_username(db, &input.username).await?.is_some() {
        return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
    }

    let now = now_timestamp();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: input.username.clone(),
        password_hash: hasher.hash(&input.password)?,
        created_at: now.clone(),
        updated_at: now,
    };

    // A concurrent registration can still win between the check and here;
    // the unique index turns that into the same conflict.
    sqlx::query(
        "INSERT INTO users (id, username, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(db)
    .await
    .map_err(conflict_on_duplicate)?;

    tracing::info!(user_id = %user.id, username = %user.username, "registered user");
    Ok(user)
}

/// Check a username/password pair. Unknown users and wrong passwords are
/// indistinguishable to the caller.
pub async fn authenticate(
    db: &SqlitePool,
    hasher: &PasswordHasher,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let rejected = || AppError::Unauthorized("Incorrect username or password".to_string());

    let user = find_by_username(db, username).await?.ok_or_else(rejected)?;
    if !hasher.verify(password, &user.password_hash)? {
        tracing::debug!(username = %username, "password mismatch");
        return Err(rejected());
    }
    Ok(user)
}

pub async fn get(db: &SqlitePool, user_id: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn update(
    db: &SqlitePool,
    hasher: &PasswordHasher,
    user_id: &str,
    changes: &UserUpdate,
) -> Result<User, AppError> {
    changes.validate()?;

    let mut user = get(db, user_id).await?;

    if let Some(username) = &changes.username {
        if *username != user.username && find_by_username(db, username).await?.is_some() {
            return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
        }
        user.username = username.clone();
    }
    if let Some(password) = &changes.password {
        user.password_hash = hasher.hash(password)?;
    }
    user.updated_at = now_timestamp();

    let result = sqlx::query("UPDATE users SET username = ?, password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.updated_at)
        .bind(&user.id)
        .execute(db)
        .await
        .map_err(conflict_on_duplicate)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(user)
}

/// Delete the user along with every entry they own, including the entries'
/// gratitude items and tag links.
pub async fn delete(db: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    sqlx::query(
        "DELETE FROM gratitude_items WHERE entry_id IN (SELECT id FROM entries WHERE user_id = ?)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM entry_tags WHERE entry_id IN (SELECT id FROM entries WHERE user_id = ?)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let entries = sqlx::query("DELETE FROM entries WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tx.commit().await?;

    tracing::info!(
        user_id = %user_id,
        entries = entries.rows_affected(),
        "deleted user"
    );
    Ok(())
}
