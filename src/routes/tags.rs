use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::store::tags;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/tags", get(list_tags))
}

/// Tags on the caller's own entries with how often each is used.
async fn list_tags(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let counts = tags::counts_for_user(&state.db, &identity.user_id).await?;
    Ok(Json(counts))
}
