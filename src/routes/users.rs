use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::store::users::{self, UserUpdate};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(show_self).put(update_self).delete(delete_self))
}

async fn show_self(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get(&state.db, &identity.user_id).await?;
    Ok(Json(user))
}

async fn update_self(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(changes): Json<UserUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::update(&state.db, &state.hasher, &identity.user_id, &changes).await?;
    Ok(Json(user))
}

async fn delete_self(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    users::delete(&state.db, &identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
