use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::store::entries::{self, EntryInput, Page};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/entries", get(list_entries).post(create_entry))
        .route(
            "/entries/{id}",
            get(show_entry).put(update_entry).delete(delete_entry),
        )
}

async fn list_entries(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(page): Query<Page>,
) -> Result<impl IntoResponse, AppError> {
    let entries = entries::list(&state.db, &identity.user_id, page).await?;
    Ok(Json(entries))
}

async fn create_entry(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(input): Json<EntryInput>,
) -> Result<impl IntoResponse, AppError> {
    let entry = entries::create(&state.db, &identity.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn show_entry(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = entries::get(&state.db, &identity.user_id, &id).await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<EntryInput>,
) -> Result<impl IntoResponse, AppError> {
    let entry = entries::update(&state.db, &identity.user_id, &id, &input).await?;
    Ok(Json(entry))
}

async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    entries::delete(&state.db, &identity.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
