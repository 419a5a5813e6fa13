use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::users::{self, Credentials};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(issue_token))
}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::register(&state.db, &state.hasher, &input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn issue_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::authenticate(&state.db, &state.hasher, &form.username, &form.password).await?;
    let access_token = state.tokens.issue(&user)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
