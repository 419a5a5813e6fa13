use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::User;
use crate::AppState;

/// Slow, salted one-way hashing of raw passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, raw: &str) -> Result<String, AppError> {
        Ok(bcrypt::hash(raw, self.cost)?)
    }

    pub fn verify(&self, raw: &str, hash: &str) -> Result<bool, AppError> {
        Ok(bcrypt::verify(raw, hash)?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// The acting account recovered from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

/// Issues and verifies signed, time-limited bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AppError::Token)
    }

    /// Pure mapping from a presented token to the identity it carries.
    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = ?e, "bearer token rejected");
            AppError::Unauthorized("Could not validate credentials".to_string())
        })?;

        Ok(Identity {
            user_id: data.claims.sub,
            username: data.claims.username,
        })
    }
}

/// Extractor for handlers that require an authenticated caller.
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

        state.tokens.verify(token).map(AuthUser)
    }
}
