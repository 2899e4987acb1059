//! User CRUD handlers.
//!
//! Repository calls are blocking SQLite work, so each one runs on the
//! blocking pool and the handler awaits it.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::db::{DbError, User};
use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateRequest {
    pub email: Option<String>,
    pub birthdate: Option<String>,
}

/// `GET /api/v1/users?username=`
pub async fn find_by_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<User>, ApiError> {
    let username = query.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::BlankUsername);
    }

    let users = state.users.clone();
    let user = blocking(move || users.find_by_username(&username)).await?;
    Ok(Json(user))
}

/// `GET /api/v1/users/{id}`
pub async fn find_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    let users = state.users.clone();
    let user = blocking(move || users.find_by_id(id)).await?;
    Ok(Json(user))
}

/// `POST /api/v1/users`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let users = state.users.clone();
    let user = blocking(move || users.create(req.username.trim(), &req.password)).await?;
    tracing::info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `PUT /api/v1/users/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(req) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let users = state.users.clone();
    let user = blocking(move || {
        users.update_details(id, req.email.as_deref(), req.birthdate.as_deref())
    })
    .await?;
    Ok(Json(user))
}

/// `DELETE /api/v1/users/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    let users = state.users.clone();
    blocking(move || users.delete_by_id(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BlankId);
    }
    raw.parse().map_err(|_| ApiError::InvalidId)
}

async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f).await.map_err(DbError::from)?;
    Ok(result?)
}
