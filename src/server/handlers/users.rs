use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::server::config::AppState;
use crate::server::error::ApiError;
use crate::server::models::{CreateUser, User};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state.store.create_user(input).await?;
    info!("user registered: {}", user.email);
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.store.user(id).await?;
    Ok(Json(UserResponse { user }))
}
