//! User route handlers (JSON bodies).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use shop_core::UserId;

use super::{MessageResponse, parse_id};
use crate::db::ensure_affected;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User};
use crate::planner::{UserPatch, plan_user_update};
use crate::state::AppState;

/// Body of a successful create or update.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: User,
}

fn user_not_found(id: UserId) -> AppError {
    AppError::NotFound(format!("User {id}"))
}

/// List all users.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users().list().await?))
}

/// Show one user.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id: UserId = parse_id(&id)?;
    let user = state
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    Ok(Json(user))
}

/// Create a user.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let Json(new_user) = payload?;
    if new_user.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }

    let user = state.users().create(&new_user).await?;
    tracing::info!(user_id = %user.id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: "User created",
            user,
        }),
    ))
}

/// Apply a partial update to a user.
///
/// Omitted fields are left alone. Present fields are written only when they
/// differ from the stored row.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let id: UserId = parse_id(&id)?;
    let Json(patch) = payload?;

    let repo = state.users();
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    let plan = plan_user_update(&current, &patch)?;
    ensure_affected(repo.apply_update(&plan).await?)?;
    tracing::info!(
        user_id = %id,
        columns = ?plan.columns().collect::<Vec<_>>(),
        "User updated"
    );

    let user = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    Ok(Json(UserResponse {
        message: "User updated",
        user,
    }))
}

/// Delete a user.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: UserId = parse_id(&id)?;

    ensure_affected(state.users().delete(id).await?).map_err(|_| user_not_found(id))?;
    tracing::info!(user_id = %id, "User deleted");

    Ok(Json(MessageResponse {
        message: "User deleted",
    }))
}
