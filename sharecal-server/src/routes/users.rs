//! User directory endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use sharecal_core::access::can_manage_users;
use sharecal_core::users::User;
use sharecal_core::{Role, SharecalError};

use crate::routes::{AppError, forbidden};
use crate::state::AppState;
use crate::viewer::CurrentViewer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(register))
        .route("/users/{id}/role", put(set_role))
}

/// GET /users - List users (admins only)
async fn list_users(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
) -> Result<Json<Vec<User>>, AppError> {
    if !can_manage_users(&viewer) {
        return Err(forbidden("Only admins may list users"));
    }

    let mut users = state.users.write().await;
    users.reload()?;
    Ok(Json(users.users().to_vec()))
}

#[derive(Deserialize)]
struct RegisterRequest {
    id: String,
    email: Option<String>,
}

/// POST /users - Sign up. The first user of a fresh install becomes admin.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let mut users = state.users.write().await;
    users.reload()?;
    let user = users.register(&req.id, req.email.as_deref())?.clone();
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Deserialize)]
struct RoleRequest {
    role: Role,
}

/// PUT /users/:id/role - Change a user's role (admins only)
async fn set_role(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
    Json(req): Json<RoleRequest>,
) -> Result<Json<User>, AppError> {
    let mut users = state.users.write().await;
    users.reload()?;
    users.set_role(&viewer, &id, req.role)?;

    let user = users
        .get(&id)
        .cloned()
        .ok_or_else(|| SharecalError::UserNotFound(id.clone()))?;
    Ok(Json(user))
}
