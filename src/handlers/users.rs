use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::parse_id;
use crate::models::{Role, User};
use crate::state::AppState;

// POST /api/users
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub role: String,
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(req) = payload?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::BadRequest(format!("unknown role: {}", req.role)))?;

    let user = {
        let db = state.db()?;
        queries::create_user(&db, name, role)?
    };

    tracing::info!(user_id = user.id, role = role.as_str(), "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&raw_id)?;
    let db = state.db()?;
    queries::get_user(&db, id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

// GET /api/providers
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AppError> {
    let db = state.db()?;
    Ok(Json(queries::list_providers(&db)?))
}
