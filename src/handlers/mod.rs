pub mod bookings;
pub mod calendar;
pub mod health;
pub mod users;

use axum::http::HeaderMap;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::User;
use crate::services::coerce;
use crate::state::AppState;

/// Header carrying the authenticated caller's user id, set by the auth layer
/// in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

pub(crate) fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(coerce::to_int)
        .ok_or(AppError::Unauthorized)?;

    let db = state.db()?;
    queries::get_user(&db, user_id)?.ok_or(AppError::Unauthorized)
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    coerce::to_int(raw).ok_or_else(|| AppError::BadRequest(format!("invalid id: {raw}")))
}
