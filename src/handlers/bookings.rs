use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{current_user, parse_id};
use crate::models::{is_provider_role, Booking, BookingStatus, NewBooking};
use crate::services::booking_status::{self, Transition};
use crate::services::coerce;
use crate::services::scheduling::{self, SchedulingError};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: i64,
    client_id: i64,
    provider_id: i64,
    start_at: String,
    duration_minutes: Option<i32>,
    note: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            client_id: b.client_id,
            provider_id: b.provider_id,
            start_at: b.start_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            duration_minutes: b.duration_minutes,
            note: b.note,
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

/// Accepts RFC 3339 (converted to UTC) or a naive `YYYY-MM-DD[T ]HH:MM[:SS]`.
fn parse_start_at(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub provider_id: serde_json::Value,
    pub start_at: String,
    pub duration_minutes: Option<i32>,
    pub note: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let caller = current_user(&state, &headers)?;
    let Json(req) = payload?;

    let provider_id = coerce::to_int_value(&req.provider_id)
        .ok_or_else(|| AppError::BadRequest("invalid provider_id".to_string()))?;
    let start_at = parse_start_at(req.start_at.trim())
        .ok_or_else(|| AppError::BadRequest(format!("invalid start_at: {}", req.start_at)))?;
    if !queries::is_storable(&start_at) {
        return Err(AppError::BadRequest(format!(
            "start_at must be between years 0000 and 9999: {}",
            req.start_at
        )));
    }
    if provider_id == caller.id {
        return Err(AppError::BadRequest("cannot book yourself".to_string()));
    }
    let note = req
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let booking = {
        let db = state.db()?;

        let provider_role = queries::get_user(&db, provider_id)?.map(|u| u.role);
        if !is_provider_role(provider_role) {
            return Err(AppError::BadRequest(format!(
                "user {provider_id} is not a photographer or videographer"
            )));
        }

        // Check and insert under one lock so two requests cannot claim the same slot.
        scheduling::validate_booking_slot(
            &db,
            provider_id,
            &start_at,
            req.duration_minutes,
            state.config.default_duration_minutes,
        )
        .map_err(|e| match e {
            SchedulingError::Conflict { .. } => AppError::Conflict(e.to_string()),
            SchedulingError::InvalidDuration(_) | SchedulingError::OutOfRange => {
                AppError::BadRequest(e.to_string())
            }
            SchedulingError::Storage(inner) => AppError::Internal(inner),
        })?;

        queries::create_booking(
            &db,
            &NewBooking {
                client_id: caller.id,
                provider_id,
                start_at,
                duration_minutes: req.duration_minutes,
                note,
            },
        )?
    };

    tracing::info!(
        booking_id = booking.id,
        client_id = booking.client_id,
        provider_id = booking.provider_id,
        "booking requested"
    );
    Ok((StatusCode::CREATED, Json(booking.into())))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub cursor: Option<String>,
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct BookingsPage {
    bookings: Vec<BookingResponse>,
    next_cursor: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<BookingsPage>, AppError> {
    let caller = current_user(&state, &headers)?;

    let cursor = match query.cursor.as_deref() {
        Some(raw) => coerce::to_int(raw)
            .ok_or_else(|| AppError::BadRequest(format!("invalid cursor: {raw}")))?,
        None => 0,
    };
    let limit = match query.limit.as_deref() {
        Some(raw) => coerce::to_int(raw)
            .ok_or_else(|| AppError::BadRequest(format!("invalid limit: {raw}")))?,
        None => state.config.default_page_size,
    }
    .clamp(1, state.config.max_page_size.max(1));

    let mut bookings = {
        let db = state.db()?;
        queries::get_bookings_for_user(&db, caller.id, cursor, limit.saturating_add(1))?
    };

    let next_cursor = if bookings.len() as i64 > limit {
        bookings.truncate(limit as usize);
        bookings.last().map(|b| b.id)
    } else {
        None
    };

    Ok(Json(BookingsPage {
        bookings: bookings.into_iter().map(BookingResponse::from).collect(),
        next_cursor,
    }))
}

/// Loads a booking the caller is a party to.
pub(crate) fn load_own_booking(
    state: &AppState,
    caller_id: i64,
    id: i64,
) -> Result<Booking, AppError> {
    let booking = {
        let db = state.db()?;
        queries::get_booking_by_id(&db, id)?
    }
    .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    if !booking.is_client(caller_id) && !booking.is_provider(caller_id) {
        return Err(AppError::Forbidden(format!(
            "not a party to booking {id}"
        )));
    }
    Ok(booking)
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let caller = current_user(&state, &headers)?;
    let id = parse_id(&raw_id)?;
    let booking = load_own_booking(&state, caller.id, id)?;
    Ok(Json(booking.into()))
}

// PATCH /api/bookings/:id
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub action: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, AppError> {
    let caller = current_user(&state, &headers)?;
    let id = parse_id(&raw_id)?;
    let Json(req) = payload?;
    let booking = load_own_booking(&state, caller.id, id)?;

    let is_client = booking.is_client(caller.id);
    let is_provider = booking.is_provider(caller.id);

    let next = match booking_status::resolve(booking.status, &req.action, is_client, is_provider) {
        Transition::Next(next) => next,
        Transition::Rejected(rejection) => {
            tracing::warn!(
                booking_id = id,
                user_id = caller.id,
                action = %req.action,
                reason = %rejection,
                "booking transition rejected"
            );
            return Err(AppError::BadRequest(rejection.to_string()));
        }
    };

    let updated = commit_transition(&state, &booking, next)?;

    tracing::info!(
        booking_id = id,
        from = booking.status.as_str(),
        to = next.as_str(),
        "booking status changed"
    );
    Ok(Json(updated.into()))
}

/// Writes `next` only if the booking still has the status it was loaded with.
pub(crate) fn commit_transition(
    state: &AppState,
    booking: &Booking,
    next: BookingStatus,
) -> Result<Booking, AppError> {
    let id = booking.id;
    let db = state.db()?;
    if !queries::update_booking_status(&db, id, booking.status, next)? {
        return Err(AppError::Conflict(format!(
            "booking {id} changed while the request was in flight"
        )));
    }
    queries::get_booking_by_id(&db, id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db;
    use crate::models::Role;

    fn test_state() -> AppState {
        let config = AppConfig {
            port: 0,
            database_url: ":memory:".to_string(),
            default_page_size: 20,
            max_page_size: 100,
            default_duration_minutes: 60,
        };
        AppState::new(db::init_db(":memory:").unwrap(), config)
    }

    fn seed_booking(state: &AppState) -> Booking {
        let db = state.db().unwrap();
        let client = queries::create_user(&db, "Alice", Role::Client).unwrap();
        let provider = queries::create_user(&db, "Pat", Role::Photographer).unwrap();
        queries::create_booking(
            &db,
            &NewBooking {
                client_id: client.id,
                provider_id: provider.id,
                start_at: parse_start_at("2025-06-16T10:00:00").unwrap(),
                duration_minutes: Some(60),
                note: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_commit_transition_applies_next_status() {
        let state = test_state();
        let booking = seed_booking(&state);
        let updated = commit_transition(&state, &booking, BookingStatus::Confirmed).unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_commit_transition_with_stale_status_is_conflict() {
        let state = test_state();
        let loaded = load_own_booking(&state, 1, seed_booking(&state).id).unwrap();

        // Another request cancels the booking after it was loaded
        {
            let db = state.db().unwrap();
            let changed = queries::update_booking_status(
                &db,
                loaded.id,
                BookingStatus::Pending,
                BookingStatus::Canceled,
            )
            .unwrap();
            assert!(changed);
        }

        let result = commit_transition(&state, &loaded, BookingStatus::Confirmed);
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let db = state.db().unwrap();
        let stored = queries::get_booking_by_id(&db, loaded.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Canceled);
    }

    #[test]
    fn test_parse_start_at_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2025-06-16 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_start_at("2025-06-16T10:00:00"), Some(expected));
        assert_eq!(parse_start_at("2025-06-16 10:00"), Some(expected));
        assert_eq!(parse_start_at("2025-06-16T10:00:00Z"), Some(expected));
        assert_eq!(parse_start_at("2025-06-16T12:00:00+02:00"), Some(expected));
    }

    #[test]
    fn test_parse_start_at_rejects_garbage() {
        assert_eq!(parse_start_at("tomorrow"), None);
        assert_eq!(parse_start_at("2025-06-16"), None);
        assert_eq!(parse_start_at(""), None);
    }
}
