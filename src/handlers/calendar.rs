use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::bookings::load_own_booking;
use crate::handlers::{current_user, parse_id};
use crate::services::calendar::generate_ics;
use crate::state::AppState;

// GET /api/bookings/:id/ics
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let caller = current_user(&state, &headers)?;
    let booking_id = parse_id(&raw_id)?;
    let booking = load_own_booking(&state, caller.id, booking_id)?;

    let (client, provider) = {
        let db = state.db()?;
        let client = queries::get_user(&db, booking.client_id)?;
        let provider = queries::get_user(&db, booking.provider_id)?;
        (client, provider)
    };
    let (Some(client), Some(provider)) = (client, provider) else {
        return Err(AppError::NotFound(format!(
            "participants of booking {booking_id}"
        )));
    };

    let ics = generate_ics(
        &booking,
        &client,
        &provider,
        state.config.default_duration_minutes,
    );
    let filename = format!("booking-{booking_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
