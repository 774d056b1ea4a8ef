use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;

use crate::db::queries;

/// Longest booking considered when looking back for overlaps.
const LOOKBACK_HOURS: i64 = 24;

/// Longest duration a booking may have, explicit or defaulted.
pub const MAX_DURATION_MINUTES: i32 = (LOOKBACK_HOURS * 60) as i32;

#[derive(Debug)]
pub enum SchedulingError {
    InvalidDuration(i32),
    OutOfRange,
    Conflict { booking_id: i64 },
    Storage(anyhow::Error),
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulingError::InvalidDuration(minutes) => {
                write!(
                    f,
                    "duration must be between 1 and {MAX_DURATION_MINUTES} minutes, got {minutes}"
                )
            }
            SchedulingError::OutOfRange => {
                write!(f, "booking must start and end between years 0000 and 9999")
            }
            SchedulingError::Conflict { booking_id } => {
                write!(
                    f,
                    "the provider already has booking {booking_id} at that time"
                )
            }
            SchedulingError::Storage(e) => write!(f, "failed to check availability: {e}"),
        }
    }
}

/// Checks that a proposed booking does not overlap a pending or confirmed
/// booking of the same provider.
pub fn validate_booking_slot(
    conn: &Connection,
    provider_id: i64,
    start_at: &NaiveDateTime,
    duration_minutes: Option<i32>,
    default_duration_minutes: i32,
) -> Result<(), SchedulingError> {
    if let Some(minutes) = duration_minutes {
        if minutes <= 0 || minutes > MAX_DURATION_MINUTES {
            return Err(SchedulingError::InvalidDuration(minutes));
        }
    }

    let minutes = duration_minutes.unwrap_or(default_duration_minutes) as i64;
    let proposed_end = start_at
        .checked_add_signed(Duration::minutes(minutes))
        .filter(|end| queries::is_storable(start_at) && queries::is_storable(end))
        .ok_or(SchedulingError::OutOfRange)?;
    // A window reaching before year 0 still sorts below every stored row.
    let window_start = start_at
        .checked_sub_signed(Duration::hours(LOOKBACK_HOURS))
        .unwrap_or(NaiveDateTime::MIN);

    let bookings =
        queries::get_provider_bookings_in_range(conn, provider_id, &window_start, &proposed_end)
            .map_err(SchedulingError::Storage)?;

    for booking in &bookings {
        if !booking.status.holds_slot() {
            continue;
        }
        let overlaps_start = booking
            .end_at(default_duration_minutes)
            .map_or(true, |end| end > *start_at);
        if booking.start_at < proposed_end && overlaps_start {
            return Err(SchedulingError::Conflict {
                booking_id: booking.id,
            });
        }
    }

    Ok(())
}
