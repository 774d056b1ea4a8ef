use chrono::{Datelike, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, NewBooking, Role, User};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str =
    "id, client_id, provider_id, start_at, duration_minutes, note, status, created_at, updated_at";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn format_ts(dt: &NaiveDateTime) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Stored timestamps are compared as TEXT, which only orders correctly for
/// four-digit years.
pub fn is_storable(dt: &NaiveDateTime) -> bool {
    (0..=9999).contains(&dt.year())
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid stored timestamp {s:?}: {e}"))
}

// ── Users ──

pub fn create_user(conn: &Connection, name: &str, role: Role) -> anyhow::Result<User> {
    let created_at = now();
    conn.execute(
        "INSERT INTO users (name, role, created_at) VALUES (?1, ?2, ?3)",
        params![name, role.as_str(), format_ts(&created_at)],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        role,
        created_at,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, role, created_at FROM users WHERE id = ?1",
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_providers(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, name, role, created_at FROM users ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| Ok(parse_user_row(row)))?;

    let mut providers = vec![];
    for row in rows {
        let user = row??;
        if user.role.is_provider() {
            providers.push(user);
        }
    }
    Ok(providers)
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let role_str: String = row.get(2)?;
    let created_at_str: String = row.get(3)?;

    let role = Role::parse(&role_str)
        .ok_or_else(|| anyhow::anyhow!("user {id} has unknown role {role_str:?}"))?;

    Ok(User {
        id,
        name,
        role,
        created_at: parse_ts(&created_at_str)?,
    })
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, new: &NewBooking) -> anyhow::Result<Booking> {
    let created_at = now();
    let status = BookingStatus::Pending;

    conn.execute(
        "INSERT INTO bookings (client_id, provider_id, start_at, duration_minutes, note, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            new.client_id,
            new.provider_id,
            format_ts(&new.start_at),
            new.duration_minutes,
            new.note,
            status.as_str(),
            format_ts(&created_at),
        ],
    )?;

    Ok(Booking {
        id: conn.last_insert_rowid(),
        client_id: new.client_id,
        provider_id: new.provider_id,
        start_at: new.start_at,
        duration_minutes: new.duration_minutes,
        note: new.note.clone(),
        status,
        created_at,
        updated_at: created_at,
    })
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Bookings where the user is either party, ordered by id, starting after
/// `after_id`.
pub fn get_bookings_for_user(
    conn: &Connection,
    user_id: i64,
    after_id: i64,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE (client_id = ?1 OR provider_id = ?1) AND id > ?2
         ORDER BY id ASC LIMIT ?3"
    ))?;

    let rows = stmt.query_map(params![user_id, after_id, limit], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Provider bookings starting in `[start, end)`, regardless of status.
pub fn get_provider_bookings_in_range(
    conn: &Connection,
    provider_id: i64,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE provider_id = ?1 AND start_at >= ?2 AND start_at < ?3
         ORDER BY start_at ASC"
    ))?;

    let rows = stmt.query_map(
        params![provider_id, format_ts(start), format_ts(end)],
        |row| Ok(parse_booking_row(row)),
    )?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Compare-and-set status update. Returns `false` when the booking is gone
/// or its status is no longer `expected`.
pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    expected: BookingStatus,
    next: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![next.as_str(), format_ts(&now()), id, expected.as_str()],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: i64 = row.get(0)?;
    let client_id: i64 = row.get(1)?;
    let provider_id: i64 = row.get(2)?;
    let start_at_str: String = row.get(3)?;
    let duration_minutes: Option<i32> = row.get(4)?;
    let note: Option<String> = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;

    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| anyhow::anyhow!("booking {id} has unknown status {status_str:?}"))?;

    Ok(Booking {
        id,
        client_id,
        provider_id,
        start_at: parse_ts(&start_at_str)?,
        duration_minutes,
        note,
        status,
        created_at: parse_ts(&created_at_str)?,
        updated_at: parse_ts(&updated_at_str)?,
    })
}
