use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    pub provider_id: i64,
    pub start_at: NaiveDateTime,
    pub duration_minutes: Option<i32>,
    pub note: Option<String>,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn is_client(&self, user_id: i64) -> bool {
        self.client_id == user_id
    }

    pub fn is_provider(&self, user_id: i64) -> bool {
        self.provider_id == user_id
    }

    /// `None` when the end falls outside the representable date range.
    pub fn end_at(&self, default_duration_minutes: i32) -> Option<NaiveDateTime> {
        let minutes = self.duration_minutes.unwrap_or(default_duration_minutes);
        self.start_at.checked_add_signed(Duration::minutes(minutes as i64))
    }
}

/// Fields supplied by the client when requesting a booking.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client_id: i64,
    pub provider_id: i64,
    pub start_at: NaiveDateTime,
    pub duration_minutes: Option<i32>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Declined,
    Canceled,
    Done,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Declined => "declined",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "declined" => Some(BookingStatus::Declined),
            "canceled" => Some(BookingStatus::Canceled),
            "done" => Some(BookingStatus::Done),
            _ => None,
        }
    }

    /// Whether a booking in this status still occupies the provider's calendar.
    pub fn holds_slot(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Confirm,
    Decline,
    Cancel,
    Done,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Decline => "decline",
            BookingAction::Cancel => "cancel",
            BookingAction::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirm" => Some(BookingAction::Confirm),
            "decline" => Some(BookingAction::Decline),
            "cancel" => Some(BookingAction::Cancel),
            "done" => Some(BookingAction::Done),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn booking(duration_minutes: Option<i32>) -> Booking {
        Booking {
            id: 1,
            client_id: 10,
            provider_id: 20,
            start_at: dt("2025-06-16 10:00"),
            duration_minutes,
            note: None,
            status: BookingStatus::Pending,
            created_at: dt("2025-06-01 09:00"),
            updated_at: dt("2025-06-01 09:00"),
        }
    }

    #[test]
    fn test_status_parse_known_values() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Declined,
            BookingStatus::Canceled,
            BookingStatus::Done,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(BookingStatus::parse("cancelled"), None);
        assert_eq!(BookingStatus::parse("PENDING"), None);
        assert_eq!(BookingStatus::parse(""), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Canceled).unwrap();
        assert_eq!(json, "\"canceled\"");
    }

    #[test]
    fn test_action_parse_is_case_sensitive() {
        assert_eq!(BookingAction::parse("done"), Some(BookingAction::Done));
        assert_eq!(BookingAction::parse("Done"), None);
        assert_eq!(BookingAction::parse("complete"), None);
    }

    #[test]
    fn test_holds_slot() {
        assert!(BookingStatus::Pending.holds_slot());
        assert!(BookingStatus::Confirmed.holds_slot());
        assert!(!BookingStatus::Declined.holds_slot());
        assert!(!BookingStatus::Canceled.holds_slot());
        assert!(!BookingStatus::Done.holds_slot());
    }

    #[test]
    fn test_end_at_uses_default_when_duration_missing() {
        assert_eq!(booking(Some(90)).end_at(60), Some(dt("2025-06-16 11:30")));
        assert_eq!(booking(None).end_at(60), Some(dt("2025-06-16 11:00")));
    }

    #[test]
    fn test_end_at_past_max_date_is_none() {
        let mut b = booking(Some(60));
        b.start_at = NaiveDateTime::MAX;
        assert_eq!(b.end_at(60), None);
    }

    #[test]
    fn test_party_checks() {
        let b = booking(None);
        assert!(b.is_client(10));
        assert!(!b.is_provider(10));
        assert!(b.is_provider(20));
        assert!(!b.is_client(30) && !b.is_provider(30));
    }
}
