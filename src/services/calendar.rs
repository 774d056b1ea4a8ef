use crate::models::{Booking, BookingStatus, Role, User};

pub fn generate_ics(
    booking: &Booking,
    client: &User,
    provider: &User,
    default_duration_minutes: i32,
) -> String {
    let dtstart = booking.start_at.format("%Y%m%dT%H%M%S").to_string();
    // Stored bookings end within range; fall back to a zero-length event otherwise.
    let dtend = booking
        .end_at(default_duration_minutes)
        .unwrap_or(booking.start_at)
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = booking.updated_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("booking-{}@shutterbook", booking.id);

    let summary = match role_label(provider.role) {
        Some(label) => format!("{label} session: {} with {}", client.name, provider.name),
        None => format!("Session: {} with {}", client.name, provider.name),
    };
    let summary = escape_text(&summary);
    let description = booking
        .note
        .as_deref()
        .map(escape_text)
        .unwrap_or_else(|| "No additional notes".to_string());
    let status = match booking.status {
        BookingStatus::Confirmed | BookingStatus::Done => "CONFIRMED",
        BookingStatus::Pending => "TENTATIVE",
        BookingStatus::Declined | BookingStatus::Canceled => "CANCELLED",
    };

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Shutterbook//Bookings//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

fn role_label(role: Role) -> Option<&'static str> {
    match role {
        Role::Videographer => Some("Video"),
        Role::Photographer => Some("Photo"),
        Role::Client | Role::Admin => None,
    }
}

// RFC 5545 TEXT escaping
fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn user(id: i64, name: &str, role: Role) -> User {
        User {
            id,
            name: name.to_string(),
            role,
            created_at: ts("2025-03-01 08:00:00"),
        }
    }

    fn booking(note: Option<&str>, duration: Option<i32>, status: BookingStatus) -> Booking {
        Booking {
            id: 123,
            client_id: 1,
            provider_id: 2,
            start_at: ts("2025-03-15 14:00:00"),
            duration_minutes: duration,
            note: note.map(str::to_string),
            status,
            created_at: ts("2025-03-10 10:00:00"),
            updated_at: ts("2025-03-11 10:00:00"),
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(
            &booking(Some("Golden hour, beach"), Some(90), BookingStatus::Confirmed),
            &user(1, "Alice", Role::Client),
            &user(2, "Pat", Role::Photographer),
            60,
        );
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("DTSTART:20250315T140000"));
        assert!(ics.contains("DTEND:20250315T153000"));
        assert!(ics.contains("DTSTAMP:20250311T100000"));
        assert!(ics.contains("SUMMARY:Photo session: Alice with Pat"));
        assert!(ics.contains("DESCRIPTION:Golden hour\\, beach"));
        assert!(ics.contains("STATUS:CONFIRMED"));
        assert!(ics.contains("UID:booking-123@shutterbook"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_generate_ics_defaults() {
        let ics = generate_ics(
            &booking(None, None, BookingStatus::Pending),
            &user(1, "Alice", Role::Client),
            &user(2, "Vic", Role::Videographer),
            45,
        );
        assert!(ics.contains("DTEND:20250315T144500"));
        assert!(ics.contains("SUMMARY:Video session: Alice with Vic"));
        assert!(ics.contains("DESCRIPTION:No additional notes"));
        assert!(ics.contains("STATUS:TENTATIVE"));
    }

    #[test]
    fn test_non_provider_role_gets_plain_summary() {
        let ics = generate_ics(
            &booking(None, Some(30), BookingStatus::Confirmed),
            &user(1, "Alice", Role::Client),
            &user(2, "Sam", Role::Admin),
            60,
        );
        assert!(ics.contains("SUMMARY:Session: Alice with Sam"));
        assert!(!ics.contains("Photo session"));
    }

    #[test]
    fn test_role_labels() {
        assert_eq!(role_label(Role::Photographer), Some("Photo"));
        assert_eq!(role_label(Role::Videographer), Some("Video"));
        assert_eq!(role_label(Role::Client), None);
        assert_eq!(role_label(Role::Admin), None);
    }

    #[test]
    fn test_canceled_booking_is_cancelled_event() {
        let ics = generate_ics(
            &booking(None, Some(30), BookingStatus::Canceled),
            &user(1, "Alice", Role::Client),
            &user(2, "Pat", Role::Photographer),
            60,
        );
        assert!(ics.contains("STATUS:CANCELLED"));
    }
}
