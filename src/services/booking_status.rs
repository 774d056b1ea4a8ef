use crate::models::{BookingAction, BookingStatus};

/// Outcome of asking whether an action may move a booking to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(BookingStatus),
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("not allowed to {} this booking", .0.as_str())]
    NotPermitted(BookingAction),
}

/// Computes the status a booking moves to when `action` is requested by a
/// caller with the given relationship to it.
///
/// Role gates are per action, not per status: `_current` is accepted as
/// stored and no status preconditions are applied. `is_client` and
/// `is_provider` are checked independently.
pub fn resolve(
    _current: BookingStatus,
    action: &str,
    is_client: bool,
    is_provider: bool,
) -> Transition {
    let Some(action) = BookingAction::parse(action) else {
        return Transition::Rejected(Rejection::UnknownAction(action.to_string()));
    };

    let (allowed, next) = match action {
        BookingAction::Confirm => (is_provider, BookingStatus::Confirmed),
        BookingAction::Decline => (is_provider, BookingStatus::Declined),
        BookingAction::Cancel => (is_client, BookingStatus::Canceled),
        BookingAction::Done => (is_provider, BookingStatus::Done),
    };

    if allowed {
        Transition::Next(next)
    } else {
        Transition::Rejected(Rejection::NotPermitted(action))
    }
}
