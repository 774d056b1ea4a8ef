pub mod booking;
pub mod user;

pub use booking::{Booking, BookingAction, BookingStatus, NewBooking};
pub use user::{is_provider_role, Role, User};
