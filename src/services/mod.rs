pub mod booking_status;
pub mod calendar;
pub mod coerce;
pub mod scheduling;
