pub mod booking;
pub mod conflict;
