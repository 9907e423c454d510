//! Booking Aggregate
//!
//! Reservations of a decoration for a date and time window, and the
//! workflow that moves them from payment to completion.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{AssignedDecorator, Booking, BookingSlot, CustomerInfo};
pub use repository::{BookingRepository, MongoBookingRepository};
pub use api::{bookings_router, BookingsState};
