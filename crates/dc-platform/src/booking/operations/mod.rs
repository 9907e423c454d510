//! Booking Operations

pub mod events;
pub mod create;
pub mod assign;
pub mod status;
pub mod cancel;

pub use events::{BookingCancelled, BookingCreated, BookingStatusChanged, DecoratorAssigned};
pub use create::{BookingCustomer, CreateBookingCommand, CreateBookingUseCase};
pub use assign::{AssignDecoratorCommand, AssignDecoratorUseCase};
pub use status::{UpdateBookingStatusCommand, UpdateBookingStatusUseCase};
pub use cancel::{CancelBookingCommand, CancelBookingUseCase};
