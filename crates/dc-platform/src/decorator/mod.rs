//! Decorators
//!
//! Read-side queries over users holding the decorator role.

pub mod availability;
pub mod api;

pub use availability::{calendar_date, working_day, AvailableDecorators, FindAvailableDecoratorsQuery};
pub use api::{decorators_router, DecoratorsState};
