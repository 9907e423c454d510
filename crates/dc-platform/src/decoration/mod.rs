//! Decoration Aggregate
//!
//! Bookable service listings.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{Decoration, DecorationFilter};
pub use repository::{DecorationRepository, MongoDecorationRepository};
pub use api::{decorations_router, DecorationsState};
