//! User Aggregate
//!
//! Customers, decorators and admins.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{ContactDetails, User, UserRole, WorkStatus, WorkingDate};
pub use repository::{LoginOutcome, MongoUserRepository, UserRepository};
pub use api::{users_router, UserResponse, UsersState};
