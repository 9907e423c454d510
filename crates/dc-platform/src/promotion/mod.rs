//! Promotion Request Aggregate
//!
//! Applications from customers who want to work as decorators.

pub mod entity;
pub mod repository;
pub mod operations;
pub mod api;

pub use entity::{PromotionRequest, RequestStatus};
pub use repository::{MongoPromotionRequestRepository, PromotionRequestRepository};
pub use api::{promotion_requests_router, PromotionRequestsState};
