//! Shared Module
//!
//! Cross-cutting concerns and shared utilities.

pub mod error;
pub mod middleware;
pub mod api_common;
pub mod indexes;
pub mod in_memory;
pub mod stores;

// APIs
pub mod health_api;

// Re-export commonly used items
pub use error::{PlatformError, Result};
pub use middleware::{AdminOnly, AppState, Authenticated, AuthLayer};
pub use api_common::{CreatedResponse, SuccessResponse};
pub use health_api::{health_router, HealthState};
pub use indexes::initialize_indexes;
pub use stores::Repositories;
