//! Decora Platform
//!
//! Backend for a decoration booking marketplace:
//! - Decoration listings with category and name search
//! - Bookings, decorator assignment and the booking status workflow
//! - Hosted checkout with idempotent payment confirmation
//! - Decorator promotion requests and availability lookup
//! - Identity-provider bearer tokens and an admin role guard
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations

// Aggregates
pub mod user;
pub mod decoration;
pub mod booking;
pub mod promotion;
pub mod decorator;
pub mod payment;

// Authentication & authorization
pub mod auth;

// Shared infrastructure
pub mod shared;
pub mod app;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

// Re-export common types from shared
pub use shared::error::{PlatformError, Result};
pub use shared::stores::Repositories;
pub use app::{build_platform, PlatformApp, PlatformServices};

// Re-export use case infrastructure
pub use usecase::{ExecutionContext, UseCaseError, UseCaseResult, Workflow};

// Re-export main entity types for convenience
pub use user::entity::{User, UserRole, WorkStatus, WorkingDate};
pub use decoration::entity::Decoration;
pub use booking::entity::{AssignedDecorator, Booking, CustomerInfo};
pub use promotion::entity::{PromotionRequest, RequestStatus};

// Re-export repositories
pub use user::repository::UserRepository;
pub use decoration::repository::DecorationRepository;
pub use booking::repository::BookingRepository;
pub use promotion::repository::PromotionRequestRepository;

// Re-export services
pub use auth::{AuthContext, AuthorizationService, FirebaseTokenVerifier, IdentityVerifier, StaticTokenVerifier};
pub use payment::{CheckoutSettings, PaymentGateway, SimulatedGateway, StripeConfig, StripeGateway};
pub use seed::DevDataSeeder;
