//! Payments
//!
//! Hosted checkout through an external processor.

pub mod gateway;
pub mod stripe;
pub mod simulated;
pub mod operations;
pub mod api;

pub use gateway::{CheckoutSession, CheckoutSessionRequest, PaymentGateway, SessionOutcome};
pub use stripe::{StripeConfig, StripeGateway};
pub use simulated::SimulatedGateway;
pub use operations::CheckoutSettings;
pub use api::{payments_router, PaymentsState};
