//! Payment Operations

pub mod checkout;
pub mod confirm;

pub use checkout::{
    CheckoutCustomer, CheckoutSettings, CheckoutStarted, CreateCheckoutSessionCommand,
    CreateCheckoutSessionUseCase,
};
pub use confirm::{ConfirmPaymentCommand, ConfirmPaymentUseCase, PaymentConfirmed};
