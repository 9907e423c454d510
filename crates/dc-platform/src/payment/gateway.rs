//! Payment Gateway
//!
//! Hosted checkout: the server opens a session, the customer pays on the
//! processor's page and is redirected back with the session id, and the
//! server then reads the session to learn whether payment completed.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::shared::error::Result;

/// Placeholder the processor substitutes with the real session id in the
/// success redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub description: Option<String>,
    /// Price per unit in minor currency units (cents)
    pub unit_amount: i64,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub line_item: LineItem,
    /// ISO code, lowercase
    pub currency: String,
    pub customer_email: String,
    /// Opaque key/value pairs returned unchanged when the session is read
    pub metadata: BTreeMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted page to redirect the customer to
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Open,
    Complete,
    Expired,
}

/// State of a checkout session as reported by the processor
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub id: String,
    pub status: Option<CheckoutStatus>,
    pub payment_status: Option<String>,
    /// Payment intent id; used as the booking's transaction id
    pub payment_intent: Option<String>,
    /// Captured amount in minor units
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl SessionOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == Some(CheckoutStatus::Complete)
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession>;

    /// Fails with `PlatformError::NotFound` for an unknown session id
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionOutcome>;
}

/// Major units to minor units, rounding half away from zero.
/// `None` when the amount does not fit in an i64.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

pub fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}
