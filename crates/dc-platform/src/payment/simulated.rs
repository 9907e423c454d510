//! In-process checkout for development and tests
//!
//! Sessions live in memory. With auto-complete on, every session is paid the
//! moment it is created and the redirect URL points straight at the success
//! page, so the whole booking flow runs without a processor account.

use async_trait::async_trait;
use bson::oid::ObjectId;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::info;

use crate::payment::gateway::{
    CheckoutSession, CheckoutSessionRequest, CheckoutStatus, PaymentGateway, SessionOutcome,
    SESSION_ID_PLACEHOLDER,
};
use crate::shared::error::{PlatformError, Result};

pub struct SimulatedGateway {
    sessions: Mutex<HashMap<String, SessionOutcome>>,
    auto_complete: bool,
}

impl SimulatedGateway {
    /// Sessions are complete as soon as they are created
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            auto_complete: true,
        }
    }

    /// Sessions stay open until `complete` is called
    pub fn manual() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            auto_complete: false,
        }
    }

    /// Mark a session paid. Returns the payment intent id.
    pub fn complete(&self, session_id: &str) -> Result<String> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| PlatformError::not_found("Checkout Session", session_id))?;
        Ok(mark_paid(session))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn mark_paid(session: &mut SessionOutcome) -> String {
    let intent = session
        .payment_intent
        .get_or_insert_with(|| format!("pi_sim_{}", ObjectId::new().to_hex()))
        .clone();
    session.status = Some(CheckoutStatus::Complete);
    session.payment_status = Some("paid".to_string());
    intent
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn create_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession> {
        let id = format!("cs_sim_{}", ObjectId::new().to_hex());
        let item = &request.line_item;

        let mut outcome = SessionOutcome {
            id: id.clone(),
            status: Some(CheckoutStatus::Open),
            payment_status: Some("unpaid".to_string()),
            payment_intent: None,
            amount_total: Some(item.unit_amount * i64::from(item.quantity)),
            currency: Some(request.currency.clone()),
            customer_email: Some(request.customer_email.clone()),
            metadata: request.metadata.clone(),
        };
        if self.auto_complete {
            mark_paid(&mut outcome);
        }

        self.sessions.lock().insert(id.clone(), outcome);
        info!(session_id = %id, "Created simulated checkout session");

        let url = if self.auto_complete {
            request.success_url.replace(SESSION_ID_PLACEHOLDER, &id)
        } else {
            format!("https://checkout.invalid/pay/{}", id)
        };
        Ok(CheckoutSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionOutcome> {
        self.sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("Checkout Session", session_id))
    }
}
