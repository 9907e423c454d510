//! Stripe Checkout
//!
//! Talks to the Stripe REST API directly: form-encoded requests, JSON
//! responses, secret key as bearer credential.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::payment::gateway::{
    CheckoutSession, CheckoutSessionRequest, CheckoutStatus, PaymentGateway, SessionOutcome,
};
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// `https://api.stripe.com` unless pointed at a mock
    pub api_base: String,
    pub timeout: Duration,
}

pub struct StripeGateway {
    http_client: reqwest::Client,
    config: StripeConfig,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<CheckoutStatus>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl From<StripeSession> for SessionOutcome {
    fn from(session: StripeSession) -> Self {
        let customer_email = session.customer_email.or_else(|| {
            session.customer_details.and_then(|details| details.email)
        });
        Self {
            id: session.id,
            status: session.status,
            payment_status: session.payment_status,
            payment_intent: session.payment_intent,
            amount_total: session.amount_total,
            currency: session.currency,
            customer_email,
            metadata: session.metadata,
        }
    }
}

/// Flatten a session request into Stripe's bracketed form fields
fn session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let item = &request.line_item;
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("line_items[0][price_data][currency]".to_string(), request.currency.clone()),
        ("line_items[0][price_data][unit_amount]".to_string(), item.unit_amount.to_string()),
        ("line_items[0][price_data][product_data][name]".to_string(), item.name.clone()),
        ("line_items[0][quantity]".to_string(), item.quantity.to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        form.push((
            "line_items[0][price_data][product_data][description]".to_string(),
            description.to_string(),
        ));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }

    form
}

/// Stripe object ids are `prefix_` plus alphanumerics; anything else would
/// change the request path
fn is_session_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlatformError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http_client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    async fn read_session(&self, response: reqwest::Response, session_id: &str) -> Result<StripeSession> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::not_found("Checkout Session", session_id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or(body);
            warn!(status = %status, error = %message, "Stripe request failed");
            return Err(PlatformError::gateway(format!("Stripe returned {}: {}", status, message)));
        }

        response.json().await.map_err(|e| {
            PlatformError::gateway(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession> {
        let response = self
            .http_client
            .post(self.endpoint("checkout/sessions"))
            .bearer_auth(&self.config.secret_key)
            .form(&session_form(request))
            .send()
            .await
            .map_err(|e| PlatformError::gateway(format!("Stripe request failed: {}", e)))?;

        let session = self.read_session(response, "new").await?;
        debug!(session_id = %session.id, "Created Stripe checkout session");

        let url = session.url.ok_or_else(|| {
            PlatformError::gateway("Stripe checkout session has no redirect URL")
        })?;
        Ok(CheckoutSession { id: session.id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionOutcome> {
        if !is_session_id(session_id) {
            warn!(session_id = %session_id, "Rejecting malformed checkout session id");
            return Err(PlatformError::not_found("Checkout Session", session_id));
        }

        let response = self
            .http_client
            .get(self.endpoint(&format!("checkout/sessions/{}", session_id)))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| PlatformError::gateway(format!("Stripe request failed: {}", e)))?;

        let session = self.read_session(response, session_id).await?;
        Ok(session.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::gateway::LineItem;

    fn request() -> CheckoutSessionRequest {
        let mut metadata = BTreeMap::new();
        metadata.insert("decorationId".to_string(), "64b7f0c2a1b2c3d4e5f60718".to_string());
        metadata.insert("bookingDate".to_string(), "2025-12-20".to_string());
        CheckoutSessionRequest {
            line_item: LineItem {
                name: "Wedding Stage".into(),
                description: Some("Full stage setup".into()),
                unit_amount: 150_000,
                quantity: 1,
            },
            currency: "usd".into(),
            customer_email: "c@example.com".into(),
            metadata,
            success_url: "http://localhost:5173/payment-success?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "http://localhost:5173/decorations/64b7f0c2a1b2c3d4e5f60718".into(),
        }
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_session_form_fields() {
        let form = session_form(&request());
        assert_eq!(field(&form, "mode"), Some("payment"));
        assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), Some("150000"));
        assert_eq!(field(&form, "line_items[0][price_data][product_data][description]"), Some("Full stage setup"));
        assert_eq!(field(&form, "line_items[0][quantity]"), Some("1"));
        assert_eq!(field(&form, "metadata[decorationId]"), Some("64b7f0c2a1b2c3d4e5f60718"));
        assert_eq!(field(&form, "metadata[bookingDate]"), Some("2025-12-20"));
    }

    #[test]
    fn test_blank_description_is_omitted() {
        let mut req = request();
        req.line_item.description = Some("  ".into());
        let form = session_form(&req);
        assert_eq!(field(&form, "line_items[0][price_data][product_data][description]"), None);
    }

    #[test]
    fn test_session_outcome_falls_back_to_customer_details() {
        let session: StripeSession = serde_json::from_value(serde_json::json!({
            "id": "cs_test_1",
            "status": "complete",
            "payment_status": "paid",
            "payment_intent": "pi_123",
            "amount_total": 150000,
            "currency": "usd",
            "customer_email": null,
            "customer_details": { "email": "c@example.com" },
            "metadata": { "decorationId": "abc" }
        }))
        .unwrap();

        let outcome: SessionOutcome = session.into();
        assert!(outcome.is_complete());
        assert_eq!(outcome.customer_email.as_deref(), Some("c@example.com"));
        assert_eq!(outcome.payment_intent.as_deref(), Some("pi_123"));
        assert_eq!(outcome.metadata_value("decorationId"), Some("abc"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = StripeGateway::new(StripeConfig {
            secret_key: "sk_test".into(),
            api_base: "http://localhost:12111/".into(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(gateway.endpoint("checkout/sessions"), "http://localhost:12111/v1/checkout/sessions");
    }

    #[tokio::test]
    async fn test_malformed_session_id_is_not_found_without_a_request() {
        let gateway = StripeGateway::new(StripeConfig {
            secret_key: "sk_test".into(),
            api_base: "http://127.0.0.1:9".into(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();

        for session_id in ["cs_x/../../customers", "cs_x?expand[]=customer", "cs x", ""] {
            let err = gateway.retrieve_session(session_id).await.unwrap_err();
            assert!(matches!(err, PlatformError::NotFound { .. }), "{session_id}: {err:?}");
        }
        assert!(is_session_id("cs_test_a1B2c3"));
    }
}
