//! Create Checkout Session Use Case
//!
//! Opens a hosted checkout for one decoration. The booking details travel as
//! session metadata and come back when the payment is confirmed.

use std::collections::BTreeMap;
use std::sync::Arc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::details;
use crate::payment::gateway::{
    to_minor_units, CheckoutSessionRequest, LineItem, PaymentGateway, SESSION_ID_PLACEHOLDER,
};
use crate::shared::api_common::non_blank;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

const DEFAULT_ITEM_NAME: &str = "Decoration booking";

/// Where checkout redirects and which currency it charges in
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    /// Frontend origin, e.g. `https://decora.example.com`
    pub client_domain: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CheckoutCustomer {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Price as a JSON number or a numeric string; a blank string is no price
mod lenient_price {
    use std::str::FromStr;
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float_option::serialize(value, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        match Option::<Price>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Price::Number(value)) => Ok(Some(value)),
            Some(Price::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(Price::Text(text)) => Decimal::from_str(text.trim())
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid price {:?}: {}", text, e))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionCommand {
    #[serde(default)]
    pub decoration_id: Option<String>,
    /// Listing name shown on the checkout page
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Major units
    #[serde(default, with = "lenient_price")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub customer: Option<CheckoutCustomer>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CreateCheckoutSessionCommand {
    fn customer_email(&self) -> Option<&str> {
        non_blank(self.customer.as_ref().and_then(|c| c.email.as_deref()))
    }

    /// Booking fields carried through the processor. Blank values are left out.
    fn metadata(&self) -> BTreeMap<String, String> {
        let customer_name = self.customer.as_ref().and_then(|c| c.name.as_deref());
        [
            ("decorationId", self.decoration_id.as_deref()),
            ("decorationName", self.name.as_deref()),
            ("category", self.category.as_deref()),
            ("customerEmail", self.customer_email()),
            ("customerName", customer_name),
            ("bookingDate", self.booking_date.as_deref()),
            ("startTime", self.start_time.as_deref()),
            ("endTime", self.end_time.as_deref()),
            ("division", self.division.as_deref()),
            ("district", self.district.as_deref()),
            ("phone", self.phone.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| non_blank(value).map(|v| (key.to_string(), v.to_string())))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStarted {
    pub session_id: String,
    pub url: String,
}

pub struct CreateCheckoutSessionUseCase {
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl CreateCheckoutSessionUseCase {
    pub fn new(gateway: Arc<dyn PaymentGateway>, settings: CheckoutSettings) -> Self {
        Self { gateway, settings }
    }

    pub async fn execute(
        &self,
        command: CreateCheckoutSessionCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CheckoutStarted> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: CreateCheckoutSessionCommand,
        ctx: ExecutionContext,
    ) -> Result<CheckoutStarted, UseCaseError> {
        let decoration_id = non_blank(command.decoration_id.as_deref())
            .ok_or_else(|| UseCaseError::validation("DECORATION_ID_REQUIRED", "decorationId is required"))?;

        let customer_email = command.customer_email().ok_or_else(|| {
            UseCaseError::validation("CUSTOMER_EMAIL_REQUIRED", "customer.email is required")
        })?;

        let price = command
            .price
            .ok_or_else(|| UseCaseError::validation("PRICE_REQUIRED", "price is required"))?;
        if price.is_sign_negative() {
            return Err(UseCaseError::validation_with_details(
                "INVALID_PRICE",
                "Price must not be negative",
                details! { "price" => price.to_string() },
            ));
        }
        let unit_amount = to_minor_units(price).ok_or_else(|| {
            UseCaseError::validation("INVALID_PRICE", "Price is too large to charge")
        })?;

        let quantity = command.quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(UseCaseError::validation("INVALID_QUANTITY", "Quantity must be at least 1"));
        }

        let domain = self.settings.client_domain.trim_end_matches('/');
        let request = CheckoutSessionRequest {
            line_item: LineItem {
                name: non_blank(command.name.as_deref())
                    .unwrap_or(DEFAULT_ITEM_NAME)
                    .to_string(),
                description: non_blank(command.description.as_deref()).map(str::to_string),
                unit_amount,
                quantity,
            },
            currency: self.settings.currency.to_lowercase(),
            customer_email: customer_email.to_string(),
            metadata: command.metadata(),
            success_url: format!("{}/payment-success?session_id={}", domain, SESSION_ID_PLACEHOLDER),
            cancel_url: format!("{}/decorations/{}", domain, decoration_id),
        };

        let session = self.gateway.create_session(&request).await?;

        info!(
            session_id = %session.id,
            decoration_id = %decoration_id,
            email = %customer_email,
            unit_amount,
            execution_id = %ctx.execution_id,
            "Checkout session created"
        );

        Ok(CheckoutStarted {
            session_id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::simulated::SimulatedGateway;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            currency: "BDT".into(),
            client_domain: "https://decora.example.com/".into(),
        }
    }

    fn command() -> CreateCheckoutSessionCommand {
        CreateCheckoutSessionCommand {
            decoration_id: Some("64b7f0c2a1b2c3d4e5f60718".into()),
            name: Some("Wedding Stage".into()),
            price: Some(Decimal::new(150050, 2)),
            customer: Some(CheckoutCustomer {
                email: Some("c@example.com".into()),
                name: Some("Customer".into()),
            }),
            booking_date: Some("2025-12-20".into()),
            start_time: Some("10:00".into()),
            end_time: Some("12:00".into()),
            district: Some("  ".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_session_carries_amount_and_metadata() {
        let gateway = Arc::new(SimulatedGateway::manual());
        let use_case = CreateCheckoutSessionUseCase::new(gateway.clone(), settings());

        let started = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        let session = gateway.retrieve_session(&started.session_id).await.unwrap();

        assert_eq!(session.amount_total, Some(150_050));
        assert_eq!(session.currency.as_deref(), Some("bdt"));
        assert_eq!(session.metadata_value("decorationId"), Some("64b7f0c2a1b2c3d4e5f60718"));
        assert_eq!(session.metadata_value("customerEmail"), Some("c@example.com"));
        assert!(!session.metadata.contains_key("district"));
    }

    #[tokio::test]
    async fn test_success_url_points_back_to_client() {
        let use_case = CreateCheckoutSessionUseCase::new(Arc::new(SimulatedGateway::new()), settings());
        let started = use_case.execute(command(), ExecutionContext::anonymous()).await.unwrap();
        assert_eq!(
            started.url,
            format!("https://decora.example.com/payment-success?session_id={}", started.session_id)
        );
    }

    #[test]
    fn test_price_accepts_number_or_numeric_string() {
        let parse = |price: serde_json::Value| {
            serde_json::from_value::<CreateCheckoutSessionCommand>(serde_json::json!({ "price": price }))
                .map(|cmd| cmd.price)
        };

        assert_eq!(parse(serde_json::json!(1500)).unwrap(), Some(Decimal::new(1500, 0)));
        assert_eq!(parse(serde_json::json!(1500.5)).unwrap(), Some(Decimal::new(15005, 1)));
        assert_eq!(parse(serde_json::json!("1500")).unwrap(), Some(Decimal::new(1500, 0)));
        assert_eq!(parse(serde_json::json!(" 12.75 ")).unwrap(), Some(Decimal::new(1275, 2)));
        assert_eq!(parse(serde_json::json!("")).unwrap(), None);
        assert_eq!(parse(serde_json::Value::Null).unwrap(), None);
        assert!(parse(serde_json::json!("fifteen hundred")).is_err());
    }

    #[tokio::test]
    async fn test_negative_price_is_rejected() {
        let use_case = CreateCheckoutSessionUseCase::new(Arc::new(SimulatedGateway::new()), settings());
        let mut cmd = command();
        cmd.price = Some(Decimal::new(-1, 0));
        let err = use_case.execute(cmd, ExecutionContext::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_PRICE");
    }

    #[tokio::test]
    async fn test_customer_email_is_required() {
        let gateway = Arc::new(SimulatedGateway::new());
        let use_case = CreateCheckoutSessionUseCase::new(gateway.clone(), settings());
        let mut cmd = command();
        cmd.customer = None;
        let err = use_case.execute(cmd, ExecutionContext::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), "CUSTOMER_EMAIL_REQUIRED");
        assert_eq!(gateway.session_count(), 0);
    }
}
