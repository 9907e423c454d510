//! Confirm Payment Use Case
//!
//! The client calls this when the processor redirects back, and may call it
//! again on reload. A booking is inserted only for a complete session whose
//! listing exists and whose payment intent has no booking yet. Every other
//! case, including losing the insert race on the unique `transactionId`
//! index, is a successful no-op.

use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::booking::entity::{Booking, BookingSlot};
use crate::booking::repository::BookingRepository;
use crate::decoration::repository::DecorationRepository;
use crate::payment::gateway::{from_minor_units, PaymentGateway, SessionOutcome};
use crate::shared::api_common::{non_blank, parse_object_id};
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentCommand {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmed {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    /// False when the call changed nothing
    pub created: bool,
}

impl PaymentConfirmed {
    fn unchanged(transaction_id: Option<String>, booking_id: Option<String>) -> Self {
        Self {
            success: true,
            transaction_id,
            booking_id,
            created: false,
        }
    }
}

pub struct ConfirmPaymentUseCase {
    gateway: Arc<dyn PaymentGateway>,
    decorations: Arc<dyn DecorationRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ConfirmPaymentUseCase {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        decorations: Arc<dyn DecorationRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            gateway,
            decorations,
            bookings,
        }
    }

    pub async fn execute(
        &self,
        command: ConfirmPaymentCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PaymentConfirmed> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: ConfirmPaymentCommand,
        ctx: ExecutionContext,
    ) -> Result<PaymentConfirmed, UseCaseError> {
        let session_id = non_blank(command.session_id.as_deref())
            .ok_or_else(|| UseCaseError::not_found("SESSION_NOT_FOUND", "sessionId is required"))?;

        let session = self.gateway.retrieve_session(session_id).await?;

        if !session.is_complete() {
            info!(session_id, status = ?session.status, "Checkout session not complete, nothing to book");
            return Ok(PaymentConfirmed::unchanged(None, None));
        }

        let Some(transaction_id) = non_blank(session.payment_intent.as_deref()).map(str::to_string) else {
            warn!(session_id, "Complete checkout session has no payment intent");
            return Ok(PaymentConfirmed::unchanged(None, None));
        };

        if let Some(existing) = self.bookings.find_by_transaction_id(&transaction_id).await? {
            info!(transaction_id = %transaction_id, booking_id = %existing.id_hex(), "Payment already confirmed");
            return Ok(PaymentConfirmed::unchanged(Some(transaction_id), Some(existing.id_hex())));
        }

        let listing = match session.metadata_value("decorationId").map(parse_object_id) {
            Some(Ok(id)) => self.decorations.find_by_id(&id).await?,
            _ => None,
        };
        let Some(listing) = listing else {
            warn!(session_id, transaction_id = %transaction_id, "Paid session references no known decoration");
            return Ok(PaymentConfirmed::unchanged(Some(transaction_id), None));
        };

        let Some(mut booking) = booking_from_session(&session, &transaction_id, listing.id_hex()) else {
            warn!(session_id, transaction_id = %transaction_id, "Paid session carries no customer email");
            return Ok(PaymentConfirmed::unchanged(Some(transaction_id), None));
        };
        booking.decoration_name = Some(listing.name.clone());
        booking.category = non_blank(Some(listing.category.as_str())).map(str::to_string);

        match self.bookings.insert(&booking).await {
            Ok(id) => {
                info!(
                    booking_id = %id,
                    transaction_id = %transaction_id,
                    email = %booking.customer.email,
                    execution_id = %ctx.execution_id,
                    "Booking created from confirmed payment"
                );
                Ok(PaymentConfirmed {
                    success: true,
                    transaction_id: Some(transaction_id),
                    booking_id: Some(id.to_hex()),
                    created: true,
                })
            }
            Err(e) if e.is_duplicate_key() => {
                info!(transaction_id = %transaction_id, "Concurrent confirmation already stored this payment");
                let existing = self.bookings.find_by_transaction_id(&transaction_id).await?;
                Ok(PaymentConfirmed::unchanged(
                    Some(transaction_id),
                    existing.map(|b| b.id_hex()),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Booking described by the session metadata, priced at the captured amount
fn booking_from_session(session: &SessionOutcome, transaction_id: &str, decoration_id: String) -> Option<Booking> {
    let customer_email = session
        .metadata_value("customerEmail")
        .or_else(|| non_blank(session.customer_email.as_deref()))?;
    let field = |key: &str| session.metadata_value(key).map(str::to_string);

    let slot = BookingSlot {
        customer_email: customer_email.to_string(),
        decoration_id,
        booking_date: field("bookingDate").unwrap_or_default(),
        start_time: field("startTime").unwrap_or_default(),
        end_time: field("endTime").unwrap_or_default(),
    };

    let mut booking = Booking::new(slot, field("customerName"));
    booking.transaction_id = Some(transaction_id.to_string());
    booking.price = session.amount_total.map(from_minor_units);
    booking.division = field("division");
    booking.district = field("district");
    booking.phone = field("phone");
    booking.booked_at = Some(Utc::now());
    Some(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use crate::decoration::entity::Decoration;
    use crate::payment::operations::{CheckoutCustomer, CheckoutSettings, CreateCheckoutSessionCommand, CreateCheckoutSessionUseCase};
    use crate::payment::simulated::SimulatedGateway;
    use crate::shared::in_memory::{InMemoryBookingRepository, InMemoryDecorationRepository};

    struct Fixture {
        gateway: Arc<SimulatedGateway>,
        bookings: Arc<InMemoryBookingRepository>,
        confirm: ConfirmPaymentUseCase,
        decoration_id: String,
    }

    async fn fixture(gateway: SimulatedGateway) -> Fixture {
        let gateway = Arc::new(gateway);
        let decorations = Arc::new(InMemoryDecorationRepository::new());
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let decoration_id = decorations
            .insert(&Decoration::new("Wedding Stage", "wedding", Decimal::new(1500, 0)))
            .await
            .unwrap()
            .to_hex();
        let confirm = ConfirmPaymentUseCase::new(gateway.clone(), decorations, bookings.clone());
        Fixture { gateway, bookings, confirm, decoration_id }
    }

    async fn open_session(fx: &Fixture, decoration_id: &str, price: Decimal) -> String {
        let checkout = CreateCheckoutSessionUseCase::new(
            fx.gateway.clone(),
            CheckoutSettings {
                currency: "bdt".into(),
                client_domain: "http://localhost:5173".into(),
            },
        );
        let command = CreateCheckoutSessionCommand {
            decoration_id: Some(decoration_id.to_string()),
            name: Some("Wedding Stage".into()),
            price: Some(price),
            customer: Some(CheckoutCustomer {
                email: Some("c@example.com".into()),
                name: None,
            }),
            booking_date: Some("2025-12-20".into()),
            start_time: Some("10:00".into()),
            end_time: Some("12:00".into()),
            ..Default::default()
        };
        checkout.execute(command, ExecutionContext::anonymous()).await.unwrap().session_id
    }

    fn confirm_command(session_id: &str) -> ConfirmPaymentCommand {
        ConfirmPaymentCommand { session_id: Some(session_id.to_string()) }
    }

    #[tokio::test]
    async fn test_confirming_twice_inserts_one_booking() {
        let fx = fixture(SimulatedGateway::new()).await;
        let session_id = open_session(&fx, &fx.decoration_id, Decimal::new(120075, 2)).await;

        let first = fx.confirm.execute(confirm_command(&session_id), ExecutionContext::anonymous()).await.unwrap();
        let second = fx.confirm.execute(confirm_command(&session_id), ExecutionContext::anonymous()).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.booking_id, second.booking_id);

        let stored = fx.bookings.find_by_customer("c@example.com").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].price, Some(Decimal::new(120075, 2)));
        assert_eq!(stored[0].decoration_name.as_deref(), Some("Wedding Stage"));
        assert_eq!(stored[0].transaction_id, first.transaction_id);
    }

    #[tokio::test]
    async fn test_open_session_is_a_no_op() {
        let fx = fixture(SimulatedGateway::manual()).await;
        let session_id = open_session(&fx, &fx.decoration_id, Decimal::new(100, 0)).await;

        let result = fx.confirm.execute(confirm_command(&session_id), ExecutionContext::anonymous()).await.unwrap();
        assert!(result.success);
        assert!(!result.created);

        fx.gateway.complete(&session_id).unwrap();
        let result = fx.confirm.execute(confirm_command(&session_id), ExecutionContext::anonymous()).await.unwrap();
        assert!(result.created);
    }

    #[tokio::test]
    async fn test_unknown_listing_is_a_no_op() {
        let fx = fixture(SimulatedGateway::new()).await;
        let session_id = open_session(&fx, &bson::oid::ObjectId::new().to_hex(), Decimal::new(100, 0)).await;

        let result = fx.confirm.execute(confirm_command(&session_id), ExecutionContext::anonymous()).await.unwrap();
        assert!(!result.created);
        assert!(fx.bookings.find_by_customer("c@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_id_is_not_found() {
        let fx = fixture(SimulatedGateway::new()).await;
        let err = fx
            .confirm
            .execute(ConfirmPaymentCommand::default(), ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let fx = fixture(SimulatedGateway::new()).await;
        let err = fx
            .confirm
            .execute(confirm_command("cs_missing"), ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CHECKOUT_SESSION_NOT_FOUND");
    }
}
