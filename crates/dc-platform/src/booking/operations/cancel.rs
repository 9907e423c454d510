//! Cancel Booking Use Case
//!
//! Bookings are addressed by their payment transaction id. Cancelling only
//! flips the status; nothing is refunded through the gateway.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::booking::repository::BookingRepository;
use crate::details;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};
use super::events::BookingCancelled;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingCommand {
    pub transaction_id: String,
}

pub struct CancelBookingUseCase {
    bookings: Arc<dyn BookingRepository>,
}

impl CancelBookingUseCase {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn execute(
        &self,
        command: CancelBookingCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<BookingCancelled> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: CancelBookingCommand,
        ctx: ExecutionContext,
    ) -> Result<BookingCancelled, UseCaseError> {
        let transaction_id = command.transaction_id.trim();

        let not_found = || {
            UseCaseError::not_found_with_details(
                "BOOKING_NOT_FOUND",
                format!("No booking for transaction {}", transaction_id),
                details! { "transactionId" => transaction_id },
            )
        };

        let booking = match transaction_id.is_empty() {
            true => None,
            false => self.bookings.find_by_transaction_id(transaction_id).await?,
        }
        .ok_or_else(not_found)?;

        if !self.bookings.cancel_by_transaction_id(transaction_id).await? {
            return Err(not_found());
        }

        info!(
            booking_id = %booking.id_hex(),
            transaction_id = %transaction_id,
            cancelled_by = %ctx.principal_id,
            "Booking cancelled"
        );

        Ok(BookingCancelled {
            booking_id: booking.id_hex(),
            transaction_id: transaction_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use crate::booking::entity::{status, Booking, BookingSlot};
    use crate::shared::in_memory::InMemoryBookingRepository;

    async fn seeded() -> Arc<InMemoryBookingRepository> {
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let mut booking = Booking::new(
            BookingSlot {
                customer_email: "c@example.com".into(),
                decoration_id: ObjectId::new().to_hex(),
                booking_date: "2025-12-20".into(),
                start_time: "10:00".into(),
                end_time: "12:00".into(),
            },
            None,
        );
        booking.transaction_id = Some("pi_123".into());
        bookings.insert(&booking).await.unwrap();
        bookings
    }

    #[tokio::test]
    async fn test_cancel_by_transaction_id() {
        let bookings = seeded().await;
        let use_case = CancelBookingUseCase::new(bookings.clone());

        let cancelled = use_case
            .execute(
                CancelBookingCommand { transaction_id: "pi_123".into() },
                ExecutionContext::create("c@example.com"),
            )
            .await
            .unwrap();
        assert_eq!(cancelled.transaction_id, "pi_123");

        let booking = bookings.find_by_transaction_id("pi_123").await.unwrap().unwrap();
        assert_eq!(booking.status, status::CANCELLED);
        assert!(booking.cancelled_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_transaction_is_not_found() {
        let use_case = CancelBookingUseCase::new(seeded().await);
        let err = use_case
            .execute(
                CancelBookingCommand { transaction_id: "pi_missing".into() },
                ExecutionContext::anonymous(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "BOOKING_NOT_FOUND");
    }
}
