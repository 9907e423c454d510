//! Update Booking Status Use Case
//!
//! Transitions are open: any non-blank status replaces the current one.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::booking::repository::BookingRepository;
use crate::details;
use crate::shared::api_common::{non_blank, parse_object_id};
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};
use super::events::BookingStatusChanged;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusCommand {
    /// Taken from the path
    #[serde(skip)]
    pub booking_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

pub struct UpdateBookingStatusUseCase {
    bookings: Arc<dyn BookingRepository>,
}

impl UpdateBookingStatusUseCase {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn execute(
        &self,
        command: UpdateBookingStatusCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<BookingStatusChanged> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: UpdateBookingStatusCommand,
        ctx: ExecutionContext,
    ) -> Result<BookingStatusChanged, UseCaseError> {
        let status = non_blank(command.status.as_deref())
            .ok_or_else(|| UseCaseError::validation("STATUS_REQUIRED", "Status is required"))?
            .to_string();

        let id = parse_object_id(&command.booking_id)?;

        if !self.bookings.update_status(&id, &status).await? {
            return Err(UseCaseError::not_found_with_details(
                "BOOKING_NOT_FOUND",
                format!("Booking {} not found", command.booking_id),
                details! { "bookingId" => &command.booking_id },
            ));
        }

        info!(
            booking_id = %id,
            status = %status,
            changed_by = %ctx.principal_id,
            "Booking status updated"
        );

        Ok(BookingStatusChanged {
            booking_id: id.to_hex(),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use crate::booking::entity::{status, Booking, BookingSlot};
    use crate::shared::in_memory::InMemoryBookingRepository;

    async fn seeded() -> (Arc<InMemoryBookingRepository>, ObjectId) {
        let bookings = Arc::new(InMemoryBookingRepository::new());
        let booking = Booking::new(
            BookingSlot {
                customer_email: "c@example.com".into(),
                decoration_id: ObjectId::new().to_hex(),
                booking_date: "2025-12-20".into(),
                start_time: "10:00".into(),
                end_time: "12:00".into(),
            },
            None,
        );
        let id = bookings.insert(&booking).await.unwrap();
        (bookings, id)
    }

    fn command(id: &ObjectId, status: &str) -> UpdateBookingStatusCommand {
        UpdateBookingStatusCommand {
            booking_id: id.to_hex(),
            status: Some(status.into()),
        }
    }

    #[tokio::test]
    async fn test_any_transition_is_accepted() {
        let (bookings, id) = seeded().await;
        let use_case = UpdateBookingStatusUseCase::new(bookings.clone());

        use_case.execute(command(&id, status::COMPLETED), ExecutionContext::anonymous()).await.unwrap();
        use_case.execute(command(&id, status::PENDING), ExecutionContext::anonymous()).await.unwrap();

        let booking = bookings.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(booking.status, status::PENDING);
        assert!(booking.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_blank_status_is_rejected() {
        let (bookings, id) = seeded().await;
        let use_case = UpdateBookingStatusUseCase::new(bookings);
        let err = use_case.execute(command(&id, "  "), ExecutionContext::anonymous()).await.unwrap_err();
        assert_eq!(err.code(), "STATUS_REQUIRED");
    }

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let (bookings, _) = seeded().await;
        let use_case = UpdateBookingStatusUseCase::new(bookings);
        let err = use_case
            .execute(command(&ObjectId::new(), status::IN_PROGRESS), ExecutionContext::anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }
}
