//! Assign Decorator Use Case
//!
//! Two writes on two documents: the booking gets a snapshot of the decorator
//! and the decorator is marked busy. Both writes are plain `$set`s, so
//! re-sending the request after a partial failure converges.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::booking::entity::AssignedDecorator;
use crate::booking::repository::BookingRepository;
use crate::details;
use crate::shared::api_common::{non_blank, parse_object_id};
use crate::shared::error::PlatformError;
use crate::user::entity::WorkStatus;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult, Workflow};
use super::events::DecoratorAssigned;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignDecoratorCommand {
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub decorator_id: Option<String>,
}

pub struct AssignDecoratorUseCase {
    bookings: Arc<dyn BookingRepository>,
    users: Arc<dyn UserRepository>,
}

impl AssignDecoratorUseCase {
    pub fn new(bookings: Arc<dyn BookingRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { bookings, users }
    }

    pub async fn execute(
        &self,
        command: AssignDecoratorCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<DecoratorAssigned> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: AssignDecoratorCommand,
        ctx: ExecutionContext,
    ) -> Result<DecoratorAssigned, UseCaseError> {
        let booking_id = non_blank(command.booking_id.as_deref())
            .ok_or_else(|| UseCaseError::validation("BOOKING_ID_REQUIRED", "bookingId is required"))?;
        let decorator_id = non_blank(command.decorator_id.as_deref())
            .ok_or_else(|| UseCaseError::validation("DECORATOR_ID_REQUIRED", "decoratorId is required"))?;

        let booking_oid = parse_object_id(booking_id)?;
        let decorator_oid = parse_object_id(decorator_id)?;

        // The decorator is resolved first so an unknown id leaves the booking untouched
        let decorator = self.users.find_by_id(&decorator_oid).await?.ok_or_else(|| {
            UseCaseError::not_found_with_details(
                "DECORATOR_NOT_FOUND",
                format!("Decorator {} not found", decorator_id),
                details! { "decoratorId" => decorator_id },
            )
        })?;

        if self.bookings.find_by_id(&booking_oid).await?.is_none() {
            return Err(UseCaseError::not_found_with_details(
                "BOOKING_NOT_FOUND",
                format!("Booking {} not found", booking_id),
                details! { "bookingId" => booking_id },
            ));
        }

        let snapshot = AssignedDecorator {
            id: decorator_oid.to_hex(),
            name: decorator.name.clone(),
            email: decorator.email.clone(),
            phone: decorator.phone.clone(),
        };

        let mut workflow = Workflow::new("assign_decorator", &ctx);

        workflow
            .step("assign booking", async {
                match self.bookings.assign_decorator(&booking_oid, &snapshot).await? {
                    true => Ok(()),
                    false => Err(PlatformError::not_found("Booking", booking_oid.to_hex())),
                }
            })
            .await?;

        workflow
            .step("mark decorator busy", async {
                match self.users.set_work_status(&decorator_oid, WorkStatus::Busy).await? {
                    true => Ok(()),
                    false => Err(PlatformError::not_found("Decorator", decorator_oid.to_hex())),
                }
            })
            .await?;

        let steps = workflow.completed_steps().to_vec();
        workflow.finish();

        Ok(DecoratorAssigned {
            booking_id: booking_oid.to_hex(),
            decorator: snapshot,
            steps,
        })
    }
}
