//! Create Booking Use Case
//!
//! Direct booking without a checkout session. The duplicate guard is a point
//! lookup on the exact slot, checked before the insert.

use std::sync::Arc;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::booking::entity::{Booking, BookingSlot};
use crate::booking::repository::BookingRepository;
use crate::details;
use crate::shared::api_common::non_blank;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};
use super::events::BookingCreated;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingCustomer {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Command for booking a decoration for a date and time window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingCommand {
    #[serde(default)]
    pub decoration_id: Option<String>,
    #[serde(default)]
    pub decoration_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub user_info: Option<BookingCustomer>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CreateBookingCommand {
    fn customer_email(&self) -> Option<&str> {
        non_blank(self.user_info.as_ref().and_then(|u| u.user_email.as_deref()))
    }

    /// Names of required fields that are missing or blank
    fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            ("decorationId", non_blank(self.decoration_id.as_deref())),
            ("bookingDate", non_blank(self.booking_date.as_deref())),
            ("startTime", non_blank(self.start_time.as_deref())),
            ("endTime", non_blank(self.end_time.as_deref())),
            ("userInfo.userEmail", self.customer_email()),
        ];
        required
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| field)
            .collect()
    }
}

pub struct CreateBookingUseCase {
    bookings: Arc<dyn BookingRepository>,
}

impl CreateBookingUseCase {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn execute(
        &self,
        command: CreateBookingCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<BookingCreated> {
        self.run(command, ctx).await.into()
    }

    async fn run(
        &self,
        command: CreateBookingCommand,
        ctx: ExecutionContext,
    ) -> Result<BookingCreated, UseCaseError> {
        // Validation: every slot field and the customer email are required
        let missing = command.missing_fields();
        if !missing.is_empty() {
            return Err(UseCaseError::validation_with_details(
                "MISSING_FIELDS",
                format!("Missing required fields: {}", missing.join(", ")),
                details! { "missing" => missing },
            ));
        }

        if command.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(UseCaseError::validation("INVALID_PRICE", "Price must not be negative"));
        }

        let text = |value: &Option<String>| non_blank(value.as_deref()).map(str::to_string);
        let slot = BookingSlot {
            customer_email: command.customer_email().map(str::to_string).unwrap_or_default(),
            decoration_id: text(&command.decoration_id).unwrap_or_default(),
            booking_date: text(&command.booking_date).unwrap_or_default(),
            start_time: text(&command.start_time).unwrap_or_default(),
            end_time: text(&command.end_time).unwrap_or_default(),
        };

        // Business rule: one booking per customer, decoration and window
        if self.bookings.find_by_slot(&slot).await?.is_some() {
            return Err(UseCaseError::business_rule_with_details(
                "BOOKING_EXISTS",
                "Already booked this decoration",
                details! {
                    "decorationId" => &slot.decoration_id,
                    "bookingDate" => &slot.booking_date,
                },
            ));
        }

        let customer_name = command
            .user_info
            .as_ref()
            .and_then(|u| non_blank(u.user_name.as_deref()))
            .map(str::to_string);

        let mut booking = Booking::new(slot, customer_name);
        booking.decoration_name = text(&command.decoration_name);
        booking.category = text(&command.category);
        booking.price = command.price;
        booking.division = text(&command.division);
        booking.district = text(&command.district);
        booking.phone = text(&command.phone);
        booking.booked_at = Some(Utc::now());

        let id = self.bookings.insert(&booking).await?;

        info!(
            booking_id = %id,
            email = %booking.customer.email,
            decoration_id = %booking.decoration_id,
            execution_id = %ctx.execution_id,
            "Booking created"
        );

        Ok(BookingCreated {
            booking_id: id.to_hex(),
            customer_email: booking.customer.email,
            decoration_id: booking.decoration_id,
        })
    }
}
