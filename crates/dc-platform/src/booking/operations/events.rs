//! Booking Outcomes
//!
//! What each booking use case reports back to its caller.

use serde::Serialize;
use utoipa::ToSchema;

use crate::booking::entity::AssignedDecorator;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub booking_id: String,
    pub customer_email: String,
    pub decoration_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecoratorAssigned {
    pub booking_id: String,
    pub decorator: AssignedDecorator,
    /// Writes applied, in order
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusChanged {
    pub booking_id: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingCancelled {
    pub booking_id: String,
    pub transaction_id: String,
}
