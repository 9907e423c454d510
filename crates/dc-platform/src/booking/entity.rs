//! Booking Entity
//!
//! A customer's reservation of a decoration service for a date and time
//! window. Bookings are never hard-deleted; cancellation is a status.

use bson::oid::ObjectId;
use bson::serde_helpers::{chrono_datetime_as_bson_datetime, chrono_datetime_as_bson_datetime_optional};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status values. Stored as free strings so older documents with other
/// spellings still load.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const DECORATOR_ASSIGNED: &str = "Decorator-assigned";
    pub const IN_PROGRESS: &str = "in-progress";
    pub const COMPLETED: &str = "completed";
    pub const CANCELLED: &str = "cancelled";
}

pub const PAYMENT_PAID: &str = "paid";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Snapshot of the decorator taken at assignment time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AssignedDecorator {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub decoration_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoration_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Payment intent id; absent for bookings created without checkout so the
    /// sparse unique index ignores them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    pub customer: CustomerInfo,

    pub status: String,

    #[serde(rename = "payment_status")]
    pub payment_status: String,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub assigned_decorator: Option<AssignedDecorator>,

    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(rename = "created_at", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub booked_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub assigned_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub cancelled_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The fields that identify a reservation for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSlot {
    pub customer_email: String,
    pub decoration_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
}

impl Booking {
    pub fn new(slot: BookingSlot, customer_name: Option<String>) -> Self {
        Self {
            id: None,
            decoration_id: slot.decoration_id,
            decoration_name: None,
            category: None,
            transaction_id: None,
            customer: CustomerInfo {
                email: slot.customer_email,
                name: customer_name,
            },
            status: status::PENDING.to_string(),
            payment_status: PAYMENT_PAID.to_string(),
            price: None,
            assigned_decorator: None,
            booking_date: slot.booking_date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            division: None,
            district: None,
            phone: None,
            created_at: Utc::now(),
            booked_at: None,
            assigned_at: None,
            cancelled_at: None,
            updated_at: None,
        }
    }

    pub fn slot(&self) -> BookingSlot {
        BookingSlot {
            customer_email: self.customer.email.clone(),
            decoration_id: self.decoration_id.clone(),
            booking_date: self.booking_date.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}
