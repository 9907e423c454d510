//! Promotion Request Entity
//!
//! A customer's application to become a decorator, reviewed by an admin.

use bson::oid::ObjectId;
use bson::serde_helpers::{chrono_datetime_as_bson_datetime, chrono_datetime_as_bson_datetime_optional};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::user::entity::{ContactDetails, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Pending and approved requests block a new request for the same email
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,
    pub email: String,
    pub division: String,
    pub district: String,
    pub phone: String,

    /// Role being requested
    pub role: String,

    pub status: RequestStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub requested_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl PromotionRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        contact: ContactDetails,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            division: contact.division,
            district: contact.district,
            phone: contact.phone,
            role: UserRole::Decorator.as_str().to_string(),
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            approved_at: None,
            rejected_at: None,
        }
    }

    pub fn contact(&self) -> ContactDetails {
        ContactDetails {
            phone: self.phone.clone(),
            division: self.division.clone(),
            district: self.district.clone(),
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}
