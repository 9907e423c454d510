//! User Entity
//!
//! Customers, decorators and admins share one collection. The role field is
//! absent for customers. Some keys keep the spelling of existing documents
//! (`work_Status`, `last_loggedIn`, `created_at`).

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime_optional;
use bson::Bson;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Role stored on the user document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Decorator,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Decorator => "decorator",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored or requested role; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "decorator" => Some(Self::Decorator),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Decorator workload flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Available,
    Busy,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "busy" => Some(Self::Busy),
            _ => None,
        }
    }
}

/// Unrecognised or non-string values read as no status
fn lenient_work_status<'de, D>(deserializer: D) -> Result<Option<WorkStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::String(value)) => WorkStatus::parse(&value),
        _ => None,
    })
}

/// Recorded working day. Older documents hold a date or timestamp string,
/// newer writers may store a BSON date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkingDate {
    Text(String),
    Timestamp(bson::DateTime),
}

impl WorkingDate {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Text as stored, or the timestamp in RFC 3339
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Timestamp(at) => at.to_chrono().to_rfc3339(),
        }
    }
}

impl From<&str> for WorkingDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<DateTime<Utc>> for WorkingDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(bson::DateTime::from_chrono(value))
    }
}

/// Values of any other BSON type read as no working day
fn lenient_working_date<'de, D>(deserializer: D) -> Result<Option<WorkingDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::String(text)) => Some(WorkingDate::Text(text)),
        Some(Bson::DateTime(at)) => Some(WorkingDate::Timestamp(at)),
        _ => None,
    })
}

/// Contact and service-area fields copied from an approved promotion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone: String,
    pub division: String,
    pub district: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(
        rename = "work_Status",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_work_status"
    )]
    pub work_status: Option<WorkStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(
        rename = "working_date",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_working_date"
    )]
    pub working_date: Option<WorkingDate>,

    #[serde(rename = "start_time", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(rename = "end_time", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    /// RFC 3339 timestamp of the last login upsert
    #[serde(rename = "last_loggedIn", default, skip_serializing_if = "Option::is_none")]
    pub last_logged_in: Option<String>,

    #[serde(
        rename = "created_at",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono_datetime_as_bson_datetime_optional"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "chrono_datetime_as_bson_datetime_optional")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            name: None,
            image: None,
            role: None,
            work_status: None,
            division: None,
            district: None,
            phone: None,
            working_date: None,
            start_time: None,
            end_time: None,
            last_logged_in: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = match role {
            UserRole::Customer => None,
            other => Some(other.as_str().to_string()),
        };
        if role == UserRole::Decorator && self.work_status.is_none() {
            self.work_status = Some(WorkStatus::Available);
        }
        self
    }

    /// Known role, customers included; `None` for unrecognised stored values
    pub fn role(&self) -> Option<UserRole> {
        match &self.role {
            None => Some(UserRole::Customer),
            Some(value) => UserRole::parse(value),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(UserRole::Admin)
    }

    pub fn is_decorator(&self) -> bool {
        self.role() == Some(UserRole::Decorator)
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}
