//! Common API types and utilities

use bson::oid::ObjectId;
use utoipa::ToSchema;
use serde::Serialize;

use crate::shared::error::PlatformError;

/// Success response with optional message
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }
}

/// Insert acknowledgement carrying the new document id
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub inserted_id: String,
}

impl CreatedResponse {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: None,
            inserted_id: inserted_id.into(),
        }
    }

    pub fn with_message(inserted_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            inserted_id: inserted_id.into(),
        }
    }
}

/// Parse a 24-char hex id from a path or body field
pub fn parse_object_id(id: &str) -> Result<ObjectId, PlatformError> {
    ObjectId::parse_str(id.trim()).map_err(|_| PlatformError::InvalidId(id.to_string()))
}

/// Trimmed value, or `None` when missing or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
