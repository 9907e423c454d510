//! Use Case Errors
//!
//! Categorized error types for use case failures.
//! Errors are categorized by type to enable consistent HTTP status mapping.
//!
//! # Creating Errors with Details
//!
//! ```ignore
//! use dc_platform::usecase::UseCaseError;
//! use dc_platform::details;
//!
//! UseCaseError::validation("EMAIL_REQUIRED", "Email is required");
//!
//! UseCaseError::business_rule_with_details(
//!     "REQUEST_EXISTS",
//!     "A request for this email already exists",
//!     details! { "email" => email },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::error::PlatformError;

/// Macro for creating error detail maps.
///
/// ```ignore
/// let details = details! {
///     "bookingId" => booking_id,
///     "decoratorId" => decorator_id
/// };
/// ```
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for use case failures.
///
/// - `ValidationError` -> 400 Bad Request
/// - `BusinessRuleViolation` -> 409 Conflict
/// - `NotFoundError` -> 404 Not Found
/// - `PartialFailure` -> 500, some steps of a multi-write workflow applied
/// - `GatewayError` -> 500, the payment processor failed
/// - `StoreError` -> 500, the document store failed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    BusinessRuleViolation {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// A workflow stopped after some of its writes were applied.
    /// `completed_steps` lists those writes in order.
    PartialFailure {
        code: String,
        message: String,
        completed_steps: Vec<String>,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    GatewayError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    StoreError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn business_rule(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn business_rule_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn partial_failure(
        message: impl Into<String>,
        completed_steps: Vec<String>,
    ) -> Self {
        Self::PartialFailure {
            code: "PARTIAL_FAILURE".to_string(),
            message: message.into(),
            completed_steps,
            details: HashMap::new(),
        }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        Self::GatewayError {
            code: "GATEWAY_ERROR".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            code: "STORE_ERROR".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. } => code,
            Self::BusinessRuleViolation { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::PartialFailure { code, .. } => code,
            Self::GatewayError { code, .. } => code,
            Self::StoreError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
            Self::BusinessRuleViolation { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::PartialFailure { message, .. } => message,
            Self::GatewayError { message, .. } => message,
            Self::StoreError { message, .. } => message,
        }
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::BusinessRuleViolation { .. } => 409,
            Self::NotFoundError { .. } => 404,
            Self::PartialFailure { .. } => 500,
            Self::GatewayError { .. } => 500,
            Self::StoreError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

/// Repository and gateway failures surfacing inside a use case.
impl From<PlatformError> for UseCaseError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Validation { message } => Self::validation("VALIDATION_ERROR", message),
            PlatformError::InvalidId(id) => Self::validation_with_details(
                "INVALID_ID",
                format!("'{}' is not a valid id", id),
                crate::details! { "id" => id },
            ),
            PlatformError::Conflict { message } => Self::business_rule("DUPLICATE", message),
            PlatformError::NotFound { entity_type, id } => Self::not_found(
                format!("{}_NOT_FOUND", entity_type.to_uppercase().replace(' ', "_")),
                id,
            ),
            PlatformError::Gateway { message } => Self::gateway(message),
            PlatformError::PartialFailure { message, completed_steps } => {
                Self::partial_failure(message, completed_steps)
            }
            other => Self::store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = UseCaseError::validation("EMAIL_REQUIRED", "Email is required");
        assert_eq!(err.code(), "EMAIL_REQUIRED");
        assert_eq!(err.message(), "Email is required");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_business_rule_maps_to_conflict() {
        let err = UseCaseError::business_rule("BOOKING_EXISTS", "Already booked");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_partial_failure_carries_steps() {
        let err = UseCaseError::partial_failure("step 2 failed", vec!["assign booking".into()]);
        assert_eq!(err.code(), "PARTIAL_FAILURE");
        assert_eq!(err.http_status_code(), 500);
        if let UseCaseError::PartialFailure { completed_steps, .. } = err {
            assert_eq!(completed_steps, vec!["assign booking".to_string()]);
        } else {
            panic!("Expected PartialFailure");
        }
    }

    #[test]
    fn test_details_macro_multiple() {
        let booking_id = "64b7f0c2a1b2c3d4e5f60718";
        let details = details! {
            "bookingId" => booking_id,
            "count" => 2,
        };
        assert_eq!(details.get("bookingId"), Some(&serde_json::json!(booking_id)));
        assert_eq!(details.get("count"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_details_macro_empty() {
        let details: HashMap<String, serde_json::Value> = details!();
        assert!(details.is_empty());
    }

    #[test]
    fn test_from_platform_error() {
        let err: UseCaseError = PlatformError::not_found("Booking", "abc").into();
        assert_eq!(err.code(), "BOOKING_NOT_FOUND");
        assert_eq!(err.http_status_code(), 404);

        let err: UseCaseError = PlatformError::conflict("duplicate transactionId").into();
        assert_eq!(err.http_status_code(), 409);

        let err: UseCaseError = PlatformError::internal("disk on fire").into();
        assert_eq!(err.code(), "STORE_ERROR");
    }
}
