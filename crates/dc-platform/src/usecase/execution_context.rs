//! Execution Context
//!
//! Carries the acting principal and a correlation id through a use case so
//! every log line of one request can be tied together.

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique ID for this execution
    pub execution_id: String,
    /// Email of the verified caller, or "anonymous" for public routes
    pub principal_id: String,
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    pub fn create(principal_id: impl Into<String>) -> Self {
        Self {
            execution_id: format!("exec-{}", ObjectId::new().to_hex()),
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }

    /// Context for routes that do not require a bearer token
    pub fn anonymous() -> Self {
        Self::create("anonymous")
    }
}
