//! Use Case Infrastructure
//!
//! - `UseCaseResult<T>` - result type for use case outcomes
//! - `UseCaseError` - categorized error types for consistent handling
//! - `ExecutionContext` - acting principal and execution id
//! - `Workflow` - ordered, logged multi-document writes

pub mod result;
pub mod error;
pub mod execution_context;
pub mod workflow;

pub use result::UseCaseResult;
pub use error::UseCaseError;
pub use execution_context::ExecutionContext;
pub use workflow::Workflow;
