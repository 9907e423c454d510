//! Promotion Request Operations

pub mod request;
pub mod approve;
pub mod reject;

pub use request::{PromotionRequested, RequestPromotionCommand, RequestPromotionUseCase};
pub use approve::{ApproveRequestCommand, ApproveRequestUseCase, RequestApproved};
pub use reject::{RejectRequestCommand, RejectRequestUseCase, RequestRejected};
