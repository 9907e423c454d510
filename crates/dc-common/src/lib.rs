//! Decora Common
//!
//! Process-level utilities shared by the platform crates and binaries:
//! structured logging setup and shutdown signal handling.

pub mod logging;
pub mod shutdown;

pub use logging::init_logging;
pub use shutdown::shutdown_signal;
