//! Structured logging for the leverage token planner
//!
//! Installs a `tracing` subscriber from [`LoggingConfig`] and provides
//! per-plan correlation ids so every quote request and log line emitted
//! while planning one mint or redeem can be grouped together.

pub mod tracing_setup;

pub use tracing_setup::*;
