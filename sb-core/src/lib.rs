//! ServiceBook Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other ServiceBook crates:
//! - Application configuration (API address, realtime channel, session files)
//! - Global error type with the transport / payload / authorization taxonomy
//! - Structured logging with tracing
//! - Platform directory lookup
//! - Common constants

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{ErrorCategory, SbError, SbResult};
pub use logging::init_logging;
pub use platform::Platform;
