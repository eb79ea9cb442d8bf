//! Domain layer for rask-logger.
//!
//! Contains the canonical types shared across all modules:
//! - `Level`: event severity (Trace/Debug/Info/Warn/Error/Fatal)
//! - `LogError`: what the error callback receives
//! - `ConfigError`: construction-time failures

pub mod error;
pub mod level;

pub use error::{ConfigError, HandlerError, LogError, ValidationError};
pub use level::{Level, ParseLevelError};
