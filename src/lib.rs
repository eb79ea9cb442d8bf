#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_lossless,            // Infallible casts are clear enough with `as`
    clippy::cast_possible_truncation, // Safe within realistic value bounds (durations, sizes)
    clippy::cast_precision_loss,      // Acceptable for duration encoding
    clippy::missing_errors_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. HandlerError in handler module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

//! Structured, leveled event logging without per-call allocation.
//!
//! ```no_run
//! use rask_logger::{ConsoleHandler, Level, Logger};
//!
//! let logger = Logger::new(ConsoleHandler::stderr())
//!     .level(Level::Debug)
//!     .with_field("service", "checkout");
//!
//! logger.info().str("order", "A-1042").uint("items", 3u32).msg("order placed");
//! ```

pub mod buffer;
pub mod config;
pub mod domain;
pub mod event;
pub mod handler;
pub mod logger;
pub mod security;

// Re-export main types for easy access
pub use buffer::{Pool, PoolStats, PooledBuffer};
pub use config::{Config, DurationUnit, FieldNames, Limits, TimestampFormat};
pub use domain::{ConfigError, HandlerError, Level, LogError, ValidationError};
pub use event::Event;
pub use handler::{
    ColorMode, ConsoleHandler, Encoding, Handler, JsonHandler, LockedWriter, MemorySink,
    RecordKeys,
};
pub use logger::{Context, Correlation, ErrorHandler, Logger, TraceContext};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
