//! Output side of the engine: turns an event's encoded fields into one record
//! and hands it to a sink.

pub mod console;
pub mod json;
pub mod sink;

use crate::config::Limits;
use crate::domain::{ConfigError, HandlerError, Level};
use crate::security::{json_escaped_len, validate_key};
use serde::{Deserialize, Serialize};

pub use console::{ColorMode, ConsoleHandler, ConsoleHandlerBuilder};
pub use json::{JsonHandler, JsonHandlerBuilder};
pub use sink::{LockedWriter, MemorySink, Sink};

/// Wire format an event pre-encodes its fields in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Each field is `,"key":value`.
    Json,
    /// Each field is ` key=value`.
    Console,
}

/// Keys a handler writes around the event's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordKeys {
    pub level: String,
    pub message: String,
}

impl Default for RecordKeys {
    fn default() -> Self {
        Self {
            level: "level".to_string(),
            message: "message".to_string(),
        }
    }
}

impl RecordKeys {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = Limits::default();
        for (role, key) in [("level", &self.level), ("message", &self.message)] {
            validate_key(key, &limits).map_err(|e| {
                ConfigError::InvalidConfig(format!("Invalid {role} key '{key}': {e}"))
            })?;
        }
        if self.level == self.message {
            return Err(ConfigError::InvalidConfig(format!(
                "Level and message keys are both '{}'",
                self.level
            )));
        }
        Ok(())
    }
}

/// Serializes one finished event and delivers it.
///
/// `fields` is the event's buffer, already encoded in `self.encoding()`.
/// `message` has been validated but not escaped. Implementations must write
/// exactly one line per call and report sink failures through the returned
/// error instead of panicking.
pub trait Handler: Send + Sync {
    fn encoding(&self) -> Encoding;

    fn write(&self, level: Level, fields: &[u8], message: &str) -> Result<(), HandlerError>;

    /// Bytes `message` adds to a record once escaped, key included. Zero for
    /// an empty message, which is left out of the record.
    fn message_len(&self, message: &str) -> usize {
        if message.is_empty() {
            0
        } else {
            json_escaped_len(message) + 2
        }
    }
}

impl<H: Handler + ?Sized> Handler for std::sync::Arc<H> {
    fn encoding(&self) -> Encoding {
        (**self).encoding()
    }

    fn write(&self, level: Level, fields: &[u8], message: &str) -> Result<(), HandlerError> {
        (**self).write(level, fields, message)
    }

    fn message_len(&self, message: &str) -> usize {
        (**self).message_len(message)
    }
}
