use thiserror::Error;

/// A field, message or correlation token rejected before any byte was written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field key is empty")]
    EmptyKey,

    #[error("field key is {len} bytes, limit is {max}")]
    KeyTooLong { len: usize, max: usize },

    #[error("field key contains control byte {byte:#04x} at position {position}")]
    InvalidKeyChar { position: usize, byte: u8 },

    #[error("value for key '{key}' is {len} bytes, limit is {max}")]
    ValueTooLong { key: String, len: usize, max: usize },

    #[error("message is {len} bytes, limit is {max}")]
    MessageTooLong { len: usize, max: usize },

    #[error("correlation token for key '{key}' is not a printable token")]
    InvalidToken { key: String },

    #[error("value for key '{key}' could not be serialized: {reason}")]
    Unserializable { key: String, reason: String },
}

/// Failure of the sink behind a handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the error callback can be handed.
///
/// None of these abort the caller: the offending piece is dropped and the
/// rest of the event goes on.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("write failed: {0}")]
    Write(#[from] HandlerError),

    #[error("event buffer overflow: attempted {attempted} bytes, limit {limit}")]
    BufferOverflow { attempted: usize, limit: usize },
}

impl LogError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LogError::Validation(_))
    }

    pub fn is_write(&self) -> bool {
        matches!(self, LogError::Write(_))
    }
}

/// Hard failures at construction time, before any event exists.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("handler has no sink configured")]
    MissingSink,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}
