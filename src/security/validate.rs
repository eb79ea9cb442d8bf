//! Size and character checks run before anything reaches an event buffer.

use crate::config::Limits;
use crate::domain::ValidationError;

/// Keys must be non-empty, within `max_key_length` and free of control bytes.
pub fn validate_key(key: &str, limits: &Limits) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::EmptyKey);
    }

    if key.len() > limits.max_key_length {
        return Err(ValidationError::KeyTooLong {
            len: key.len(),
            max: limits.max_key_length,
        });
    }

    if let Some(position) = key.bytes().position(is_control) {
        return Err(ValidationError::InvalidKeyChar {
            position,
            byte: key.as_bytes()[position],
        });
    }

    Ok(())
}

/// Checks a raw (unescaped) value length.
pub fn validate_value(key: &str, len: usize, limits: &Limits) -> Result<(), ValidationError> {
    if len > limits.max_value_length {
        return Err(ValidationError::ValueTooLong {
            key: diagnostic_key(key),
            len,
            max: limits.max_value_length,
        });
    }
    Ok(())
}

pub fn validate_message(message: &str, limits: &Limits) -> Result<(), ValidationError> {
    if message.len() > limits.max_value_length {
        return Err(ValidationError::MessageTooLong {
            len: message.len(),
            max: limits.max_value_length,
        });
    }
    Ok(())
}

/// Correlation identifiers must be non-empty printable ASCII with no spaces.
pub fn validate_token(key: &str, token: &str, limits: &Limits) -> Result<(), ValidationError> {
    validate_key(key, limits)?;
    validate_value(key, token.len(), limits)?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(ValidationError::InvalidToken {
            key: diagnostic_key(key),
        });
    }
    Ok(())
}

#[inline]
fn is_control(byte: u8) -> bool {
    byte < 0x20 || byte == 0x7f
}

// Error payloads carry at most 64 bytes of the key.
fn diagnostic_key(key: &str) -> String {
    const MAX_DIAGNOSTIC_KEY: usize = 64;
    if key.len() <= MAX_DIAGNOSTIC_KEY {
        return key.to_string();
    }
    let mut end = MAX_DIAGNOSTIC_KEY;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &key[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        let limits = Limits::default();
        assert!(validate_key("user_id", &limits).is_ok());
        assert!(validate_key("http.status", &limits).is_ok());
        assert!(validate_key("ключ", &limits).is_ok());
        assert!(validate_key("quote\"key", &limits).is_ok());
    }

    #[test]
    fn test_empty_key_rejected() {
        assert_eq!(
            validate_key("", &Limits::default()),
            Err(ValidationError::EmptyKey)
        );
    }

    #[test]
    fn test_long_key_rejected() {
        let key = "k".repeat(300);
        assert_eq!(
            validate_key(&key, &Limits::default()),
            Err(ValidationError::KeyTooLong { len: 300, max: 256 })
        );
        assert!(validate_key(&"k".repeat(256), &Limits::default()).is_ok());
    }

    #[test]
    fn test_control_characters_in_key_rejected() {
        let limits = Limits::default();
        assert_eq!(
            validate_key("bad\nkey", &limits),
            Err(ValidationError::InvalidKeyChar { position: 3, byte: b'\n' })
        );
        assert!(validate_key("nul\0", &limits).is_err());
        assert!(validate_key("del\x7f", &limits).is_err());
    }

    #[test]
    fn test_value_and_message_limits() {
        let limits = Limits::default();
        assert!(validate_value("k", 65_536, &limits).is_ok());
        assert!(matches!(
            validate_value("k", 70_000, &limits),
            Err(ValidationError::ValueTooLong { len: 70_000, .. })
        ));

        let message = "m".repeat(70_000);
        assert_eq!(
            validate_message(&message, &limits),
            Err(ValidationError::MessageTooLong { len: 70_000, max: 65_536 })
        );
    }

    #[test]
    fn test_tokens() {
        let limits = Limits::default();
        assert!(validate_token("trace_id", "4bf92f3577b34da6a3ce929d0e0e4736", &limits).is_ok());
        assert!(validate_token("trace_id", "", &limits).is_err());
        assert!(validate_token("trace_id", "has space", &limits).is_err());
        assert!(validate_token("trace_id", "line\nbreak", &limits).is_err());
    }

    #[test]
    fn test_diagnostic_key_is_bounded() {
        let err = validate_value(&"é".repeat(100), 70_000, &Limits::default()).unwrap_err();
        match err {
            ValidationError::ValueTooLong { key, .. } => assert!(key.len() <= 67),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
