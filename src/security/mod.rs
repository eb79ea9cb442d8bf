//! Validation and escaping. No byte reaches an event buffer without passing
//! through this module first.

pub mod escape;
pub mod validate;

pub use escape::{
    EscapingWriter, console_needs_quoting, escape_console_str, escape_json_str,
    json_escaped_len, write_json_escaped,
};
pub use validate::{validate_key, validate_message, validate_token, validate_value};
