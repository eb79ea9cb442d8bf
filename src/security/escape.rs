//! Injection-safe encoders for JSON strings and console values.
//!
//! Every byte of caller-supplied text goes through one of these before it
//! lands in a buffer. JSON output follows RFC 8259: `"` and `\` are escaped,
//! `\n` `\r` `\t` use their short forms, every other byte below 0x20 becomes
//! `\u00XX`, and multi-byte UTF-8 is copied through untouched.

use bytes::{BufMut, BytesMut};
use std::fmt;

const HEX: &[u8; 16] = b"0123456789abcdef";

// 0 = copy through, b'u' = \u00XX, anything else = backslash + that byte.
static ESCAPE: [u8; 256] = build_escape_table();

const fn build_escape_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 0x20 {
        table[i] = b'u';
        i += 1;
    }
    table[b'\n' as usize] = b'n';
    table[b'\r' as usize] = b'r';
    table[b'\t' as usize] = b't';
    table[b'"' as usize] = b'"';
    table[b'\\' as usize] = b'\\';
    table
}

/// Appends `s` as a complete JSON string literal, quotes included.
pub fn escape_json_str(buf: &mut BytesMut, s: &str) {
    buf.put_u8(b'"');
    write_json_escaped(buf, s);
    buf.put_u8(b'"');
}

/// Appends the escaped body of a JSON string, without quotes.
pub fn write_json_escaped(buf: &mut BytesMut, s: &str) {
    let bytes = s.as_bytes();
    let mut start = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        let escape = ESCAPE[byte as usize];
        if escape == 0 {
            continue;
        }

        if start < i {
            buf.extend_from_slice(&bytes[start..i]);
        }

        if escape == b'u' {
            buf.extend_from_slice(b"\\u00");
            buf.put_u8(HEX[(byte >> 4) as usize]);
            buf.put_u8(HEX[(byte & 0x0f) as usize]);
        } else {
            buf.put_u8(b'\\');
            buf.put_u8(escape);
        }

        start = i + 1;
    }

    if start < bytes.len() {
        buf.extend_from_slice(&bytes[start..]);
    }
}

/// Length of `s` once escaped by `write_json_escaped`, quotes excluded.
pub fn json_escaped_len(s: &str) -> usize {
    s.bytes()
        .map(|byte| match ESCAPE[byte as usize] {
            0 => 1,
            b'u' => 6,
            _ => 2,
        })
        .sum()
}

/// True when a console value has to be quoted to stay a single token.
pub fn console_needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s
            .bytes()
            .any(|b| b <= b' ' || b == b'"' || b == b'=' || b == b'\\' || b == 0x7f)
}

/// Appends a console value: bare when it is a plain token, otherwise a
/// quoted JSON-escaped string so newlines can never split the line.
pub fn escape_console_str(buf: &mut BytesMut, s: &str) {
    if console_needs_quoting(s) {
        escape_json_str(buf, s);
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// `fmt::Write` adapter that JSON-escapes everything written through it.
///
/// Lets `Display` values be encoded straight into an event buffer. `written`
/// counts raw bytes before escaping. Once more than `limit` raw bytes have
/// been offered the writer refuses further input, which stops the formatter.
pub struct EscapingWriter<'a> {
    buf: &'a mut BytesMut,
    written: usize,
    limit: usize,
}

impl<'a> EscapingWriter<'a> {
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self::with_limit(buf, usize::MAX)
    }

    pub fn with_limit(buf: &'a mut BytesMut, limit: usize) -> Self {
        Self {
            buf,
            written: 0,
            limit,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn exceeded(&self) -> bool {
        self.written > self.limit
    }
}

impl fmt::Write for EscapingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.written = self.written.saturating_add(s.len());
        if self.exceeded() {
            return Err(fmt::Error);
        }
        write_json_escaped(self.buf, s);
        Ok(())
    }
}
