//! Field encoding shared by `Event` and the logger `Context` builder.

use crate::buffer;
use crate::config::{Config, DurationUnit, TimestampFormat};
use crate::domain::{LogError, ValidationError};
use crate::handler::Encoding;
use crate::security::{
    EscapingWriter, escape_console_str, escape_json_str, validate_key, validate_token,
    validate_value,
};
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::{self, Write};
use std::time::Duration;

const RFC3339: &str = "%Y-%m-%dT%H:%M:%S%:z";
const RFC3339_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";
const RFC3339_NANOS: &str = "%Y-%m-%dT%H:%M:%S%.9f%:z";

#[derive(Clone, Copy)]
pub(crate) struct FieldEncoder<'a> {
    pub(crate) encoding: Encoding,
    pub(crate) config: &'a Config,
}

impl<'a> FieldEncoder<'a> {
    pub(crate) fn new(encoding: Encoding, config: &'a Config) -> Self {
        Self { encoding, config }
    }

    /// Appends `key` and whatever `encode` writes as one field.
    ///
    /// Either the whole field lands in `buf` or nothing does: on any error
    /// the buffer is cut back to where it was.
    pub(crate) fn append<F>(
        &self,
        buf: &mut BytesMut,
        key: &str,
        value_len: Option<usize>,
        encode: F,
    ) -> Result<(), LogError>
    where
        F: FnOnce(&Self, &mut BytesMut) -> Result<(), LogError>,
    {
        let limits = &self.config.limits;
        validate_key(key, limits)?;
        if let Some(len) = value_len {
            validate_value(key, len, limits)?;
        }

        let mark = buf.len();
        self.write_key(buf, key);
        if let Err(err) = encode(self, buf) {
            buf.truncate(mark);
            return Err(err);
        }

        if buf.len() > limits.max_buffer_size {
            let attempted = buf.len();
            buf.truncate(mark);
            return Err(LogError::BufferOverflow {
                attempted,
                limit: limits.max_buffer_size,
            });
        }

        Ok(())
    }

    /// Correlation tokens get the stricter token check before the usual path.
    pub(crate) fn append_token(
        &self,
        buf: &mut BytesMut,
        key: &str,
        token: &str,
    ) -> Result<(), LogError> {
        validate_token(key, token, &self.config.limits)?;
        self.append(buf, key, Some(token.len()), |enc, buf| {
            enc.str_value(buf, token);
            Ok(())
        })
    }

    fn write_key(&self, buf: &mut BytesMut, key: &str) {
        match self.encoding {
            Encoding::Json => {
                buf.put_u8(b',');
                escape_json_str(buf, key);
                buf.put_u8(b':');
            }
            Encoding::Console => {
                buf.put_u8(b' ');
                escape_console_str(buf, key);
                buf.put_u8(b'=');
            }
        }
    }

    pub(crate) fn str_value(&self, buf: &mut BytesMut, value: &str) {
        match self.encoding {
            Encoding::Json => escape_json_str(buf, value),
            Encoding::Console => escape_console_str(buf, value),
        }
    }

    /// A JSON array. Console quotes the array text like any other value
    /// that is not a plain token.
    pub(crate) fn strs_value(&self, buf: &mut BytesMut, values: &[&str]) {
        match self.encoding {
            Encoding::Json => write_json_array(buf, values),
            Encoding::Console => {
                let mut array = buffer::global().acquire();
                write_json_array(&mut array, values);
                escape_console_str(buf, std::str::from_utf8(&array).unwrap_or_default());
            }
        }
    }

    pub(crate) fn int_value(&self, buf: &mut BytesMut, value: i64) {
        write_number(buf, value);
    }

    pub(crate) fn uint_value(&self, buf: &mut BytesMut, value: u64) {
        write_number(buf, value);
    }

    pub(crate) fn bool_value(&self, buf: &mut BytesMut, value: bool) {
        let literal = if value { "true" } else { "false" };
        buf.extend_from_slice(literal.as_bytes());
    }

    /// Finite floats use Rust's shortest round-trip decimal form, which never
    /// uses exponents or locale separators. Non-finite values cannot be JSON
    /// numbers and are written as strings.
    pub(crate) fn float_value(&self, buf: &mut BytesMut, value: f64) {
        if value.is_finite() {
            write_number(buf, value);
            return;
        }

        let name = if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "+Inf"
        } else {
            "-Inf"
        };
        match self.encoding {
            Encoding::Json => escape_json_str(buf, name),
            Encoding::Console => buf.extend_from_slice(name.as_bytes()),
        }
    }

    pub(crate) fn duration_value(&self, buf: &mut BytesMut, value: Duration) {
        let nanos = value.as_nanos() as f64;
        let amount = match self.config.duration_unit {
            DurationUnit::Seconds => nanos / 1e9,
            DurationUnit::Milliseconds => nanos / 1e6,
            DurationUnit::Microseconds => nanos / 1e3,
            DurationUnit::Nanoseconds => nanos,
        };
        self.float_value(buf, amount);
    }

    pub(crate) fn time_value<Tz>(&self, buf: &mut BytesMut, value: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let pattern = match self.config.timestamp_format {
            TimestampFormat::UnixSeconds => {
                write_number(buf, value.timestamp());
                return;
            }
            TimestampFormat::UnixMillis => {
                write_number(buf, value.timestamp_millis());
                return;
            }
            TimestampFormat::Rfc3339 => RFC3339,
            TimestampFormat::Rfc3339Millis => RFC3339_MILLIS,
            TimestampFormat::Rfc3339Nanos => RFC3339_NANOS,
        };

        // RFC 3339 output never contains characters needing escapes.
        let quoted = self.encoding == Encoding::Json;
        if quoted {
            buf.put_u8(b'"');
        }
        let _ = write!(buf, "{}", value.format(pattern));
        if quoted {
            buf.put_u8(b'"');
        }
    }

    /// Streams a `Display` value through the escaper. Always quoted, in both
    /// encodings, since its shape is unknown until it has been written.
    pub(crate) fn display_value(
        &self,
        buf: &mut BytesMut,
        key: &str,
        value: &dyn fmt::Display,
    ) -> Result<(), LogError> {
        let max = self.config.limits.max_value_length;
        buf.put_u8(b'"');
        let mut writer = EscapingWriter::with_limit(buf, max);
        let result = write!(writer, "{value}");
        if writer.exceeded() {
            return Err(too_long(key, writer.written(), max));
        }
        if result.is_err() {
            return Err(ValidationError::Unserializable {
                key: key.to_string(),
                reason: "Display implementation returned an error".to_string(),
            }
            .into());
        }
        buf.put_u8(b'"');
        Ok(())
    }

    /// Compact serde_json output, used verbatim by both encodings.
    pub(crate) fn json_value<T>(
        &self,
        buf: &mut BytesMut,
        key: &str,
        value: &T,
    ) -> Result<(), LogError>
    where
        T: Serialize + ?Sized,
    {
        let start = buf.len();
        serde_json::to_writer((&mut *buf).writer(), value).map_err(|e| {
            ValidationError::Unserializable {
                key: key.to_string(),
                reason: e.to_string(),
            }
        })?;

        let max = self.config.limits.max_value_length;
        let written = buf.len() - start;
        if written > max {
            return Err(too_long(key, written, max));
        }
        Ok(())
    }
}

// BytesMut grows on demand, so formatting into it cannot fail.
fn write_number(buf: &mut BytesMut, value: impl fmt::Display) {
    let _ = write!(buf, "{value}");
}

fn too_long(key: &str, len: usize, max: usize) -> LogError {
    ValidationError::ValueTooLong {
        key: key.to_string(),
        len,
        max,
    }
    .into()
}

fn write_json_array(buf: &mut BytesMut, values: &[&str]) {
    buf.put_u8(b'[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            buf.put_u8(b',');
        }
        escape_json_str(buf, value);
    }
    buf.put_u8(b']');
}
