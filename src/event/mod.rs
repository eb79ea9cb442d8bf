//! The per-call event builder.
//!
//! ```text
//! Logger::info() ──> Active ──field calls──> Active ──msg/send/discard──> Released
//!                 └─> Disabled ────────────(no-ops)──────────────────────> Released
//! ```
//!
//! Terminal calls take the event by value, so nothing can touch it after it
//! has been released. An event dropped without a terminal call is discarded.

pub(crate) mod encoder;

use crate::buffer::{self, PooledBuffer};
use crate::domain::{Level, LogError, ValidationError};
use crate::logger::Logger;
use crate::security::validate_message;
use bytes::BytesMut;
use chrono::{DateTime, TimeZone, Utc};
use encoder::FieldEncoder;
use serde::Serialize;
use std::fmt::{self, Write};
use std::panic::Location;
use std::time::Duration;

/// One in-flight log record.
///
/// Obtained from a leveled call on a [`Logger`]. A disabled event (level
/// below the logger's threshold) holds no buffer and every field call on it
/// returns immediately without validating anything.
#[must_use = "an event does nothing until `msg`, `send` or `discard` is called"]
pub struct Event<'a> {
    logger: &'a Logger,
    level: Level,
    buf: Option<PooledBuffer<'static>>,
}

impl<'a> Event<'a> {
    pub(crate) fn new(logger: &'a Logger, level: Level) -> Self {
        if !logger.enabled(level) {
            return Self {
                logger,
                level,
                buf: None,
            };
        }

        let mut buf = buffer::global().acquire();
        buf.extend_from_slice(logger.base_fields());
        Self {
            logger,
            level,
            buf: Some(buf),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// False for events below the logger's threshold.
    pub fn enabled(&self) -> bool {
        self.buf.is_some()
    }

    pub fn str(self, key: &str, value: &str) -> Self {
        self.field(key, Some(value.len()), |enc, buf| {
            enc.str_value(buf, value);
            Ok(())
        })
    }

    /// A JSON array of strings. Console output quotes the array text.
    pub fn strs(self, key: &str, values: &[&str]) -> Self {
        if !self.enabled() {
            return self;
        }
        let total = values.iter().map(|v| v.len()).sum::<usize>();
        self.field(key, Some(total), |enc, buf| {
            enc.strs_value(buf, values);
            Ok(())
        })
    }

    pub fn int(self, key: &str, value: impl Into<i64>) -> Self {
        let value = value.into();
        self.field(key, None, |enc, buf| {
            enc.int_value(buf, value);
            Ok(())
        })
    }

    pub fn uint(self, key: &str, value: impl Into<u64>) -> Self {
        let value = value.into();
        self.field(key, None, |enc, buf| {
            enc.uint_value(buf, value);
            Ok(())
        })
    }

    pub fn float(self, key: &str, value: impl Into<f64>) -> Self {
        let value = value.into();
        self.field(key, None, |enc, buf| {
            enc.float_value(buf, value);
            Ok(())
        })
    }

    pub fn bool(self, key: &str, value: bool) -> Self {
        self.field(key, None, |enc, buf| {
            enc.bool_value(buf, value);
            Ok(())
        })
    }

    /// Encoded as a float in the configured `DurationUnit`.
    pub fn dur(self, key: &str, value: Duration) -> Self {
        self.field(key, None, |enc, buf| {
            enc.duration_value(buf, value);
            Ok(())
        })
    }

    pub fn time<Tz>(self, key: &str, value: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.field(key, None, |enc, buf| {
            enc.time_value(buf, value);
            Ok(())
        })
    }

    /// Appends the current UTC time under the configured time key.
    ///
    /// Like every other field this appends: calling it twice yields two time
    /// fields.
    pub fn timestamp(self) -> Self {
        if !self.enabled() {
            return self;
        }
        let now = Utc::now();
        let logger = self.logger;
        let key = &logger.config().field_names.time;
        self.field(key, None, |enc, buf| {
            enc.time_value(buf, &now);
            Ok(())
        })
    }

    /// Appends `err`'s `Display` output under the configured error key.
    pub fn err<E>(self, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        if !self.enabled() {
            return self;
        }
        let logger = self.logger;
        let key = &logger.config().field_names.error;
        self.field(key, None, |enc, buf| enc.display_value(buf, key, &err))
    }

    /// Any `Display` value, written through the escaper without an
    /// intermediate `String`.
    pub fn display(self, key: &str, value: &dyn fmt::Display) -> Self {
        self.field(key, None, |enc, buf| enc.display_value(buf, key, value))
    }

    /// Any `Serialize` value as compact JSON.
    pub fn json<T>(self, key: &str, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.field(key, None, |enc, buf| enc.json_value(buf, key, value))
    }

    /// Appends `file:line` of the call site.
    #[track_caller]
    pub fn caller(self) -> Self {
        if !self.enabled() {
            return self;
        }
        let site = CallSite(Location::caller());
        let logger = self.logger;
        let key = &logger.config().field_names.caller;
        self.field(key, None, |enc, buf| enc.display_value(buf, key, &site))
    }

    /// Finishes the event with `message` and hands it to the handler.
    ///
    /// A message over the value limit, or one whose escaped form would push
    /// the record past the buffer limit, is dropped and reported; the record
    /// is still written without it. Handler failures go to the error callback.
    pub fn msg(mut self, message: &str) {
        let Some(buf) = self.buf.take() else {
            return;
        };
        let logger = self.logger;
        let limits = &logger.config().limits;

        let message = match validate_message(message, limits) {
            Ok(()) => {
                let needed = buf.len() + logger.handler().message_len(message);
                if needed > limits.max_buffer_size {
                    logger.report(LogError::BufferOverflow {
                        attempted: needed,
                        limit: limits.max_buffer_size,
                    });
                    ""
                } else {
                    message
                }
            }
            Err(err) => {
                logger.report(err.into());
                ""
            }
        };

        if let Err(err) = logger.handler().write(self.level, &buf, message) {
            logger.report(err.into());
        }
    }

    /// `msg` with a formatted message. Nothing is formatted for a disabled
    /// event.
    ///
    /// Formatting stops at the value limit. A message that runs past it, or
    /// whose `Display` impl fails, is reported and the record is written
    /// without a message.
    pub fn msg_fmt(self, args: fmt::Arguments<'_>) {
        if !self.enabled() {
            return;
        }
        if let Some(message) = args.as_str() {
            return self.msg(message);
        }

        let logger = self.logger;
        let max = logger.config().limits.max_value_length;
        let mut scratch = buffer::global().acquire();
        let mut out = CappedWriter {
            buf: &mut scratch,
            cap: max,
            attempted: 0,
        };

        if out.write_fmt(args).is_err() {
            let err = if out.attempted > max {
                ValidationError::MessageTooLong {
                    len: out.attempted,
                    max,
                }
            } else {
                ValidationError::Unserializable {
                    key: "message".to_string(),
                    reason: "Display implementation returned an error".to_string(),
                }
            };
            logger.report(err.into());
            return self.send();
        }

        let message = std::str::from_utf8(&scratch).unwrap_or_default();
        self.msg(message);
    }

    /// Finishes the event without a message.
    pub fn send(self) {
        self.msg("");
    }

    /// Releases the event without writing anything.
    pub fn discard(self) {}

    fn field<F>(mut self, key: &str, value_len: Option<usize>, encode: F) -> Self
    where
        F: FnOnce(&FieldEncoder<'_>, &mut BytesMut) -> Result<(), LogError>,
    {
        if let Some(buf) = self.buf.as_mut() {
            let encoder = self.logger.encoder();
            if let Err(err) = encoder.append(buf, key, value_len, encode) {
                self.logger.report(err);
            }
        }
        self
    }
}

// Refuses to grow `buf` past `cap` bytes.
struct CappedWriter<'b> {
    buf: &'b mut BytesMut,
    cap: usize,
    attempted: usize,
}

impl Write for CappedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.attempted += s.len();
        if self.attempted > self.cap {
            return Err(fmt::Error);
        }
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

struct CallSite(&'static Location<'static>);

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.0.file(), self.0.line())
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("level", &self.level)
            .field("enabled", &self.enabled())
            .field("len", &self.buf.as_ref().map_or(0, |buf| buf.len()))
            .finish()
    }
}
