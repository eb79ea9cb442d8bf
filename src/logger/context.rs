use super::correlation::Correlation;
use super::{BaseFields, Logger};
use crate::domain::LogError;
use crate::event::encoder::FieldEncoder;
use crate::handler::Encoding;
use bytes::BytesMut;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Builder for a derived logger's base fields.
///
/// Fields are encoded once here and copied verbatim into every event of the
/// resulting logger. Invalid fields are reported through the parent's error
/// callback and left out.
#[must_use = "call `logger()` to obtain the derived logger"]
pub struct Context {
    logger: Logger,
    json: BytesMut,
    console: BytesMut,
}

impl Context {
    pub(crate) fn new(logger: Logger) -> Self {
        let base = logger.base();
        let json = BytesMut::from(&base.json[..]);
        let console = BytesMut::from(&base.console[..]);
        Self {
            logger,
            json,
            console,
        }
    }

    pub fn str(self, key: &str, value: &str) -> Self {
        self.field(key, Some(value.len()), |enc, buf| {
            enc.str_value(buf, value);
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

    pub fn dur(self, key: &str, value: Duration) -> Self {
        self.field(key, None, |enc, buf| {
            enc.duration_value(buf, value);
            Ok(())
        })
    }

    pub fn display(self, key: &str, value: &dyn fmt::Display) -> Self {
        self.field(key, None, |enc, buf| enc.display_value(buf, key, value))
    }

    pub fn json<T>(self, key: &str, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.field(key, None, |enc, buf| enc.json_value(buf, key, value))
    }

    /// Adds every field `context` yields, each checked as an identifier
    /// token. Offending pairs are reported and skipped; the rest are kept.
    pub fn correlation<C>(mut self, context: &C) -> Self
    where
        C: Correlation + ?Sized,
    {
        context.for_each_field(&mut |key, value| {
            self.append(|enc, buf| enc.append_token(buf, key, value));
        });
        self
    }

    /// Freezes the accumulated fields into a new logger.
    pub fn logger(self) -> Logger {
        let mut logger = self.logger;
        logger.replace_base(BaseFields {
            json: self.json.freeze(),
            console: self.console.freeze(),
        });
        logger
    }

    fn field<F>(mut self, key: &str, value_len: Option<usize>, encode: F) -> Self
    where
        F: Fn(&FieldEncoder<'_>, &mut BytesMut) -> Result<(), LogError>,
    {
        self.append(|enc, buf| enc.append(buf, key, value_len, &encode));
        self
    }

    // Both encodings get the field or neither does.
    fn append<F>(&mut self, mut append: F)
    where
        F: FnMut(&FieldEncoder<'_>, &mut BytesMut) -> Result<(), LogError>,
    {
        let config = self.logger.config();
        let json = FieldEncoder::new(Encoding::Json, config);
        let console = FieldEncoder::new(Encoding::Console, config);

        let mark = self.json.len();
        let mut result = append(&json, &mut self.json);
        if result.is_ok() {
            result = append(&console, &mut self.console);
            if result.is_err() {
                self.json.truncate(mark);
            }
        }

        if let Err(err) = result {
            self.logger.report(err);
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("logger", &self.logger)
            .field("len", &self.json.len())
            .finish()
    }
}
