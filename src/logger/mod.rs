//! The `Logger`: an immutable, cheaply cloned bundle of threshold, handler,
//! pre-encoded base fields and error callback.
//!
//! Every derivation (`level`, `with`, `with_field`, `with_handler`, ...)
//! returns a new logger and leaves the receiver untouched, so a logger can be
//! shared across threads without synchronization.

mod context;
mod correlation;
pub mod report;

pub use context::Context;
pub use correlation::{Correlation, SPAN_ID_KEY, TRACE_ID_KEY, TraceContext};
pub use report::{ErrorHandler, discard_errors, tracing_error_handler};

use crate::config::Config;
use crate::domain::{ConfigError, HandlerError, Level, LogError};
use crate::event::Event;
use crate::event::encoder::FieldEncoder;
use crate::handler::{Encoding, Handler};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Base fields baked at derivation time, kept in both encodings so the
/// handler can be swapped without re-running the context calls.
#[derive(Clone, Default)]
pub(crate) struct BaseFields {
    pub(crate) json: Bytes,
    pub(crate) console: Bytes,
}

impl BaseFields {
    fn get(&self, encoding: Encoding) -> &[u8] {
        match encoding {
            Encoding::Json => &self.json,
            Encoding::Console => &self.console,
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    level: Level,
    silent: bool,
    handler: Arc<dyn Handler>,
    encoding: Encoding,
    base: BaseFields,
    config: Arc<Config>,
    on_error: ErrorHandler,
}

impl Logger {
    /// A logger at the default threshold (`Info`) that discards its errors.
    pub fn new(handler: impl Handler + 'static) -> Self {
        let config = Config::default();
        Self::from_parts(Arc::new(handler), config)
    }

    /// A logger whose threshold, limits and field names come from `config`.
    pub fn with_config(handler: impl Handler + 'static, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(Arc::new(handler), config))
    }

    /// A logger that drops every event before any field is encoded.
    pub fn nop() -> Self {
        let mut logger = Self::from_parts(Arc::new(NopHandler), Config::default());
        logger.silent = true;
        logger
    }

    fn from_parts(handler: Arc<dyn Handler>, config: Config) -> Self {
        Self {
            level: config.level,
            silent: false,
            encoding: handler.encoding(),
            handler,
            base: BaseFields::default(),
            config: Arc::new(config),
            on_error: discard_errors(),
        }
    }

    /// A copy with a different minimum level.
    pub fn level(&self, level: Level) -> Self {
        let mut derived = self.clone();
        derived.level = level;
        derived
    }

    /// Starts a base-field builder seeded with this logger's fields.
    pub fn with(&self) -> Context {
        Context::new(self.clone())
    }

    /// Shorthand for `with().str(key, value).logger()`.
    pub fn with_field(&self, key: &str, value: &str) -> Self {
        self.with().str(key, value).logger()
    }

    /// A copy carrying the correlation fields `context` yields.
    pub fn with_context<C>(&self, context: &C) -> Self
    where
        C: Correlation + ?Sized,
    {
        self.with().correlation(context).logger()
    }

    /// A copy writing to `handler`. Base fields carry over.
    pub fn with_handler(&self, handler: impl Handler + 'static) -> Self {
        let mut derived = self.clone();
        derived.encoding = handler.encoding();
        derived.handler = Arc::new(handler);
        derived
    }

    /// A copy reporting degraded events to `callback`.
    ///
    /// The callback runs synchronously on the logging thread. Errors raised
    /// while it runs are not fed back into it.
    pub fn on_error<F>(&self, callback: F) -> Self
    where
        F: Fn(&LogError) + Send + Sync + 'static,
    {
        self.with_error_handler(Arc::new(callback))
    }

    pub fn with_error_handler(&self, handler: ErrorHandler) -> Self {
        let mut derived = self.clone();
        derived.on_error = handler;
        derived
    }

    pub fn trace(&self) -> Event<'_> {
        Event::new(self, Level::Trace)
    }

    pub fn debug(&self) -> Event<'_> {
        Event::new(self, Level::Debug)
    }

    pub fn info(&self) -> Event<'_> {
        Event::new(self, Level::Info)
    }

    pub fn warn(&self) -> Event<'_> {
        Event::new(self, Level::Warn)
    }

    pub fn error(&self) -> Event<'_> {
        Event::new(self, Level::Error)
    }

    /// Writes at `Fatal`. The process is left running; exiting is up to the
    /// caller.
    pub fn fatal(&self) -> Event<'_> {
        Event::new(self, Level::Fatal)
    }

    pub fn log(&self, level: Level) -> Event<'_> {
        Event::new(self, level)
    }

    pub fn enabled(&self, level: Level) -> bool {
        !self.silent && level >= self.level
    }

    pub fn get_level(&self) -> Level {
        self.level
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn handler(&self) -> &dyn Handler {
        &*self.handler
    }

    /// Base fields in the current handler's encoding.
    pub fn base_fields(&self) -> &[u8] {
        self.base.get(self.encoding)
    }

    pub(crate) fn encoder(&self) -> FieldEncoder<'_> {
        FieldEncoder::new(self.encoding, &self.config)
    }

    pub(crate) fn report(&self, err: LogError) {
        report::dispatch(&self.on_error, &err);
    }

    pub(crate) fn replace_base(&mut self, base: BaseFields) {
        self.base = base;
    }

    pub(crate) fn base(&self) -> &BaseFields {
        &self.base
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("silent", &self.silent)
            .field("encoding", &self.encoding)
            .field("base_len", &self.base_fields().len())
            .finish_non_exhaustive()
    }
}

struct NopHandler;

impl Handler for NopHandler {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    fn write(&self, _level: Level, _fields: &[u8], _message: &str) -> Result<(), HandlerError> {
        Ok(())
    }
}
