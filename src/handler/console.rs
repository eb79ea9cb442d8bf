use super::{Encoding, Handler, RecordKeys, Sink};
use crate::buffer;
use crate::domain::{ConfigError, HandlerError, Level};
use crate::security::{escape_console_str, escape_json_str, json_escaped_len};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::{Stderr, Stdout};

const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when the sink reports a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

/// Human-readable one-line records:
///
/// ```text
/// INF service=api latency_ms=12.5 message="request served"
/// ```
///
/// Fields keep call order and are separated by one space. Values that are
/// not plain tokens are double-quoted with JSON escaping; the message is
/// always quoted.
pub struct ConsoleHandler<S> {
    sink: S,
    colored: bool,
    level_tags: [Bytes; 6],
    // ` message=`
    message_key: Bytes,
}

impl<S: Sink> ConsoleHandler<S> {
    /// Colors are decided from the sink right here, once.
    pub fn new(sink: S) -> Self {
        let colored = sink.is_terminal();
        Self::from_parts(sink, colored, &RecordKeys::default())
    }

    pub fn builder() -> ConsoleHandlerBuilder<S> {
        ConsoleHandlerBuilder {
            sink: None,
            color: ColorMode::Auto,
            record_keys: RecordKeys::default(),
        }
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn from_parts(sink: S, colored: bool, keys: &RecordKeys) -> Self {
        let level_tags = Level::ALL.map(|level| {
            let mut tag = BytesMut::with_capacity(16);
            if colored {
                tag.extend_from_slice(level.ansi_color().as_bytes());
                tag.extend_from_slice(level.console_abbrev().as_bytes());
                tag.extend_from_slice(ANSI_RESET.as_bytes());
            } else {
                tag.extend_from_slice(level.console_abbrev().as_bytes());
            }
            tag.freeze()
        });

        let mut message_key = BytesMut::with_capacity(16);
        message_key.put_u8(b' ');
        escape_console_str(&mut message_key, &keys.message);
        message_key.put_u8(b'=');

        tracing::debug!(encoding = "console", colored, "log handler constructed");

        Self {
            sink,
            colored,
            level_tags,
            message_key: message_key.freeze(),
        }
    }
}

impl ConsoleHandler<Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl ConsoleHandler<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<S: Sink> Handler for ConsoleHandler<S> {
    fn encoding(&self) -> Encoding {
        Encoding::Console
    }

    fn write(&self, level: Level, fields: &[u8], message: &str) -> Result<(), HandlerError> {
        let mut line = buffer::global().acquire();
        line.extend_from_slice(&self.level_tags[level as usize]);
        line.extend_from_slice(fields);
        if !message.is_empty() {
            line.extend_from_slice(&self.message_key);
            escape_json_str(&mut line, message);
        }
        line.put_u8(b'\n');

        self.sink.write_record(&line)?;
        Ok(())
    }

    fn message_len(&self, message: &str) -> usize {
        if message.is_empty() {
            return 0;
        }
        self.message_key.len() + json_escaped_len(message) + 2
    }
}

pub struct ConsoleHandlerBuilder<S> {
    sink: Option<S>,
    color: ColorMode,
    record_keys: RecordKeys,
}

impl<S: Sink> ConsoleHandlerBuilder<S> {
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn record_keys(mut self, record_keys: RecordKeys) -> Self {
        self.record_keys = record_keys;
        self
    }

    pub fn build(self) -> Result<ConsoleHandler<S>, ConfigError> {
        let sink = self.sink.ok_or(ConfigError::MissingSink)?;
        self.record_keys.validate()?;
        let colored = match self.color {
            ColorMode::Auto => sink.is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        };
        Ok(ConsoleHandler::from_parts(sink, colored, &self.record_keys))
    }
}
