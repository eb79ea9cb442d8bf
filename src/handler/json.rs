use super::{Encoding, Handler, RecordKeys, Sink};
use crate::buffer;
use crate::domain::{ConfigError, HandlerError, Level};
use crate::security::{escape_json_str, json_escaped_len};
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Stdout;

/// Writes each event as a single-line JSON object:
/// `{"level":"info",<fields>,"message":"..."}`.
pub struct JsonHandler<S> {
    sink: S,
    // `{"level":"<name>"` per level, indexed by `Level as usize`.
    level_prefixes: [Bytes; 6],
    // `,"message":`
    message_key: Bytes,
}

impl<S: Sink> JsonHandler<S> {
    pub fn new(sink: S) -> Self {
        Self::from_parts(sink, &RecordKeys::default())
    }

    pub fn builder() -> JsonHandlerBuilder<S> {
        JsonHandlerBuilder {
            sink: None,
            record_keys: RecordKeys::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn from_parts(sink: S, keys: &RecordKeys) -> Self {
        let level_prefixes = Level::ALL.map(|level| {
            let mut prefix = BytesMut::with_capacity(32);
            prefix.put_u8(b'{');
            escape_json_str(&mut prefix, &keys.level);
            prefix.put_u8(b':');
            escape_json_str(&mut prefix, level.as_str());
            prefix.freeze()
        });

        let mut message_key = BytesMut::with_capacity(16);
        message_key.put_u8(b',');
        escape_json_str(&mut message_key, &keys.message);
        message_key.put_u8(b':');

        tracing::debug!(encoding = "json", "log handler constructed");

        Self {
            sink,
            level_prefixes,
            message_key: message_key.freeze(),
        }
    }
}

impl JsonHandler<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<S: Sink> Handler for JsonHandler<S> {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    fn write(&self, level: Level, fields: &[u8], message: &str) -> Result<(), HandlerError> {
        let mut line = buffer::global().acquire();
        line.extend_from_slice(&self.level_prefixes[level as usize]);
        line.extend_from_slice(fields);
        if !message.is_empty() {
            line.extend_from_slice(&self.message_key);
            escape_json_str(&mut line, message);
        }
        line.extend_from_slice(b"}\n");

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

pub struct JsonHandlerBuilder<S> {
    sink: Option<S>,
    record_keys: RecordKeys,
}

impl<S: Sink> JsonHandlerBuilder<S> {
    pub fn sink(mut self, sink: S) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn record_keys(mut self, record_keys: RecordKeys) -> Self {
        self.record_keys = record_keys;
        self
    }

    pub fn build(self) -> Result<JsonHandler<S>, ConfigError> {
        let sink = self.sink.ok_or(ConfigError::MissingSink)?;
        self.record_keys.validate()?;
        Ok(JsonHandler::from_parts(sink, &self.record_keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::MemorySink;
    use serde_json::Value;

    #[test]
    fn test_record_layout() {
        let sink = MemorySink::new();
        let handler = JsonHandler::new(sink.clone());

        handler
            .write(Level::Warn, br#","user":"ann","n":3"#, "disk almost full")
            .unwrap();

        assert_eq!(
            sink.to_string_lossy(),
            "{\"level\":\"warn\",\"user\":\"ann\",\"n\":3,\"message\":\"disk almost full\"}\n"
        );
    }

    #[test]
    fn test_empty_message_is_omitted() {
        let sink = MemorySink::new();
        let handler = JsonHandler::new(sink.clone());
        handler.write(Level::Info, b"", "").unwrap();
        assert_eq!(sink.to_string_lossy(), "{\"level\":\"info\"}\n");
    }

    #[test]
    fn test_message_is_escaped() {
        let sink = MemorySink::new();
        let handler = JsonHandler::new(sink.clone());
        let hostile = "bye\"}\n{\"level\":\"fatal";
        handler.write(Level::Info, b"", hostile).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let value: Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(value["message"], hostile);
        assert_eq!(value["level"], "info");
    }

    #[test]
    fn test_custom_record_keys() {
        let sink = MemorySink::new();
        let handler = JsonHandler::builder()
            .sink(sink.clone())
            .record_keys(RecordKeys {
                level: "severity".to_string(),
                message: "msg".to_string(),
            })
            .build()
            .unwrap();

        handler.write(Level::Error, b"", "boom").unwrap();
        assert_eq!(
            sink.to_string_lossy(),
            "{\"severity\":\"error\",\"msg\":\"boom\"}\n"
        );
    }

    #[test]
    fn test_message_len_matches_written_bytes() {
        let sink = MemorySink::new();
        let handler = JsonHandler::new(sink.clone());
        let message = "tab\there \"quoted\" \u{1}";

        handler.write(Level::Info, b"", "").unwrap();
        let bare = sink.len();
        sink.clear();
        handler.write(Level::Info, b"", message).unwrap();

        assert_eq!(sink.len() - bare, handler.message_len(message));
        assert_eq!(handler.message_len(""), 0);
    }

    #[test]
    fn test_builder_without_sink_fails() {
        let result = JsonHandler::<MemorySink>::builder().build();
        assert!(matches!(result, Err(ConfigError::MissingSink)));
    }

    #[test]
    fn test_builder_rejects_clashing_names() {
        let result = JsonHandler::builder()
            .sink(MemorySink::new())
            .record_keys(RecordKeys {
                message: "level".to_string(),
                ..RecordKeys::default()
            })
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }
}
