use rask_logger::{
    ColorMode, ConfigError, ConsoleHandler, JsonHandler, Level, Logger, MemorySink, RecordKeys,
};
use std::fmt;
use std::io;

fn plain_console() -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    let handler = ConsoleHandler::builder()
        .sink(sink.clone())
        .color(ColorMode::Never)
        .build()
        .unwrap();
    (Logger::new(handler).level(Level::Trace), sink)
}

#[test]
fn test_console_line_layout() {
    let (logger, sink) = plain_console();

    logger
        .info()
        .str("user", "ann")
        .int("attempt", 2)
        .bool("ok", true)
        .msg("signed in");

    assert_eq!(
        sink.lines(),
        vec![r#"INF user=ann attempt=2 ok=true message="signed in""#]
    );
}

#[test]
fn test_console_level_tags() {
    let (logger, sink) = plain_console();
    for level in Level::ALL {
        logger.log(level).send();
    }
    assert_eq!(sink.lines(), vec!["TRC", "DBG", "INF", "WRN", "ERR", "FTL"]);
}

#[test]
fn test_console_quotes_values_that_would_break_tokens() {
    let (logger, sink) = plain_console();

    logger
        .warn()
        .str("path", "/var/log app")
        .str("expr", "a=b")
        .str("empty", "")
        .str("multi", "one\ntwo")
        .send();

    assert_eq!(
        sink.lines(),
        vec![r#"WRN path="/var/log app" expr="a=b" empty="" multi="one\ntwo""#]
    );
}

#[test]
fn test_console_error_and_caller_fields() {
    let (logger, sink) = plain_console();
    let err = io::Error::new(io::ErrorKind::NotFound, "config missing");

    logger.error().err(&err).caller().msg("startup failed");

    let line = sink.lines().remove(0);
    assert!(line.starts_with(r#"ERR error="config missing" caller=""#));
    assert!(line.contains("console_test.rs:"));
    assert!(line.ends_with(r#"message="startup failed""#));
}

#[test]
fn test_console_colors_wrap_level_only() {
    let sink = MemorySink::new();
    let handler = ConsoleHandler::builder()
        .sink(sink.clone())
        .color(ColorMode::Always)
        .build()
        .unwrap();
    assert!(handler.is_colored());
    let logger = Logger::new(handler);

    logger.info().str("k", "v").send();
    logger.error().send();

    assert_eq!(
        sink.lines(),
        vec!["\x1b[32mINF\x1b[0m k=v", "\x1b[1;31mERR\x1b[0m"]
    );
}

#[test]
fn test_auto_color_is_off_for_non_terminals() {
    let handler = ConsoleHandler::new(MemorySink::new());
    assert!(!handler.is_colored());
}

#[test]
fn test_custom_record_keys() {
    let sink = MemorySink::new();
    let keys = RecordKeys {
        level: "lvl".to_string(),
        message: "msg".to_string(),
    };
    let handler = JsonHandler::builder()
        .sink(sink.clone())
        .record_keys(keys.clone())
        .build()
        .unwrap();
    Logger::new(handler).info().msg("renamed");
    assert_eq!(sink.lines(), vec![r#"{"lvl":"info","msg":"renamed"}"#]);

    let sink = MemorySink::new();
    let handler = ConsoleHandler::builder()
        .sink(sink.clone())
        .color(ColorMode::Never)
        .record_keys(keys)
        .build()
        .unwrap();
    Logger::new(handler).info().msg("renamed");
    assert_eq!(sink.lines(), vec![r#"INF msg="renamed""#]);
}

#[test]
fn test_builders_require_a_sink() {
    let json = JsonHandler::<MemorySink>::builder().build();
    assert!(matches!(json, Err(ConfigError::MissingSink)));

    let console = ConsoleHandler::<MemorySink>::builder()
        .color(ColorMode::Never)
        .build();
    assert!(matches!(console, Err(ConfigError::MissingSink)));
}

#[test]
fn test_string_arrays_stay_one_console_value() {
    let (logger, sink) = plain_console();
    logger
        .info()
        .strs("tags", &["a b", "c=d"])
        .str("next", "x")
        .send();

    let line = sink.lines().remove(0);
    assert_eq!(line, r#"INF tags="[\"a b\",\"c=d\"]" next=x"#);
    let quoted = line
        .strip_prefix("INF tags=")
        .and_then(|rest| rest.strip_suffix(" next=x"))
        .unwrap();
    let array: String = serde_json::from_str(quoted).unwrap();
    let values: Vec<String> = serde_json::from_str(&array).unwrap();
    assert_eq!(values, vec!["a b", "c=d"]);
}

#[test]
fn test_display_values_are_quoted_in_console() {
    struct Version(u8, u8);
    impl fmt::Display for Version {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}.{}", self.0, self.1)
        }
    }

    let (logger, sink) = plain_console();
    logger.info().display("version", &Version(1, 4)).send();
    assert_eq!(sink.lines(), vec![r#"INF version="1.4""#]);
}
