use rask_logger::{ConsoleHandler, JsonHandler, LockedWriter, Logger, MemorySink, buffer};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_events_produce_whole_lines() {
    let sink = MemorySink::new();
    let logger = Logger::new(JsonHandler::new(sink.clone())).with_field("service", "load");

    thread::scope(|scope| {
        for worker in 0..100u64 {
            let logger = &logger;
            scope.spawn(move || {
                logger
                    .info()
                    .uint("worker", worker)
                    .str("payload", &"p".repeat(worker as usize * 10))
                    .msg("tick");
            });
        }
    });

    let lines = sink.lines();
    assert_eq!(lines.len(), 100);

    let mut workers = HashSet::new();
    for line in &lines {
        let record: Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["service"], "load");
        assert_eq!(record["message"], "tick");
        let worker = record["worker"].as_u64().unwrap();
        assert_eq!(
            record["payload"].as_str().map(str::len),
            Some(worker as usize * 10)
        );
        workers.insert(worker);
    }
    assert_eq!(workers.len(), 100);
}

#[test]
fn test_derived_loggers_across_threads() {
    let sink = MemorySink::new();
    let root = Logger::new(JsonHandler::new(sink.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let child = root.with_field("thread", &i.to_string());
            thread::spawn(move || {
                for n in 0..50i64 {
                    child.info().int("n", n).send();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), 400);
    for line in lines {
        let record: Value = serde_json::from_str(&line).unwrap();
        assert!(record["thread"].is_string());
    }
}

#[test]
fn test_locked_writer_serializes_plain_writers() {
    let handler = Arc::new(ConsoleHandler::new(LockedWriter::new(Vec::<u8>::new())));
    let logger = Logger::new(handler.clone());

    thread::scope(|scope| {
        for i in 0..16i64 {
            let logger = &logger;
            scope.spawn(move || logger.warn().int("i", i).msg("concurrent write"));
        }
    });
    drop(logger);

    let handler = Arc::try_unwrap(handler).ok().unwrap();
    let output = String::from_utf8(handler.into_sink().into_inner()).unwrap();
    assert_eq!(output.lines().count(), 16);
    assert!(
        output
            .lines()
            .all(|line| line.starts_with("WRN i=") && line.ends_with(r#"message="concurrent write""#))
    );
}

#[test]
fn test_pool_buffers_return_after_concurrent_use() {
    let sink = MemorySink::new();
    let logger = Logger::new(JsonHandler::new(sink));
    let before = buffer::global().stats();

    thread::scope(|scope| {
        for _ in 0..32 {
            scope.spawn(|| {
                for _ in 0..100 {
                    logger.info().str("k", "v").send();
                }
            });
        }
    });

    let after = buffer::global().stats();
    // Each event takes one buffer and its handler one more line buffer.
    assert!(after.acquired - before.acquired >= 6400);
    assert!(after.released - before.released >= 6400);
}
