//! Synchronous delivery of `LogError`s to the logger's error callback.

use crate::domain::LogError;
use std::cell::Cell;
use std::sync::Arc;

/// Callback receiving every validation, overflow and write failure.
pub type ErrorHandler = Arc<dyn Fn(&LogError) + Send + Sync>;

thread_local! {
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

struct CallbackGuard;

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        IN_CALLBACK.with(|flag| flag.set(false));
    }
}

/// Runs `handler` unless this thread is already inside an error callback.
///
/// A callback that logs may trigger further errors; those are dropped rather
/// than fed back into a callback, which would recurse.
pub(crate) fn dispatch(handler: &ErrorHandler, err: &LogError) {
    let entered = IN_CALLBACK.with(|flag| !flag.replace(true));
    if !entered {
        tracing::trace!(error = %err, "suppressed log error raised inside error callback");
        return;
    }

    let _guard = CallbackGuard;
    handler(err);
}

pub fn discard_errors() -> ErrorHandler {
    Arc::new(|_| {})
}

/// Forwards log errors to `tracing` at WARN.
pub fn tracing_error_handler() -> ErrorHandler {
    Arc::new(|err| {
        tracing::warn!(error = %err, "structured log event degraded");
    })
}
