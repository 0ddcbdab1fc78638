//! Injected log sink.
//!
//! Components that report diagnostics take a [`LogSink`] instead of reaching for a
//! process-wide logger. The default sink discards everything; binaries usually
//! install [`LogSink::forward_to_log`] so messages land on the `log` facade.

use std::fmt;
use std::sync::Arc;

type Handler = dyn Fn(&str) + Send + Sync;

/// Cloneable handle to a message callback. Invocation is synchronous and unbuffered.
#[derive(Clone)]
pub struct LogSink {
    handler: Arc<Handler>,
}

impl LogSink {
    /// Wrap an arbitrary handler. The handler must provide its own synchronisation.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Sink that drops every message.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Sink that re-emits messages through the `log` crate at `level`.
    pub fn forward_to_log(level: log::Level) -> Self {
        Self::new(move |message| log::log!(target: "coast", level, "{message}"))
    }

    /// Dispatch a message to the handler.
    #[inline]
    pub fn log(&self, message: &str) {
        (self.handler)(message);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink").finish_non_exhaustive()
    }
}
