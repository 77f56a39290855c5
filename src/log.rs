//! Injectable diagnostic logging.
//!
//! The parser never writes to a global sink. Callers hand it a [`Logger`];
//! [`NoopLogger`] is used when none is given.

/// A diagnostic sink. Implementations must not panic.
pub trait Logger {
    fn log(&self, message: &str);
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    #[inline]
    fn log(&self, _message: &str) {}
}

/// Forwards messages to `tracing` at debug level under the `proxyparse` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::debug!(target: "proxyparse", "{message}");
    }
}

impl<F: Fn(&str)> Logger for F {
    fn log(&self, message: &str) {
        self(message)
    }
}
