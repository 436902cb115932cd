//! Error logging collaborator
//!
//! Components that must report a condition without failing (rejected storage
//! keys, a shared-session cookie that could not be written) take an injected
//! [`Logger`]. [`NullLogger`] discards everything, [`TracingLogger`] forwards
//! to `tracing`.

use std::sync::Arc;

/// Sink for error-level messages
pub trait Logger: Send + Sync {
    /// Record an error-level message
    fn error(&self, message: &str);
}

/// Logger that drops every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn error(&self, _message: &str) {}
}

/// Logger backed by `tracing::error!`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!(target: "salvo_shared_session", "{}", message);
    }
}

pub(crate) fn null() -> Arc<dyn Logger> {
    Arc::new(NullLogger)
}
