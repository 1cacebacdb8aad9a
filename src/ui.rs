//! UI-layer capabilities the core calls out to.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session core never renders anything. When it needs the user to see a
//! message or land on the login surface it goes through these two traits.
//! Both are best-effort and infallible: a missing notifier is configured as
//! [`NoopNotifier`], not discovered at runtime.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use std::sync::Mutex;

/// User-visible toast-style notifications.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);

    fn success(&self, _message: &str) {}
}

/// Single-argument navigation to a route such as `/auth/login`.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn error(&self, _message: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}
}

/// Routes notifications into the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(%message, "notify");
    }

    fn success(&self, message: &str) {
        tracing::info!(%message, "notify");
    }
}

/// Remembers every navigation; useful for front ends that act on the last
/// requested route after an operation returns.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All paths navigated to, oldest first.
    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(%path, "navigate");
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_owned());
        }
    }
}
