//! Audit listeners and the fan-out dispatcher.

use crate::types::{AuditSummary, Violation};
use crate::walker::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::warn;

/// A listener failure. The dispatcher logs it and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Writing output failed.
    #[error("listener I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Result type of listener callbacks.
pub type ListenerResult = Result<(), ListenerError>;

/// Receives audit events.
///
/// Per run: `audit_started` once, then for every checked file
/// `file_started`, one `add_error` per reported violation in sorted order
/// and `file_finished`, then `audit_finished` once. Paths are relative to
/// the configured base directory when one is set.
pub trait AuditListener: Send {
    /// The run is about to start.
    fn audit_started(&mut self) -> ListenerResult {
        Ok(())
    }

    /// A file is about to be reported.
    fn file_started(&mut self, _path: &Path) -> ListenerResult {
        Ok(())
    }

    /// One violation of the current file.
    fn add_error(&mut self, path: &Path, violation: &Violation) -> ListenerResult;

    /// The current file could not be processed.
    fn add_exception(&mut self, _path: &Path, _error: &str) -> ListenerResult {
        Ok(())
    }

    /// The current file is done.
    fn file_finished(&mut self, _path: &Path) -> ListenerResult {
        Ok(())
    }

    /// The run is done.
    fn audit_finished(&mut self, _summary: &AuditSummary) -> ListenerResult {
        Ok(())
    }
}

/// Fans events out to every listener, isolating failures.
///
/// A listener that returns an error or panics is logged at `warn` and
/// counted; the remaining listeners still receive the event.
#[derive(Default)]
pub struct ListenerDispatcher {
    listeners: Vec<Box<dyn AuditListener>>,
    failures: usize,
}

impl std::fmt::Debug for ListenerDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerDispatcher")
            .field("listeners", &self.listeners.len())
            .field("failures", &self.failures)
            .finish()
    }
}

impl ListenerDispatcher {
    /// Creates a dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    pub fn add(&mut self, listener: Box<dyn AuditListener>) {
        self.listeners.push(listener);
    }

    /// Number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if there are no listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Failed callbacks so far.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Fires `audit_started`.
    pub fn audit_started(&mut self) {
        self.fire("audit_started", |l| l.audit_started());
    }

    /// Fires `file_started`.
    pub fn file_started(&mut self, path: &Path) {
        self.fire("file_started", |l| l.file_started(path));
    }

    /// Fires `add_error`.
    pub fn add_error(&mut self, path: &Path, violation: &Violation) {
        self.fire("add_error", |l| l.add_error(path, violation));
    }

    /// Fires `add_exception`.
    pub fn add_exception(&mut self, path: &Path, error: &str) {
        self.fire("add_exception", |l| l.add_exception(path, error));
    }

    /// Fires `file_finished`.
    pub fn file_finished(&mut self, path: &Path) {
        self.fire("file_finished", |l| l.file_finished(path));
    }

    /// Fires `audit_finished`.
    pub fn audit_finished(&mut self, summary: &AuditSummary) {
        self.fire("audit_finished", |l| l.audit_finished(summary));
    }

    fn fire<F>(&mut self, event: &'static str, mut call: F)
    where
        F: FnMut(&mut dyn AuditListener) -> ListenerResult,
    {
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| call(listener.as_mut())));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            self.failures += 1;
            warn!(listener = index, event, error = %error, "audit listener failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl AuditListener for Recorder {
        fn audit_started(&mut self) -> ListenerResult {
            self.events.lock().push("start".to_string());
            Ok(())
        }
        fn add_error(&mut self, path: &Path, violation: &Violation) -> ListenerResult {
            self.events
                .lock()
                .push(format!("{}:{}", path.display(), violation.line));
            Ok(())
        }
        fn audit_finished(&mut self, _summary: &AuditSummary) -> ListenerResult {
            self.events.lock().push("finish".to_string());
            Ok(())
        }
    }

    struct Broken;

    impl AuditListener for Broken {
        fn audit_started(&mut self) -> ListenerResult {
            Err(ListenerError::Other("disk full".to_string()))
        }
        fn add_error(&mut self, _path: &Path, _violation: &Violation) -> ListenerResult {
            panic!("listener bug");
        }
    }

    #[test]
    fn failures_are_isolated_and_counted() {
        let recorder = Recorder::default();
        let mut dispatcher = ListenerDispatcher::new();
        dispatcher.add(Box::new(Broken));
        dispatcher.add(Box::new(recorder.clone()));

        let violation = Violation::new(3, 1, Severity::Error, "k", "m", "s");
        dispatcher.audit_started();
        dispatcher.add_error(Path::new("a.rs"), &violation);
        dispatcher.audit_finished(&AuditSummary::default());

        assert_eq!(*recorder.events.lock(), vec!["start", "a.rs:3", "finish"]);
        assert_eq!(dispatcher.failures(), 2);
    }
}
