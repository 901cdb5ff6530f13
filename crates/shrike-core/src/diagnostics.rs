//! Diagnostics reported by compiler phases.

use parking_lot::Mutex;

use crate::origin::Origin;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub origin: Option<Origin>,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            origin: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Sink for diagnostics emitted by phases.
///
/// Implementations must be callable from worker threads; the planner reports
/// per-interface failures concurrently.
pub trait DiagnosticsHandler: Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Accumulates diagnostics behind a mutex for later inspection.
#[derive(Default)]
pub struct CollectingDiagnostics {
    inner: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.inner.lock().clone()
    }

    pub fn has_errors(&self) -> bool {
        self.inner
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl DiagnosticsHandler for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.inner.lock().push(diagnostic);
    }
}

/// Discards everything. Useful for callers that only care about the outcome.
pub struct IgnoreDiagnostics;

impl DiagnosticsHandler for IgnoreDiagnostics {
    fn report(&self, _diagnostic: Diagnostic) {}
}
