//! Error reporting.

use std::fmt::Display;

/// External sink for non-fatal errors, tagged with a short reason.
///
/// Errors are always written to the log before being forwarded here.
/// Reporting must not block the response path.
pub trait ErrorReporter: Send + Sync {
    /// Reports `error` with a human-readable `reason`.
    fn report(&self, reason: &str, error: &dyn Display);
}

/// Reporter used when no external sink is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ErrorReporter for NullReporter {
    fn report(&self, _reason: &str, _error: &dyn Display) {}
}
