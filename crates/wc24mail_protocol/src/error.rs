//! Error types for protocol parsing.

use thiserror::Error;

/// Failure to parse the authentication payload.
///
/// The two variants exist for logging only. On the wire both collapse
/// into the same generic authentication error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The field was absent or empty.
    #[error("authentication payload is empty")]
    Empty,

    /// The payload did not match the two-line grammar exactly.
    #[error("authentication payload is malformed")]
    Malformed,
}
