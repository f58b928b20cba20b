use std::time::Duration;

use thiserror::Error;

/// Error produced while compiling a date-format string into a `FormatSpec`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("empty format string")]
    Empty,
    #[error("unrecognized token {found:?} in format string")]
    UnknownToken { found: String },
}

/// Error produced while parsing date text against a `FormatSpec`.
///
/// The codec's public contract returns `Option<Timestamp>`; this type names
/// the failure cases internally and for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("format string does not declare {field}")]
    MissingField { field: &'static str },
    #[error("date text does not contain enough digit runs for the declared format")]
    NotEnoughDigitRuns,
    #[error("{field} value {value} is out of range")]
    OutOfRange { field: &'static str, value: u32 },
    #[error("digit run {run:?} does not fit a {field} value")]
    Overflow { field: &'static str, run: String },
}

/// Failure of an external collaborator (display sink, authoritative time
/// source, OS time-setting capability).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
