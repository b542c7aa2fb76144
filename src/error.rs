//! Classified errors returned by transform construction and mutation.
//!
//! Internal consistency failures are not represented here:
//! those are programming errors and panic in the invariant checker instead.
use std::fmt;

/// Classification of an [Error].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The arguments are inconsistent with the transform they are applied to.
    InvalidArgument,
    /// An index or bound lies outside the range it must fall within.
    OutOfRange,
    /// The transform is not in a state which permits the operation.
    FailedPrecondition,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::OutOfRange => "OUT_OF_RANGE",
            ErrorKind::FailedPrecondition => "FAILED_PRECONDITION",
        };
        f.write_str(s)
    }
}

/// An error kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FailedPrecondition, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepend some context to the message, separated by `": "`.
    pub fn annotate(mut self, context: impl fmt::Display) -> Self {
        self.message = if self.message.is_empty() {
            context.to_string()
        } else {
            format!("{context}: {}", self.message)
        };
        self
    }

    /// Replace the error's classification, keeping the message.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Reclassify argument errors as precondition failures.
    ///
    /// Used where the offending value was not supplied by the immediate caller
    /// but is a property of a transform they already hold.
    pub fn into_failed_precondition(self) -> Self {
        match self.kind {
            ErrorKind::InvalidArgument | ErrorKind::OutOfRange => {
                self.with_kind(ErrorKind::FailedPrecondition)
            }
            _ => self,
        }
    }
}
