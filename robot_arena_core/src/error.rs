//! Error types for arena persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving or loading an arena.
///
/// The simulation step itself never fails; only the flat-text persistence
/// layer produces these.
#[derive(Debug, Error)]
pub enum ArenaError {
    /// The file could not be read or written. Aborts the whole operation.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record had the wrong number of fields or an unusable number.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A well-formed record named a kind this arena does not know.
    #[error("Unknown kind '{kind}' on line {line}")]
    UnknownKind { line: usize, kind: String },
}

impl ArenaError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed-record error.
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            reason: reason.into(),
        }
    }

    /// Returns true if this error only invalidates a single record.
    pub fn is_record_error(&self) -> bool {
        !matches!(self, Self::Io { .. })
    }
}
