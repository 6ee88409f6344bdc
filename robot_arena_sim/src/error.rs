//! Error types for the simulation shell.

use robot_arena_core::ArenaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the shell and the CLI.
#[derive(Debug, Error)]
pub enum SimError {
    /// Save/load of an arena file failed
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// Config or export file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file was not valid JSON for `SimConfig`
    #[error("Invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Scenario name not recognised
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

impl SimError {
    /// Creates an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
