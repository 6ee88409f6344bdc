//! Run configuration.

use crate::error::SimError;
use robot_arena_core::TeleportPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a simulation run.
///
/// Every field is optional in a JSON config file; missing fields take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Ticks to run per scenario
    pub ticks: u64,

    /// Frame rate of the virtual clock in Hz
    pub frame_rate_hz: u32,

    /// Scenario name, or "all"
    pub scenario: String,

    /// Teleport handling in the collision pass
    pub teleport_policy: TeleportPolicy,

    /// Record an export frame every N ticks
    pub export_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 600,
            frame_rate_hz: 60,
            scenario: "default".to_string(),
            teleport_policy: TeleportPolicy::DedicatedPass,
            export_interval: 10,
        }
    }
}

impl SimConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_json(&text).map_err(|source| SimError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a JSON config string.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
