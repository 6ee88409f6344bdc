//! Robot Arena headless shell
//!
//! Everything a desktop front end does around the arena, without a window:
//! a command surface for adding, selecting, dragging and deleting entities,
//! a paused/running switch, control-bot key handling, save/load, and a
//! deterministic scenario runner for CI.
//!
//! # Determinism
//!
//! All randomness is derived from one 64-bit seed:
//! - the arena's teleport RNG gets `(seed ^ PHYSICS_SALT) * 0x9e3779b97f4a7c15`
//! - random placement gets `(seed ^ SPAWN_SALT) * 0x517cc1b727220a95`
//!
//! so any run can be replayed from its seed.
//!
//! # Usage
//!
//! ```ignore
//! use robot_arena_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let result = ScenarioRunner::new(42).with_ticks(600).run(ScenarioId::WhiskerMaze);
//! assert!(result.passed);
//! ```

mod config;
mod context;
mod error;
mod exporter;
mod runner;
mod world;
pub mod scenarios;

pub use config::SimConfig;
pub use context::SimContext;
pub use error::SimError;
pub use exporter::{DrawList, DrawOp, EntitySnapshot, SimExport, SimFrame};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
pub use world::{ArenaSummary, LoadOutcome, SimWorld};
