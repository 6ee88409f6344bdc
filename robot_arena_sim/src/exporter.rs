//! JSON exporter for offline visualization.
//!
//! Each exported frame carries both a plain snapshot of every entity and the
//! draw calls its render callback produced.

use nalgebra::Vector2;
use robot_arena_core::{Color, Entity, EntityKind, Surface};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
    },
    StrokeCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        width: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
}

/// A surface that records draw calls.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the recorded ops, leaving the list empty.
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Surface for DrawList {
    fn fill_circle(&mut self, center: Vector2<f64>, radius: f64, color: Color) {
        self.ops.push(DrawOp::FillCircle {
            x: center.x,
            y: center.y,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vector2<f64>, radius: f64, color: Color, width: f64) {
        self.ops.push(DrawOp::StrokeCircle {
            x: center.x,
            y: center.y,
            radius,
            color,
            width,
        });
    }

    fn line(&mut self, from: Vector2<f64>, to: Vector2<f64>, color: Color, width: f64) {
        self.ops.push(DrawOp::Line {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            color,
            width,
        });
    }
}

/// Snapshot of an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u64,
    pub kind: EntityKind,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id().0,
            kind: entity.kind(),
            x: entity.position.x,
            y: entity.position.y,
            radius: entity.radius(),
            heading: entity.agent().map(|a| a.heading),
        }
    }
}

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Tick number
    pub tick: u64,

    /// Virtual time in seconds
    pub time_sec: f64,

    /// Every entity at this tick
    pub entities: Vec<EntitySnapshot>,

    /// Draw calls for this tick
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub draw: Vec<DrawOp>,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final result
    pub passed: bool,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            frames: Vec::new(),
            passed: false,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool) {
        self.passed = passed;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
