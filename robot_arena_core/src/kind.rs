//! Entity kind tags.

use serde::{Deserialize, Serialize};

/// Closed set of everything that can live in the arena.
///
/// The textual tag returned by [`EntityKind::tag`] is the `Kind` column of
/// the persisted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Robot that only reacts after bumping into something
    BumpSensorRobot,

    /// Robot that turns 90° when its whiskers sense an obstacle
    WhiskerRobot,

    /// Robot that turns 67° when its beam senses an obstacle
    BeamSensorRobot,

    /// Manually driven robot
    ControlBot,

    /// Passive obstacle
    Obstacle,

    /// Relocates any robot touching it
    TeleportPad,

    /// Removes any robot touching it
    BlackHole,
}

impl EntityKind {
    /// Returns every kind, robots first.
    pub fn all() -> Vec<EntityKind> {
        vec![
            EntityKind::BumpSensorRobot,
            EntityKind::WhiskerRobot,
            EntityKind::BeamSensorRobot,
            EntityKind::ControlBot,
            EntityKind::Obstacle,
            EntityKind::TeleportPad,
            EntityKind::BlackHole,
        ]
    }

    /// Returns the persisted tag.
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::BumpSensorRobot => "BumpSensorRobot",
            EntityKind::WhiskerRobot => "WhiskerRobot",
            EntityKind::BeamSensorRobot => "BeamSensorRobot",
            EntityKind::ControlBot => "ControlBot",
            EntityKind::Obstacle => "Obstacle",
            EntityKind::TeleportPad => "TeleportPad",
            EntityKind::BlackHole => "BlackHole",
        }
    }

    /// Looks up a kind by its exact persisted tag. No aliases.
    pub fn from_tag(tag: &str) -> Option<EntityKind> {
        EntityKind::all().into_iter().find(|k| k.tag() == tag)
    }

    /// Returns true for kinds that carry a heading and speed.
    pub fn is_mobile(&self) -> bool {
        matches!(
            self,
            EntityKind::BumpSensorRobot
                | EntityKind::WhiskerRobot
                | EntityKind::BeamSensorRobot
                | EntityKind::ControlBot
        )
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(kind) = EntityKind::from_tag(s) {
            return Ok(kind);
        }
        match s.to_lowercase().as_str() {
            "bump" | "bump_sensor_robot" | "robot" => Ok(EntityKind::BumpSensorRobot),
            "whisker" | "whisker_robot" => Ok(EntityKind::WhiskerRobot),
            "beam" | "beam_sensor_robot" => Ok(EntityKind::BeamSensorRobot),
            "control" | "control_bot" | "manual" => Ok(EntityKind::ControlBot),
            "obstacle" => Ok(EntityKind::Obstacle),
            "teleport" | "teleport_pad" => Ok(EntityKind::TeleportPad),
            "black_hole" | "blackhole" => Ok(EntityKind::BlackHole),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}
