//! Preset arena layouts.

use crate::world::SimWorld;
use nalgebra::Vector2;
use robot_arena_core::{factory, EntityKind};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Two bump robots and two obstacles, the arena a fresh window opens with
    Default,

    /// Whisker robots in a grid of obstacles
    WhiskerMaze,

    /// Beam robots in a grid of obstacles
    BeamMaze,

    /// Mixed robots around two black holes
    BlackHoleSweep,

    /// Bump robots among teleport pads
    TeleportField,

    /// Many robots of every kind plus one of each special
    Crowd,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Default,
            ScenarioId::WhiskerMaze,
            ScenarioId::BeamMaze,
            ScenarioId::BlackHoleSweep,
            ScenarioId::TeleportField,
            ScenarioId::Crowd,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Default => "default",
            ScenarioId::WhiskerMaze => "whisker_maze",
            ScenarioId::BeamMaze => "beam_maze",
            ScenarioId::BlackHoleSweep => "black_hole_sweep",
            ScenarioId::TeleportField => "teleport_field",
            ScenarioId::Crowd => "crowd",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Default => "2 bump robots and 2 obstacles at random",
            ScenarioId::WhiskerMaze => "4 whisker robots in a 3x3 obstacle grid",
            ScenarioId::BeamMaze => "4 beam robots in a 3x3 obstacle grid",
            ScenarioId::BlackHoleSweep => "6 mixed robots and 2 black holes",
            ScenarioId::TeleportField => "4 bump robots, 3 teleport pads, 2 obstacles",
            ScenarioId::Crowd => "30 robots, 5 obstacles, a pad and a black hole",
        }
    }

    /// Fills `world` with this scenario's entities.
    pub fn populate(&self, world: &mut SimWorld) {
        match self {
            ScenarioId::Default => {
                spawn(world, EntityKind::BumpSensorRobot, 2);
                spawn(world, EntityKind::Obstacle, 2);
            }
            ScenarioId::WhiskerMaze => {
                obstacle_grid(world);
                spawn(world, EntityKind::WhiskerRobot, 4);
            }
            ScenarioId::BeamMaze => {
                obstacle_grid(world);
                spawn(world, EntityKind::BeamSensorRobot, 4);
            }
            ScenarioId::BlackHoleSweep => {
                spawn(world, EntityKind::BlackHole, 2);
                spawn(world, EntityKind::BumpSensorRobot, 2);
                spawn(world, EntityKind::WhiskerRobot, 2);
                spawn(world, EntityKind::BeamSensorRobot, 2);
            }
            ScenarioId::TeleportField => {
                spawn(world, EntityKind::TeleportPad, 3);
                spawn(world, EntityKind::Obstacle, 2);
                spawn(world, EntityKind::BumpSensorRobot, 4);
            }
            ScenarioId::Crowd => {
                spawn(world, EntityKind::Obstacle, 5);
                spawn(world, EntityKind::TeleportPad, 1);
                spawn(world, EntityKind::BlackHole, 1);
                for kind in [
                    EntityKind::BumpSensorRobot,
                    EntityKind::WhiskerRobot,
                    EntityKind::BeamSensorRobot,
                ] {
                    spawn(world, kind, 10);
                }
            }
        }
    }
}

fn spawn(world: &mut SimWorld, kind: EntityKind, count: usize) {
    for _ in 0..count {
        world.add_random(kind);
    }
}

/// Nine obstacles on a regular grid.
fn obstacle_grid(world: &mut SimWorld) {
    let radius = factory::default_radius(EntityKind::Obstacle);
    for row in 1..=3 {
        for col in 1..=3 {
            let position = Vector2::new(f64::from(col) * 125.0, f64::from(row) * 125.0);
            world.add_entity(factory::build(EntityKind::Obstacle, position, radius, 0.0, 0.0));
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(ScenarioId::Default),
            "whisker_maze" | "whiskermaze" => Ok(ScenarioId::WhiskerMaze),
            "beam_maze" | "beammaze" => Ok(ScenarioId::BeamMaze),
            "black_hole_sweep" | "blackholesweep" => Ok(ScenarioId::BlackHoleSweep),
            "teleport_field" | "teleportfield" => Ok(ScenarioId::TeleportField),
            "crowd" => Ok(ScenarioId::Crowd),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_names_parse_back() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
        }
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_populate_counts() {
        let mut world = SimWorld::new(&SimConfig::default());
        ScenarioId::WhiskerMaze.populate(&mut world);

        assert_eq!(world.arena().obstacle_count(), 9);
        assert_eq!(world.arena().count_by_kind(EntityKind::WhiskerRobot), 4);

        let mut crowd = SimWorld::new(&SimConfig::default());
        ScenarioId::Crowd.populate(&mut crowd);
        assert_eq!(crowd.arena().robot_count(), 30);
        assert_eq!(crowd.arena().len(), 37);
    }
}
