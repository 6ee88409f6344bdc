//! Randomly placed entities with kind-specific fixed parameters.

use crate::agent::Sensor;
use crate::entity::Entity;
use crate::kind::EntityKind;
use nalgebra::Vector2;
use rand::Rng;

/// Where a freshly added control bot appears.
pub const CONTROL_BOT_START: (f64, f64) = (250.0, 250.0);

/// Speed given to robots restored from a save file.
pub const LOADED_SPEED: f64 = 2.0;

/// Heading given to robots restored from a save file.
pub const LOADED_HEADING: f64 = 0.0;

/// Fixed radius for a kind.
pub fn default_radius(kind: EntityKind) -> f64 {
    match kind {
        EntityKind::BumpSensorRobot | EntityKind::WhiskerRobot | EntityKind::ControlBot => 15.0,
        EntityKind::BeamSensorRobot => 10.0,
        EntityKind::Obstacle | EntityKind::BlackHole => 20.0,
        EntityKind::TeleportPad => 15.0,
    }
}

/// Fixed speed for a kind (0 for statics).
pub fn default_speed(kind: EntityKind) -> f64 {
    match kind {
        EntityKind::BumpSensorRobot => 3.0,
        EntityKind::WhiskerRobot => 4.0,
        EntityKind::BeamSensorRobot => 5.0,
        EntityKind::ControlBot => 2.0,
        EntityKind::Obstacle | EntityKind::TeleportPad | EntityKind::BlackHole => 0.0,
    }
}

fn sensor_for(kind: EntityKind) -> Option<Sensor> {
    match kind {
        EntityKind::BumpSensorRobot => Some(Sensor::Bump),
        EntityKind::WhiskerRobot => Some(Sensor::Whisker),
        EntityKind::BeamSensorRobot => Some(Sensor::Beam),
        EntityKind::ControlBot => Some(Sensor::Manual),
        _ => None,
    }
}

/// Builds an entity at an explicit position.
pub fn build(kind: EntityKind, position: Vector2<f64>, radius: f64, speed: f64, heading: f64) -> Entity {
    match sensor_for(kind) {
        Some(sensor) => Entity::robot(sensor, position, radius, speed, heading),
        None => match kind {
            EntityKind::TeleportPad => Entity::teleport_pad(position, radius),
            EntityKind::BlackHole => Entity::black_hole(position, radius),
            _ => Entity::obstacle(position, radius),
        },
    }
}

/// Builds an entity restored from a persisted record.
///
/// Speed and heading are not persisted and reset to fixed values.
pub fn from_record(kind: EntityKind, x: f64, y: f64, radius: f64) -> Entity {
    build(kind, Vector2::new(x, y), radius, LOADED_SPEED, LOADED_HEADING)
}

/// Builds a randomly placed entity of `kind`.
///
/// Coordinates are whole numbers in `[10, 490)` and headings whole degrees.
/// The control bot always starts at the arena center facing east.
pub fn random_entity<R: Rng + ?Sized>(kind: EntityKind, rng: &mut R) -> Entity {
    let radius = default_radius(kind);
    let speed = default_speed(kind);

    if kind == EntityKind::ControlBot {
        let (x, y) = CONTROL_BOT_START;
        return build(kind, Vector2::new(x, y), radius, speed, 0.0);
    }

    let x = f64::from(rng.gen_range(0..480u32) + 10);
    let y = f64::from(rng.gen_range(0..480u32) + 10);
    let heading = if kind.is_mobile() {
        f64::from(rng.gen_range(0..360u32))
    } else {
        0.0
    };
    build(kind, Vector2::new(x, y), radius, speed, heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_entities_have_fixed_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for kind in EntityKind::all() {
            let entity = random_entity(kind, &mut rng);
            assert_eq!(entity.kind(), kind);
            assert_eq!(entity.radius(), default_radius(kind));
            assert!((10.0..490.0).contains(&entity.position.x));
            assert!((10.0..490.0).contains(&entity.position.y));
            if let Some(agent) = entity.agent() {
                assert_eq!(agent.speed, default_speed(kind));
                assert!((0.0..360.0).contains(&agent.heading));
                assert_eq!(agent.heading.fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_control_bot_starts_centered() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bot = random_entity(EntityKind::ControlBot, &mut rng);

        assert_eq!(bot.position, Vector2::new(250.0, 250.0));
        assert_eq!(bot.agent().map(|a| a.speed), Some(2.0));
    }

    #[test]
    fn test_from_record_resets_motion() {
        let entity = from_record(EntityKind::BeamSensorRobot, 12.5, 40.0, 10.0);
        let agent = entity.agent().unwrap();

        assert_eq!(agent.speed, LOADED_SPEED);
        assert_eq!(agent.heading, LOADED_HEADING);
        assert_eq!(entity.position, Vector2::new(12.5, 40.0));
    }
}
