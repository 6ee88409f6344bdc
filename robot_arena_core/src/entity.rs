//! Arena entities.
//!
//! Every simulated thing is an [`Entity`]: a circle with a tagged [`Body`].
//! Kind-specific behaviour is dispatched on the tag instead of on type
//! tests, so the arena can ask capability questions (`is_mobile`,
//! `is_teleport_pad`, ...) in constant time.

use crate::agent::{MobileAgent, Sensor};
use crate::arena::ArenaView;
use crate::kind::EntityKind;
use crate::render::{Color, Surface};
use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identity of an entity inside one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Body {
    /// Any self-propelled or manually driven robot
    Agent(MobileAgent),

    /// Passive obstacle
    Obstacle,

    /// Relocates colliding robots to a random spot
    TeleportPad,

    /// Absorbs colliding robots
    BlackHole,
}

/// A circle in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Assigned by the arena on insertion; `EntityId(0)` until then
    pub(crate) id: EntityId,

    /// Center in arena coordinates
    pub position: Vector2<f64>,

    /// Fixed after construction
    radius: f64,

    /// Kind-specific state
    pub body: Body,
}

impl Entity {
    /// Creates an entity. `radius` must be positive and finite.
    pub fn new(position: Vector2<f64>, radius: f64, body: Body) -> Self {
        debug_assert!(radius.is_finite() && radius > 0.0, "radius must be positive");
        Self {
            id: EntityId(0),
            position,
            radius,
            body,
        }
    }

    /// Creates a robot with the given sensor.
    pub fn robot(
        sensor: Sensor,
        position: Vector2<f64>,
        radius: f64,
        speed: f64,
        heading: f64,
    ) -> Self {
        Self::new(position, radius, Body::Agent(MobileAgent::new(sensor, speed, heading)))
    }

    /// Creates a passive obstacle.
    pub fn obstacle(position: Vector2<f64>, radius: f64) -> Self {
        Self::new(position, radius, Body::Obstacle)
    }

    /// Creates a teleport pad.
    pub fn teleport_pad(position: Vector2<f64>, radius: f64) -> Self {
        Self::new(position, radius, Body::TeleportPad)
    }

    /// Creates a black hole.
    pub fn black_hole(position: Vector2<f64>, radius: f64) -> Self {
        Self::new(position, radius, Body::BlackHole)
    }

    /// Returns the entity's id.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Moves the center (drag, teleport, manual commands).
    pub fn set_position(&mut self, position: Vector2<f64>) {
        self.position = position;
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> EntityKind {
        match &self.body {
            Body::Agent(agent) => match agent.sensor {
                Sensor::Bump => EntityKind::BumpSensorRobot,
                Sensor::Whisker => EntityKind::WhiskerRobot,
                Sensor::Beam => EntityKind::BeamSensorRobot,
                Sensor::Manual => EntityKind::ControlBot,
            },
            Body::Obstacle => EntityKind::Obstacle,
            Body::TeleportPad => EntityKind::TeleportPad,
            Body::BlackHole => EntityKind::BlackHole,
        }
    }

    /// Returns the agent state if this is a robot.
    pub fn agent(&self) -> Option<&MobileAgent> {
        match &self.body {
            Body::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    /// Mutable access to the agent state.
    pub fn agent_mut(&mut self) -> Option<&mut MobileAgent> {
        match &mut self.body {
            Body::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self.body, Body::Agent(_))
    }

    pub fn is_obstacle(&self) -> bool {
        matches!(self.body, Body::Obstacle)
    }

    pub fn is_teleport_pad(&self) -> bool {
        matches!(self.body, Body::TeleportPad)
    }

    pub fn is_black_hole(&self) -> bool {
        matches!(self.body, Body::BlackHole)
    }

    /// True for entities a robot bounces off (obstacles and other robots).
    pub fn collides_physically(&self) -> bool {
        matches!(self.body, Body::Agent(_) | Body::Obstacle)
    }

    /// Distance between centers.
    pub fn distance_to(&self, other: &Entity) -> f64 {
        (self.position - other.position).norm()
    }

    /// True iff the circles overlap. Touching circles do not collide.
    pub fn check_collision(&self, other: &Entity) -> bool {
        self.distance_to(other) < self.radius + other.radius
    }

    /// Reverses a robot's heading if it overlaps `other`.
    ///
    /// Returns whether a collision was handled. Non-robots ignore the call.
    pub fn handle_collision(&mut self, other: &Entity) -> bool {
        if !self.check_collision(other) {
            return false;
        }
        match self.agent_mut() {
            Some(agent) => {
                agent.reverse();
                true
            }
            None => false,
        }
    }

    /// True iff this is a black hole overlapping the robot `agent`.
    pub fn absorbs(&self, agent: &Entity) -> bool {
        self.is_black_hole() && agent.is_mobile() && self.check_collision(agent)
    }

    /// Advances one tick. `view` holds every other entity in the arena.
    pub fn update(&mut self, view: ArenaView<'_>) {
        let radius = self.radius;
        if let Body::Agent(agent) = &mut self.body {
            agent.step(&mut self.position, radius, view);
        }
    }

    /// Draws the entity.
    pub fn render(&self, surface: &mut dyn Surface) {
        match &self.body {
            Body::Agent(agent) => agent.render(self.position, self.radius, surface),
            Body::Obstacle => surface.fill_circle(self.position, self.radius, Color::Gray),
            Body::TeleportPad => {
                surface.fill_circle(self.position, self.radius, Color::Purple);
                surface.stroke_circle(self.position, self.radius, Color::Yellow, 2.0);
            }
            Body::BlackHole => surface.fill_circle(self.position, self.radius, Color::Black),
        }
    }

    /// Draws the selection ring around the entity.
    pub fn render_highlight(&self, surface: &mut dyn Surface) {
        surface.stroke_circle(self.position, self.radius + 2.0, Color::Red, 2.0);
    }

    /// True iff `point` lies within the entity's bounding square.
    pub fn contains(&self, point: Vector2<f64>) -> bool {
        (point.x - self.position.x).abs() <= self.radius
            && (point.y - self.position.y).abs() <= self.radius
    }
}

/// Lower bound of a teleport target coordinate.
pub const TELEPORT_MIN: f64 = 10.0;

/// Upper bound of a teleport target coordinate.
pub const TELEPORT_MAX: f64 = 490.0;

/// Moves `target` to a fresh uniformly random point in
/// `[TELEPORT_MIN, TELEPORT_MAX)²`.
pub fn teleport<R: Rng + ?Sized>(rng: &mut R, target: &mut Entity) {
    let destination = Vector2::new(
        rng.gen_range(TELEPORT_MIN..TELEPORT_MAX),
        rng.gen_range(TELEPORT_MIN..TELEPORT_MAX),
    );
    tracing::debug!(
        "{} {} teleported to ({:.1}, {:.1})",
        target.kind(),
        target.id,
        destination.x,
        destination.y
    );
    target.set_position(destination);
}
