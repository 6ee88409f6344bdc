//! The arena: entity ownership and the per-tick simulation step.

use crate::agent::Direction;
use crate::entity::{teleport, Entity, EntityId};
use crate::factory;
use crate::kind::EntityKind;
use nalgebra::Vector2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Side length of the square arena.
pub const ARENA_SIZE: f64 = 500.0;

/// Where teleport pads act during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportPolicy {
    /// Only the dedicated teleport pass relocates robots
    #[default]
    DedicatedPass,

    /// The collision pass teleports again on pad contact, so a robot can
    /// jump twice per tick
    Reference,
}

impl std::fmt::Display for TeleportPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeleportPolicy::DedicatedPass => write!(f, "dedicated"),
            TeleportPolicy::Reference => write!(f, "reference"),
        }
    }
}

impl std::str::FromStr for TeleportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dedicated" | "dedicated_pass" | "once" => Ok(TeleportPolicy::DedicatedPass),
            "reference" | "double" => Ok(TeleportPolicy::Reference),
            _ => Err(format!("Unknown teleport policy: {}", s)),
        }
    }
}

/// Configuration for an arena.
#[derive(Debug, Clone, Default)]
pub struct ArenaConfig {
    /// Seed for teleport targets and default placement (`None` = entropy)
    pub seed: Option<u64>,

    /// Teleport handling in the collision pass
    pub teleport_policy: TeleportPolicy,
}

/// Read-only view of every entity except the one being updated.
///
/// Entities earlier in the arena have already been advanced this tick.
#[derive(Debug, Clone, Copy)]
pub struct ArenaView<'a> {
    before: &'a [Entity],
    after: &'a [Entity],
}

impl<'a> ArenaView<'a> {
    /// Creates a view from the entities before and after the current one.
    pub fn new(before: &'a [Entity], after: &'a [Entity]) -> Self {
        Self { before, after }
    }

    /// Iterates the visible entities in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> + 'a {
        self.before.iter().chain(self.after.iter())
    }

    /// Number of visible entities.
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    /// True if nothing else is in the arena.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What one call to [`Arena::advance`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Robots removed by black holes
    pub absorbed: Vec<EntityId>,

    /// Teleports performed (both passes)
    pub teleports: usize,

    /// Heading reversals from robot/obstacle and robot/robot contact
    pub collisions: usize,
}

/// Owns every entity and runs the simulation step.
pub struct Arena {
    /// Entities in insertion order
    entities: Vec<Entity>,

    /// Next id to hand out
    next_id: u64,

    /// RNG for teleport targets and random placement
    rng: ChaCha8Rng,

    /// Configuration
    config: ArenaConfig,

    /// Ticks advanced so far
    tick_count: u64,
}

impl Arena {
    /// Creates an empty arena.
    pub fn new(config: ArenaConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            entities: Vec::new(),
            next_id: 1,
            rng,
            config,
            tick_count: 0,
        }
    }

    /// Creates an arena with two bump robots and two obstacles at random
    /// positions.
    pub fn with_default_layout(config: ArenaConfig) -> Self {
        let mut arena = Self::new(config);
        for kind in [
            EntityKind::BumpSensorRobot,
            EntityKind::BumpSensorRobot,
            EntityKind::Obstacle,
            EntityKind::Obstacle,
        ] {
            arena.spawn_random(kind);
        }
        arena
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Changes how teleport pads act in the collision pass.
    pub fn set_teleport_policy(&mut self, policy: TeleportPolicy) {
        self.config.teleport_policy = policy;
    }

    /// Adds an entity and returns its id.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// Adds a randomly placed entity of `kind` using the arena's RNG.
    pub fn spawn_random(&mut self, kind: EntityKind) -> EntityId {
        let entity = factory::random_entity(kind, &mut self.rng);
        self.add_entity(entity)
    }

    /// Removes an entity by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Removes every entity.
    pub fn remove_all(&mut self) {
        self.entities.clear();
    }

    /// Replaces the contents with `entities`, assigning fresh ids.
    pub fn replace_with(&mut self, entities: Vec<Entity>) -> Vec<EntityId> {
        self.remove_all();
        entities.into_iter().map(|e| self.add_entity(e)).collect()
    }

    /// The live entity list in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Mutable access to an entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True if the arena holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Counts entities of one kind.
    pub fn count_by_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind() == kind).count()
    }

    /// Counts robots of every variant.
    pub fn robot_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_mobile()).count()
    }

    /// Counts plain obstacles.
    pub fn obstacle_count(&self) -> usize {
        self.count_by_kind(EntityKind::Obstacle)
    }

    /// First entity (insertion order) whose bounding square holds `point`.
    pub fn entity_at(&self, point: Vector2<f64>) -> Option<EntityId> {
        self.entities.iter().find(|e| e.contains(point)).map(|e| e.id)
    }

    /// Applies a directional command to a manually driven robot.
    ///
    /// Returns false if `id` is not a control bot.
    pub fn move_agent(&mut self, id: EntityId, direction: Direction) -> bool {
        let Some(entity) = self.get_mut(id) else {
            return false;
        };
        if entity.kind() != EntityKind::ControlBot {
            return false;
        }
        let mut position = entity.position;
        if let Some(agent) = entity.agent() {
            agent.apply_move(&mut position, direction);
        }
        entity.set_position(position);
        true
    }

    /// Ticks advanced so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advances the simulation by one tick.
    ///
    /// Runs, in order: integrate every entity, absorb robots touching black
    /// holes, teleport robots touching pads, then resolve pairwise
    /// collisions. Never fails.
    pub fn advance(&mut self) -> TickReport {
        let mut report = TickReport::default();

        self.integrate();
        report.absorbed = self.absorb();
        report.teleports = self.teleport_pass();
        let (collisions, teleports) = self.collision_pass();
        report.collisions = collisions;
        report.teleports += teleports;

        self.tick_count += 1;
        trace!(
            "tick {} | entities={} absorbed={} teleports={} collisions={}",
            self.tick_count,
            self.entities.len(),
            report.absorbed.len(),
            report.teleports,
            report.collisions
        );
        report
    }

    /// Updates each entity in order, giving it a view of all the others.
    fn integrate(&mut self) {
        for i in 0..self.entities.len() {
            let (before, rest) = self.entities.split_at_mut(i);
            if let Some((current, after)) = rest.split_first_mut() {
                current.update(ArenaView::new(before, after));
            }
        }
    }

    /// Removes robots overlapping any black hole.
    ///
    /// All pairs are tested against the pre-removal list.
    fn absorb(&mut self) -> Vec<EntityId> {
        let absorbed: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|robot| robot.is_mobile())
            .filter(|robot| self.entities.iter().any(|hole| hole.absorbs(robot)))
            .map(|robot| robot.id)
            .collect();

        if !absorbed.is_empty() {
            self.entities.retain(|e| {
                let gone = absorbed.contains(&e.id);
                if gone {
                    debug!("{} {} was absorbed by a black hole", e.kind(), e.id);
                }
                !gone
            });
        }
        absorbed
    }

    /// Relocates robots overlapping teleport pads.
    ///
    /// A robot is re-tested against each later pad after every move, so
    /// it may jump more than once per tick.
    fn teleport_pass(&mut self) -> usize {
        let pads: Vec<usize> = self.indices_where(Entity::is_teleport_pad);
        let robots: Vec<usize> = self.indices_where(Entity::is_mobile);

        let mut teleports = 0;
        for &i in &robots {
            for &j in &pads {
                if self.entities[i].check_collision(&self.entities[j]) {
                    teleport(&mut self.rng, &mut self.entities[i]);
                    teleports += 1;
                }
            }
        }
        teleports
    }

    /// Resolves every ordered (robot, other) pair.
    ///
    /// Returns (heading reversals, teleports).
    fn collision_pass(&mut self) -> (usize, usize) {
        let mut collisions = 0;
        let mut teleports = 0;

        for i in 0..self.entities.len() {
            if !self.entities[i].is_mobile() {
                continue;
            }
            for j in 0..self.entities.len() {
                if i == j {
                    continue;
                }
                let other = &self.entities[j];
                if !self.entities[i].check_collision(other) {
                    continue;
                }
                let (physical, pad) = (other.collides_physically(), other.is_teleport_pad());
                if physical {
                    if let Some(agent) = self.entities[i].agent_mut() {
                        agent.reverse();
                        collisions += 1;
                    }
                } else if pad && self.config.teleport_policy == TeleportPolicy::Reference {
                    teleport(&mut self.rng, &mut self.entities[i]);
                    teleports += 1;
                }
            }
        }
        (collisions, teleports)
    }

    fn indices_where(&self, predicate: impl Fn(&Entity) -> bool) -> Vec<usize> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| predicate(e))
            .map(|(i, _)| i)
            .collect()
    }
}
