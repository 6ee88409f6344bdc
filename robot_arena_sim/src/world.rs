//! SimWorld - the headless presentation shell.
//!
//! Holds everything a desktop window would keep around the arena: the
//! running/paused flag, the current selection, the active control bot and
//! which movement keys are held. All mutation happens between ticks.

use crate::config::SimConfig;
use crate::context::SimContext;
use crate::error::SimError;

use nalgebra::Vector2;
use robot_arena_core::{
    factory, persistence, Arena, ArenaConfig, ArenaError, Direction, Entity, EntityId, EntityKind,
    Surface, TickReport,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of loading an arena file into the world.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Entities now in the arena
    pub loaded: usize,

    /// Records that were skipped
    pub skipped: Vec<ArenaError>,
}

/// Text shown next to the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaSummary {
    pub robots: usize,
    pub obstacles: usize,
    pub control_bot: Option<Vector2<f64>>,
    pub selected: Option<(EntityKind, Vector2<f64>)>,
}

impl std::fmt::Display for ArenaSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Robots: {}", self.robots)?;
        writeln!(f, "Obstacles: {}", self.obstacles)?;

        match self.control_bot {
            Some(p) => {
                writeln!(f, "\nControlBot Position:")?;
                writeln!(f, "  X: {}", p.x as i64)?;
                writeln!(f, "  Y: {}", p.y as i64)?;
            }
            None => writeln!(f, "\nControlBot: Not added")?,
        }

        match self.selected {
            Some((kind, p)) => {
                writeln!(f, "\nSelected Object:")?;
                writeln!(f, "  Type: {}", kind)?;
                writeln!(f, "  X: {}", p.x as i64)?;
                writeln!(f, "  Y: {}", p.y as i64)
            }
            None => writeln!(f, "\nSelected Object: None"),
        }
    }
}

/// The SimWorld - arena plus shell state.
pub struct SimWorld {
    /// Seeds and virtual clock
    pub context: SimContext,

    /// The simulated arena
    arena: Arena,

    /// Whether frames advance the simulation
    running: bool,

    /// Entity picked while paused
    selected: Option<EntityId>,

    /// The single manually driven robot, if any
    control_bot: Option<EntityId>,

    /// Movement keys currently held
    held: HashSet<Direction>,
}

impl SimWorld {
    /// Creates a world with an empty arena.
    pub fn new(config: &SimConfig) -> Self {
        let context = SimContext::new(config.seed, config.frame_rate_hz);
        let arena = Arena::new(ArenaConfig {
            seed: Some(context.physics_seed()),
            teleport_policy: config.teleport_policy,
        });

        Self {
            context,
            arena,
            running: false,
            selected: None,
            control_bot: None,
            held: HashSet::new(),
        }
    }

    /// The arena.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Mutable access to the arena, for scenario setup.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Adds an explicitly built entity, tracking it if it is a control bot.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let is_bot = entity.kind() == EntityKind::ControlBot;
        let id = self.arena.add_entity(entity);
        if is_bot && self.control_bot.is_none() {
            self.control_bot = Some(id);
        }
        id
    }

    /// Adds a randomly placed entity of `kind`.
    ///
    /// Only one control bot may exist; asking for a second returns `None`.
    pub fn add_random(&mut self, kind: EntityKind) -> Option<EntityId> {
        if kind == EntityKind::ControlBot && self.control_bot.is_some() {
            debug!("Control bot already present");
            return None;
        }
        let entity = factory::random_entity(kind, self.context.spawn_rng());
        Some(self.add_entity(entity))
    }

    /// Starts driving ticks. Clears the selection.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.selected = None;
            info!("Simulation started");
        }
    }

    /// Stops driving ticks.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            info!("Simulation stopped after {} frames", self.context.frames());
        }
    }

    /// Whether frames advance the simulation.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Selects the entity under `point`. Only possible while stopped.
    pub fn select_at(&mut self, point: Vector2<f64>) -> Option<EntityId> {
        if self.running {
            return None;
        }
        self.selected = self.arena.entity_at(point);
        self.selected
    }

    /// Currently selected entity.
    pub fn selected(&self) -> Option<EntityId> {
        self.selected
    }

    /// Moves the selected entity to `point`. Only possible while stopped.
    pub fn drag_selected(&mut self, point: Vector2<f64>) -> bool {
        if self.running {
            return false;
        }
        let Some(id) = self.selected else {
            return false;
        };
        match self.arena.get_mut(id) {
            Some(entity) => {
                entity.set_position(point);
                true
            }
            None => false,
        }
    }

    /// Removes the selected entity.
    pub fn remove_selected(&mut self) -> Option<Entity> {
        let id = self.selected.take()?;
        if self.control_bot == Some(id) {
            self.control_bot = None;
        }
        self.arena.remove(id)
    }

    /// Empties the arena.
    pub fn clear_all(&mut self) {
        self.arena.remove_all();
        self.control_bot = None;
        self.selected = None;
    }

    /// The active control bot.
    pub fn control_bot(&self) -> Option<EntityId> {
        self.control_bot
    }

    /// Marks a movement key as held.
    pub fn press(&mut self, direction: Direction) {
        if self.control_bot.is_some() {
            self.held.insert(direction);
        }
    }

    /// Marks a movement key as released.
    pub fn release(&mut self, direction: Direction) {
        self.held.remove(&direction);
    }

    /// Drives one frame.
    ///
    /// While running: advance the arena, then render, then apply held
    /// movement keys to the control bot. While paused only renders.
    pub fn frame(&mut self, surface: &mut dyn Surface) -> Option<TickReport> {
        let report = if self.running {
            let report = self.arena.advance();
            self.context.advance_frame();
            self.forget_absorbed(&report);
            Some(report)
        } else {
            None
        };

        self.render(surface);

        if self.running {
            if let Some(bot) = self.control_bot {
                for direction in Direction::all() {
                    if self.held.contains(&direction) {
                        self.arena.move_agent(bot, direction);
                    }
                }
            }
        }
        report
    }

    /// Draws every entity, highlighting the selection.
    pub fn render(&self, surface: &mut dyn Surface) {
        for entity in self.arena.entities() {
            if Some(entity.id()) == self.selected {
                entity.render_highlight(surface);
            }
            entity.render(surface);
        }
    }

    /// Writes the arena to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize, SimError> {
        Ok(persistence::save(self.arena.entities(), path)?)
    }

    /// Replaces the arena with the contents of `path`.
    ///
    /// On I/O failure the arena is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, SimError> {
        let report = persistence::load(path)?;

        self.selected = None;
        self.control_bot = None;
        let ids = self.arena.replace_with(report.entities);
        self.control_bot = ids
            .iter()
            .copied()
            .find(|id| self.arena.get(*id).map(Entity::kind) == Some(EntityKind::ControlBot));

        Ok(LoadOutcome {
            loaded: ids.len(),
            skipped: report.skipped,
        })
    }

    /// Counts and positions for the info panel.
    pub fn summary(&self) -> ArenaSummary {
        let position = |id: Option<EntityId>| id.and_then(|id| self.arena.get(id));
        ArenaSummary {
            robots: self.arena.robot_count(),
            obstacles: self.arena.obstacle_count(),
            control_bot: position(self.control_bot).map(|e| e.position),
            selected: position(self.selected).map(|e| (e.kind(), e.position)),
        }
    }

    fn forget_absorbed(&mut self, report: &TickReport) {
        for id in &report.absorbed {
            if self.control_bot == Some(*id) {
                info!("Control bot {} was absorbed", id);
                self.control_bot = None;
                self.held.clear();
            }
            if self.selected == Some(*id) {
                self.selected = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_arena_core::{NullSurface, Sensor};

    fn world() -> SimWorld {
        SimWorld::new(&SimConfig::default())
    }

    #[test]
    fn test_paused_frame_does_not_advance() {
        let mut world = world();
        let id = world.add_random(EntityKind::BumpSensorRobot).unwrap();
        let before = world.arena().get(id).unwrap().position;

        assert!(world.frame(&mut NullSurface).is_none());
        assert_eq!(world.arena().get(id).unwrap().position, before);

        world.start();
        assert!(world.frame(&mut NullSurface).is_some());
        assert_eq!(world.context.frames(), 1);
        assert_ne!(world.arena().get(id).unwrap().position, before);
    }

    #[test]
    fn test_single_control_bot() {
        let mut world = world();

        assert!(world.add_random(EntityKind::ControlBot).is_some());
        assert!(world.add_random(EntityKind::ControlBot).is_none());
        assert_eq!(world.arena().count_by_kind(EntityKind::ControlBot), 1);
    }

    #[test]
    fn test_held_keys_drive_control_bot_while_running() {
        let mut world = world();
        let bot = world.add_random(EntityKind::ControlBot).unwrap();

        world.press(Direction::Right);
        world.press(Direction::Up);
        world.frame(&mut NullSurface);
        assert_eq!(world.arena().get(bot).unwrap().position, Vector2::new(250.0, 250.0));

        world.start();
        world.frame(&mut NullSurface);
        assert_eq!(world.arena().get(bot).unwrap().position, Vector2::new(252.0, 248.0));

        world.release(Direction::Up);
        world.frame(&mut NullSurface);
        assert_eq!(world.arena().get(bot).unwrap().position, Vector2::new(254.0, 248.0));
    }

    #[test]
    fn test_select_drag_delete() {
        let mut world = world();
        let id = world.add_entity(Entity::obstacle(Vector2::new(100.0, 100.0), 20.0));

        assert_eq!(world.select_at(Vector2::new(110.0, 95.0)), Some(id));
        assert!(world.drag_selected(Vector2::new(300.0, 320.0)));
        assert_eq!(world.arena().get(id).unwrap().position, Vector2::new(300.0, 320.0));

        let summary = world.summary();
        assert_eq!(summary.selected, Some((EntityKind::Obstacle, Vector2::new(300.0, 320.0))));

        assert!(world.remove_selected().is_some());
        assert!(world.arena().is_empty());
        assert!(world.remove_selected().is_none());
    }

    #[test]
    fn test_no_selection_while_running() {
        let mut world = world();
        world.add_entity(Entity::obstacle(Vector2::new(100.0, 100.0), 20.0));
        world.select_at(Vector2::new(100.0, 100.0));

        world.start();
        assert_eq!(world.selected(), None);
        assert_eq!(world.select_at(Vector2::new(100.0, 100.0)), None);
        assert!(!world.drag_selected(Vector2::new(0.0, 0.0)));
    }

    #[test]
    fn test_deleting_control_bot_clears_handle() {
        let mut world = world();
        world.add_random(EntityKind::ControlBot);
        world.select_at(Vector2::new(250.0, 250.0));

        world.remove_selected();

        assert_eq!(world.control_bot(), None);
        assert!(world.add_random(EntityKind::ControlBot).is_some());
    }

    #[test]
    fn test_absorbed_control_bot_clears_handle() {
        let mut world = world();
        world.add_random(EntityKind::ControlBot);
        world.add_entity(Entity::black_hole(Vector2::new(250.0, 250.0), 20.0));

        world.start();
        let report = world.frame(&mut NullSurface).unwrap();

        assert_eq!(report.absorbed.len(), 1);
        assert_eq!(world.control_bot(), None);
        assert!(world.summary().to_string().contains("ControlBot: Not added"));
    }

    #[test]
    fn test_save_and_load() {
        let mut world = world();
        world.add_entity(Entity::robot(Sensor::Whisker, Vector2::new(100.0, 120.0), 15.0, 4.0, 33.0));
        world.add_random(EntityKind::ControlBot);
        world.add_random(EntityKind::BlackHole);

        let path = std::env::temp_dir().join(format!("robot_arena_world_{}.txt", std::process::id()));
        assert_eq!(world.save(&path).unwrap(), 3);

        let mut restored = SimWorld::new(&SimConfig::default());
        restored.add_random(EntityKind::Obstacle);
        let outcome = restored.load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(outcome.loaded, 3);
        assert!(outcome.skipped.is_empty());
        assert_eq!(restored.arena().obstacle_count(), 0);
        assert!(restored.control_bot().is_some());
        assert_eq!(restored.summary().control_bot, Some(Vector2::new(250.0, 250.0)));
    }

    #[test]
    fn test_load_reports_skipped_records() {
        let path = std::env::temp_dir().join(format!("robot_arena_skips_{}.txt", std::process::id()));
        std::fs::write(&path, "Obstacle,10,20,20\nrobot,1,2,3\nBlackHole,1,2\n").unwrap();

        let mut world = world();
        let outcome = world.load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.skipped.len(), 2);
        assert!(matches!(outcome.skipped[0], ArenaError::UnknownKind { line: 2, .. }));
        assert!(matches!(outcome.skipped[1], ArenaError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_load_failure_keeps_arena() {
        let mut world = world();
        world.add_random(EntityKind::Obstacle);

        assert!(world.load("/nonexistent/arena.txt").is_err());
        assert_eq!(world.arena().len(), 1);
    }

    #[test]
    fn test_summary_text() {
        let mut world = world();
        world.add_entity(Entity::robot(Sensor::Bump, Vector2::new(10.0, 10.0), 15.0, 3.0, 0.0));
        world.add_entity(Entity::obstacle(Vector2::new(100.0, 100.0), 20.0));
        world.add_entity(Entity::black_hole(Vector2::new(400.0, 400.0), 20.0));
        world.add_random(EntityKind::ControlBot);

        let text = world.summary().to_string();

        assert!(text.starts_with("Robots: 2\nObstacles: 1\n"));
        assert!(text.contains("ControlBot Position:\n  X: 250\n  Y: 250\n"));
        assert!(text.ends_with("Selected Object: None\n"));
    }

    #[test]
    fn test_clear_all() {
        let mut world = world();
        world.add_random(EntityKind::ControlBot);
        world.add_random(EntityKind::WhiskerRobot);

        world.clear_all();

        assert!(world.arena().is_empty());
        assert_eq!(world.control_bot(), None);
    }
}
