//! Scenario runner - drives a scenario headless and checks invariants.

use crate::config::SimConfig;
use crate::exporter::{DrawList, EntitySnapshot, SimExport, SimFrame};
use crate::scenarios::ScenarioId;
use crate::world::SimWorld;

use robot_arena_core::{Arena, NullSurface, TeleportPolicy, ARENA_SIZE};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether every tick kept the invariants
    pub passed: bool,

    /// Ticks executed
    pub total_ticks: u64,

    /// Entities left at the end
    pub final_entity_count: usize,

    /// First invariant violation, if any
    pub failure_reason: Option<String>,

    /// Metrics collected during the run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioMetrics {
    /// Robots absorbed by black holes
    pub absorbed: usize,

    /// Teleports performed
    pub teleports: usize,

    /// Heading reversals from contact
    pub collisions: usize,
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Master seed
    seed: u64,

    /// Ticks per run
    ticks: u64,

    /// Frame rate of the virtual clock
    frame_rate_hz: u32,

    /// Teleport handling
    policy: TeleportPolicy,

    /// Export every N ticks (0 = never)
    export_interval: u64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        let defaults = SimConfig::default();
        Self {
            seed,
            ticks: defaults.ticks,
            frame_rate_hz: defaults.frame_rate_hz,
            policy: defaults.teleport_policy,
            export_interval: defaults.export_interval,
        }
    }

    /// Creates a runner from a full configuration.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.seed)
            .with_ticks(config.ticks)
            .with_policy(config.teleport_policy)
            .with_export_interval(config.export_interval)
            .with_frame_rate(config.frame_rate_hz)
    }

    /// Sets the number of ticks.
    pub fn with_ticks(mut self, ticks: u64) -> Self {
        self.ticks = ticks;
        self
    }

    /// Sets the teleport policy.
    pub fn with_policy(mut self, policy: TeleportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the export interval.
    pub fn with_export_interval(mut self, interval: u64) -> Self {
        self.export_interval = interval;
        self
    }

    /// Sets the frame rate.
    pub fn with_frame_rate(mut self, hz: u32) -> Self {
        self.frame_rate_hz = hz;
        self
    }

    fn config(&self, scenario: ScenarioId) -> SimConfig {
        SimConfig {
            seed: self.seed,
            ticks: self.ticks,
            frame_rate_hz: self.frame_rate_hz,
            scenario: scenario.name().to_string(),
            teleport_policy: self.policy,
            export_interval: self.export_interval,
        }
    }

    /// Builds the world a scenario starts from.
    pub fn build_world(&self, scenario: ScenarioId) -> SimWorld {
        let mut world = SimWorld::new(&self.config(scenario));
        scenario.populate(&mut world);
        world
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        let mut world = self.build_world(scenario);
        self.run_world(scenario, &mut world, None)
    }

    /// Runs a scenario, recording frames into an export.
    pub fn run_with_export(&self, scenario: ScenarioId) -> (ScenarioResult, SimExport) {
        let mut world = self.build_world(scenario);
        let mut export = SimExport::new(scenario.name(), self.seed);
        let result = self.run_world(scenario, &mut world, Some(&mut export));
        export.finalize(result.passed);
        (result, export)
    }

    /// Runs an already populated world (e.g. one loaded from a file).
    ///
    /// The world is left stopped in its final state.
    pub fn run_world(
        &self,
        scenario: ScenarioId,
        world: &mut SimWorld,
        mut export: Option<&mut SimExport>,
    ) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let mut metrics = ScenarioMetrics::default();
        let mut failure_reason = None;
        let mut draw = DrawList::new();
        let mut ticks_run = 0;

        world.start();
        for tick in 0..self.ticks {
            let recording = export.is_some()
                && self.export_interval > 0
                && tick % self.export_interval == 0;

            let count_before = world.arena().len();
            let report = if recording {
                world.frame(&mut draw)
            } else {
                world.frame(&mut NullSurface)
            };
            ticks_run += 1;

            if let Some(report) = report {
                metrics.absorbed += report.absorbed.len();
                metrics.teleports += report.teleports;
                metrics.collisions += report.collisions;
            }

            if let Some(reason) = check_invariants(world.arena(), count_before) {
                warn!("Invariant violated at tick {}: {}", tick, reason);
                failure_reason = Some(format!("tick {}: {}", tick, reason));
                break;
            }

            if recording {
                if let Some(export) = export.as_deref_mut() {
                    export.add_frame(SimFrame {
                        tick: world.context.frames(),
                        time_sec: world.context.now().as_secs_f64(),
                        entities: world.arena().entities().iter().map(EntitySnapshot::from).collect(),
                        draw: draw.take(),
                    });
                }
            }

            if tick % 60 == 0 {
                debug!(
                    "  t={:.1}s | entities={} | robots={}",
                    world.context.now().as_secs_f64(),
                    world.arena().len(),
                    world.arena().robot_count()
                );
            }
        }
        world.stop();

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_ticks: ticks_run,
            final_entity_count: world.arena().len(),
            failure_reason,
            metrics,
        }
    }
}

/// Checks what must hold after every tick.
///
/// Autonomous robots keep their centers inside the arena (teleports land in
/// `[10, 490]`, integration clamps to `[r, 500 - r]`), headings stay in
/// `[0, 360)`, and a tick never adds entities.
fn check_invariants(arena: &Arena, count_before: usize) -> Option<String> {
    if arena.len() > count_before {
        return Some(format!("entity count grew from {} to {}", count_before, arena.len()));
    }

    for entity in arena.entities() {
        let Some(agent) = entity.agent() else {
            continue;
        };
        if !agent.sensor.is_autonomous() {
            continue;
        }
        if !(0.0..360.0).contains(&agent.heading) {
            return Some(format!("{} {} heading {} out of range", entity.kind(), entity.id(), agent.heading));
        }
        let p = entity.position;
        if !(0.0..=ARENA_SIZE).contains(&p.x) || !(0.0..=ARENA_SIZE).contains(&p.y) {
            return Some(format!(
                "{} {} left the arena at ({:.2}, {:.2})",
                entity.kind(),
                entity.id(),
                p.x,
                p.y
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_scenarios_pass() {
        let runner = ScenarioRunner::new(42).with_ticks(300);

        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(result.passed, "{} failed: {:?}", scenario, result.failure_reason);
            assert_eq!(result.total_ticks, 300);
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let runner = ScenarioRunner::new(7).with_ticks(200);

        let a = runner.run(ScenarioId::Crowd);
        let b = runner.run(ScenarioId::Crowd);

        assert_eq!(a.metrics, b.metrics);
        assert_eq!(a.final_entity_count, b.final_entity_count);
    }

    #[test]
    fn test_black_holes_only_remove() {
        let runner = ScenarioRunner::new(3).with_ticks(600);
        let before = runner.build_world(ScenarioId::BlackHoleSweep).arena().len();

        let result = runner.run(ScenarioId::BlackHoleSweep);

        assert_eq!(before - result.final_entity_count, result.metrics.absorbed);
    }

    #[test]
    fn test_export_frames() {
        let runner = ScenarioRunner::new(42).with_ticks(50).with_export_interval(10);

        let (result, export) = runner.run_with_export(ScenarioId::Default);

        assert!(result.passed);
        assert!(export.passed);
        assert_eq!(export.frames.len(), 5);
        assert_eq!(export.frames[0].tick, 1);
        assert!(!export.frames[0].draw.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_invariants_hold_for_any_seed(seed in any::<u64>()) {
            let runner = ScenarioRunner::new(seed).with_ticks(120);
            let result = runner.run(ScenarioId::Crowd);
            prop_assert!(result.passed, "{:?}", result.failure_reason);
        }
    }
}
