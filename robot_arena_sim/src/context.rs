//! Deterministic simulation context: seeds and the virtual frame clock.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Mixed into the master seed before each sub-seed is derived; seed 0 still
// yields two distinct streams.
const PHYSICS_SALT: u64 = 0xa076_1d64_78bd_642f;
const SPAWN_SALT: u64 = 0xe703_7ed1_a0b4_28db;

/// Seed and clock shared by everything in one simulated session.
///
/// Separate sub-seeds are derived for arena physics (teleport targets) and
/// for spawning, so adding an entity never changes where robots teleport.
#[derive(Debug, Clone)]
pub struct SimContext {
    /// Master seed for this session
    seed: u64,

    /// Frames driven so far
    frames: u64,

    /// Frame rate of the virtual clock
    frame_rate_hz: u32,

    /// RNG for random placement of new entities
    spawn_rng: ChaCha8Rng,
}

impl SimContext {
    /// Creates a context with the given master seed.
    pub fn new(seed: u64, frame_rate_hz: u32) -> Self {
        Self {
            seed,
            frames: 0,
            frame_rate_hz: frame_rate_hz.max(1),
            spawn_rng: ChaCha8Rng::seed_from_u64(spawn_seed(seed)),
        }
    }

    /// Returns the master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed handed to the arena for teleport targets.
    pub fn physics_seed(&self) -> u64 {
        (self.seed ^ PHYSICS_SALT).wrapping_mul(0x9e3779b97f4a7c15)
    }

    /// Seed of the spawn RNG.
    pub fn spawn_seed(&self) -> u64 {
        spawn_seed(self.seed)
    }

    /// RNG for spawning entities.
    pub fn spawn_rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.spawn_rng
    }

    /// Advances the virtual clock by one frame.
    pub fn advance_frame(&mut self) {
        self.frames += 1;
    }

    /// Frames driven so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Virtual time elapsed.
    pub fn now(&self) -> Duration {
        Duration::from_secs_f64(self.frames as f64 / f64::from(self.frame_rate_hz))
    }
}

fn spawn_seed(seed: u64) -> u64 {
    (seed ^ SPAWN_SALT).wrapping_mul(0x517cc1b727220a95)
}
