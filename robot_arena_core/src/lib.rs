//! Robot Arena Core - a per-tick 2D arena simulation
//!
//! Robots with different sensors roam a bounded 500 × 500 plane together
//! with static obstacles, teleport pads and black holes. The host calls
//! [`Arena::advance`] once per frame and renders afterwards.
//!
//! # The Tick
//!
//! ```text
//! integrate ──► absorb ──► teleport ──► collide
//!  (steer +     (black      (pads        (reverse on robot/robot
//!   move +       holes       relocate     and robot/obstacle
//!   reflect)     remove)     robots)      contact)
//! ```
//!
//! Each robot's update sees every other entity through an [`ArenaView`]
//! instead of a global arena handle.
//!
//! # Usage
//!
//! ```ignore
//! use robot_arena_core::{Arena, ArenaConfig, EntityKind};
//!
//! let mut arena = Arena::new(ArenaConfig { seed: Some(42), ..Default::default() });
//! arena.spawn_random(EntityKind::WhiskerRobot);
//! arena.spawn_random(EntityKind::Obstacle);
//!
//! let report = arena.advance();
//! ```

pub mod agent;
pub mod arena;
pub mod entity;
pub mod error;
pub mod factory;
pub mod kind;
pub mod persistence;
pub mod render;

// Re-export key types for convenience
pub use agent::{Direction, MobileAgent, Sensor};
pub use arena::{Arena, ArenaConfig, ArenaView, TeleportPolicy, TickReport, ARENA_SIZE};
pub use entity::{Body, Entity, EntityId};
pub use error::ArenaError;
pub use kind::EntityKind;
pub use persistence::LoadReport;
pub use render::{Color, NullSurface, Surface};
