//! Squad Brawler - wave-based 2D brawler simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, combat, loot, phases)
//! - `tuning`: Data-driven game balance
//! - `narrative`: Flavour text requests with fallbacks
//! - `audio`: Fire-and-forget sound triggers
//! - `persistence`: Versioned snapshot envelope for resume/replay

pub mod audio;
pub mod error;
pub mod narrative;
pub mod persistence;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, NarrativeError, SaveError};
pub use sim::{GamePhase, GameState, Simulation, TickInput};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate (one tick per display frame)
    pub const TICK_RATE: u32 = 60;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Bounding square sides
    pub const PLAYER_SIZE: f32 = 110.0;
    pub const ENEMY_SIZE: f32 = 100.0;
    pub const BOSS_SIZE: f32 = 220.0;
    pub const ALLY_SIZE: f32 = 100.0;
    pub const ITEM_SIZE: f32 = 45.0;

    /// Enemies spawn this far beyond the left/right edge
    pub const SPAWN_MARGIN: f32 = 200.0;
    /// Boss spawn row (top edge of its bounding square)
    pub const BOSS_SPAWN_Y: f32 = 150.0;
}

/// Center of an axis-aligned square whose top-left corner is `pos`
#[inline]
pub fn square_center(pos: Vec2, size: f32) -> Vec2 {
    pos + Vec2::splat(size / 2.0)
}

/// Clamp a top-left position so the square stays inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, size: f32) -> Vec2 {
    use consts::{ARENA_HEIGHT, ARENA_WIDTH};
    Vec2::new(
        pos.x.clamp(0.0, (ARENA_WIDTH - size).max(0.0)),
        pos.y.clamp(0.0, (ARENA_HEIGHT - size).max(0.0)),
    )
}
