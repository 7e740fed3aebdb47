//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per call, no wall-clock time
//! - Injected RNG only
//! - Stable iteration order (roster order)
//! - No rendering, audio or network dependencies

pub mod combat;
pub mod director;
pub mod driver;
pub mod entity;
pub mod hub;
pub mod loot;
pub mod progression;
pub mod state;
pub mod tick;

#[cfg(test)]
mod test_support;

pub use director::{Roster, after_celebration, build_level, level_complete};
pub use driver::Simulation;
pub use entity::{Entity, EntityKind, Facing, MoveIntent, Player};
pub use hub::{ChallengeOutcome, HubOffer};
pub use progression::upgrade_cost;
pub use state::{FloatingText, GameEvent, GamePhase, GameState, Item, ItemKind, PendingNarrative, Task};
pub use tick::{TickInput, tick};
