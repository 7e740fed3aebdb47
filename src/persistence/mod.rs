//! Session save/restore
//!
//! Features:
//! - Versioned JSON envelope
//! - RNG state travels with the snapshot, so a restored session ticks
//!   exactly like the one it was taken from

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::sim::GameState;

/// Bumped whenever the snapshot layout changes
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    pub state: GameState,
    pub rng: Pcg32,
}

impl SaveEnvelope {
    pub fn new(state: GameState, rng: Pcg32) -> Self {
        Self {
            version: SAVE_VERSION,
            state,
            rng,
        }
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string(self).map_err(SaveError::Encode)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let envelope: SaveEnvelope = serde_json::from_str(json).map_err(SaveError::Decode)?;
        if envelope.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: envelope.version,
                expected: SAVE_VERSION,
            });
        }
        Ok(envelope)
    }
}
