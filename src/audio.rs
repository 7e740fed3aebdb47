//! Sound triggers
//!
//! The simulation only names what happened; synthesis and playback belong
//! to the host. Sinks are fire-and-forget and never feed back into state.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Primary attack swung
    Attack,
    /// Dash strike launched
    Skill,
    /// Attack connected with a target
    Hit,
    /// Player took contact damage
    DamageTaken,
    /// Item picked up
    Loot,
    /// Heal or warehouse purchase
    Buy,
    /// Upgrade purchased
    Upgrade,
    /// Level or campaign cleared
    Victory,
    /// Player defeated
    GameOver,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Attack => "attack",
            SoundEffect::Skill => "skill",
            SoundEffect::Hit => "hit",
            SoundEffect::DamageTaken => "damage",
            SoundEffect::Loot => "loot",
            SoundEffect::Buy => "buy",
            SoundEffect::Upgrade => "upgrade",
            SoundEffect::Victory => "victory",
            SoundEffect::GameOver => "gameover",
        }
    }
}

/// Receiver for sound triggers
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Records every trigger, in order
impl AudioSink for Vec<SoundEffect> {
    fn play(&mut self, effect: SoundEffect) {
        self.push(effect);
    }
}

/// Headless sink that logs triggers instead of playing them
#[derive(Debug, Clone)]
pub struct LogAudio {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    played: u64,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            played: 0,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Number of triggers that were audible
    pub fn played(&self) -> u64 {
        self.played
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.played += 1;
        log::debug!("sfx {} (vol {:.2})", effect.name(), vol);
    }
}
