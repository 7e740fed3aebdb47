//! Game state and core simulation types
//!
//! All state that must be persisted for resume/determinism lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Player};
use crate::audio::SoundEffect;
use crate::consts::ITEM_SIZE;
use crate::narrative::{NarrativeRequest, NarrativeTopic, OPENING_TEXT};
use crate::square_center;
use crate::tuning::{Tuning, WeaponKind};

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Idle,
    /// Active gameplay
    Playing,
    /// Level cleared; timers decay, input is ignored
    Celebrating,
    /// Next roster is being installed
    LevelTransition,
    /// Non-combat interlude (shop, recruitment, tasks, side challenge)
    Warehouse,
    /// Run ended in defeat
    GameOver,
    /// Final level cleared
    Victory,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon(WeaponKind),
    Currency(u32),
}

/// A pickup lying on the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub kind: ItemKind,
    pub pos: Vec2,
    pub size: f32,
}

impl Item {
    pub fn center(&self) -> Vec2 {
        square_center(self.pos, self.size)
    }
}

/// Damage number / status text drifting above an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub id: u64,
    pub pos: Vec2,
    pub text: String,
    pub color: String,
    /// Ticks remaining
    pub life: u32,
    /// Displacement per tick
    pub vel: Vec2,
}

/// Warehouse task board entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: u32,
    pub completed: bool,
}

/// Something the host may want to react to this tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    NarrativeRequested(NarrativeRequest),
    EnemyKilled { id: String, pos: Vec2 },
    ItemCollected { id: u64, kind: ItemKind },
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Outstanding narrative request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNarrative {
    pub request: NarrativeRequest,
    /// `frames` value when the request was made
    pub requested_at: u64,
}

/// Complete game snapshot (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    pub enemies: Vec<Entity>,
    pub allies: Vec<Entity>,
    pub items: Vec<Item>,
    pub texts: Vec<FloatingText>,
    /// Current level (1-based)
    pub level: u32,
    pub score: u64,
    pub currency: u32,
    pub phase: GamePhase,
    /// Decaying camera shake intensity
    pub screen_shake: f32,
    /// Last narrative line received; may lag behind `level`
    pub narrative: String,
    pub pending_narrative: Option<PendingNarrative>,
    /// Last issued narrative ticket; survives restarts
    pub narrative_ticket: u64,
    /// Ticks left in the celebration window
    pub celebration_ticks: u32,
    /// Ticks simulated while playing; drives contact damage cadence
    pub combat_ticks: u64,
    /// Every tick, any phase
    pub frames: u64,
    pub ally_recruited: bool,
    pub tasks: Vec<Task>,
    /// Events raised by the most recent tick (presentation only)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_item_id: u64,
    next_text_id: u64,
}

impl GameState {
    /// Title-screen state with base player stats
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            player: Player::new(tuning),
            enemies: Vec::new(),
            allies: Vec::new(),
            items: Vec::new(),
            texts: Vec::new(),
            level: 1,
            score: 0,
            currency: 0,
            phase: GamePhase::Idle,
            screen_shake: 0.0,
            narrative: OPENING_TEXT.to_string(),
            pending_narrative: None,
            narrative_ticket: 0,
            celebration_ticks: 0,
            combat_ticks: 0,
            frames: 0,
            ally_recruited: false,
            tasks: tuning
                .tasks
                .iter()
                .map(|t| Task {
                    id: t.id.clone(),
                    title: t.title.clone(),
                    description: t.description.clone(),
                    reward: t.reward,
                    completed: false,
                })
                .collect(),
            events: Vec::new(),
            next_item_id: 1,
            next_text_id: 1,
        }
    }

    /// Allocate a new item ID
    pub fn next_item_id(&mut self) -> u64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }

    pub fn spawn_item(&mut self, kind: ItemKind, pos: Vec2) -> u64 {
        let id = self.next_item_id();
        self.items.push(Item {
            id,
            kind,
            pos,
            size: ITEM_SIZE,
        });
        id
    }

    pub fn spawn_text(&mut self, pos: Vec2, text: impl Into<String>, color: &str, life: u32) {
        let id = self.next_text_id;
        self.next_text_id += 1;
        self.texts.push(FloatingText {
            id,
            pos,
            text: text.into(),
            color: color.to_string(),
            life,
            vel: Vec2::new(0.0, -2.0),
        });
    }

    /// Drift and expire floating text
    pub fn decay_texts(&mut self) {
        for text in &mut self.texts {
            text.pos += text.vel;
            text.life = text.life.saturating_sub(1);
        }
        self.texts.retain(|t| t.life > 0);
    }

    pub fn add_shake(&mut self, amount: f32, max: f32) {
        self.screen_shake = (self.screen_shake + amount).min(max);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, effect: SoundEffect) {
        self.events.push(GameEvent::Sound(effect));
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        if self.phase == phase {
            return;
        }
        log::info!("Phase {:?} -> {:?} (level {})", self.phase, phase, self.level);
        self.emit(GameEvent::PhaseChanged {
            from: self.phase,
            to: phase,
        });
        self.phase = phase;
    }

    /// Issue a new narrative request; any older one becomes stale
    pub fn request_narrative(&mut self, topic: NarrativeTopic) -> NarrativeRequest {
        self.narrative_ticket += 1;
        let request = NarrativeRequest {
            ticket: self.narrative_ticket,
            topic,
        };
        self.pending_narrative = Some(PendingNarrative {
            request,
            requested_at: self.frames,
        });
        self.emit(GameEvent::NarrativeRequested(request));
        request
    }

    /// Accept text for `ticket` if it is still the pending request
    pub fn accept_narrative(&mut self, ticket: u64, text: String) -> bool {
        match self.pending_narrative {
            Some(pending) if pending.request.ticket == ticket => {
                self.narrative = text;
                self.pending_narrative = None;
                true
            }
            _ => {
                log::info!("Discarding stale narrative for ticket {ticket}");
                false
            }
        }
    }

    pub fn player_alive(&self) -> bool {
        self.player.body.is_alive()
    }

    /// Check existence before mutating; stale ids are ignored
    pub fn enemy_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(&Tuning::default());
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.level, 1);
        assert_eq!(state.tasks.len(), 3);
        assert!(state.enemies.is_empty());
        assert_eq!(state.narrative, OPENING_TEXT);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut state = GameState::new(&Tuning::default());
        let a = state.spawn_item(ItemKind::Currency(40), Vec2::ZERO);
        let b = state.spawn_item(ItemKind::Weapon(WeaponKind::Sword), Vec2::ZERO);
        assert!(b > a);
    }

    #[test]
    fn test_texts_drift_and_expire() {
        let mut state = GameState::new(&Tuning::default());
        state.spawn_text(Vec2::new(10.0, 10.0), "HIT", "#fff", 2);
        state.decay_texts();
        assert_eq!(state.texts[0].pos, Vec2::new(10.0, 8.0));
        state.decay_texts();
        assert!(state.texts.is_empty());
    }

    #[test]
    fn test_stale_narrative_is_discarded() {
        let mut state = GameState::new(&Tuning::default());
        let old = state.request_narrative(NarrativeTopic::Level { level: 1, boss: false });
        let new = state.request_narrative(NarrativeTopic::Level { level: 2, boss: false });

        assert!(!state.accept_narrative(old.ticket, "old".into()));
        assert_eq!(state.narrative, OPENING_TEXT);
        assert!(state.accept_narrative(new.ticket, "new".into()));
        assert_eq!(state.narrative, "new");
        // Delivered once only
        assert!(!state.accept_narrative(new.ticket, "again".into()));
    }

    #[test]
    fn test_set_phase_emits_once() {
        let mut state = GameState::new(&Tuning::default());
        state.set_phase(GamePhase::Playing);
        state.set_phase(GamePhase::Playing);
        assert_eq!(
            state.events,
            vec![GameEvent::PhaseChanged {
                from: GamePhase::Idle,
                to: GamePhase::Playing
            }]
        );
    }

    #[test]
    fn test_stale_enemy_id_is_ignored() {
        let mut state = GameState::new(&Tuning::default());
        assert!(state.enemy_mut("e_1_0").is_none());
    }

    #[test]
    fn test_shake_is_capped() {
        let mut state = GameState::new(&Tuning::default());
        state.add_shake(30.0, 40.0);
        state.add_shake(30.0, 40.0);
        assert_eq!(state.screen_shake, 40.0);
    }
}
