use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityKind, Facing};
use super::state::{GamePhase, GameState};
use crate::consts::ENEMY_SIZE;
use crate::tuning::{Tuning, WeaponKind};

/// Default balance with the dice taken out: no damage jitter, no weapon drops
pub(crate) fn quiet_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.combat.damage_jitter = 0;
    tuning.economy.weapon_drop_chance = 0.0;
    tuning
}

pub(crate) fn rng() -> Pcg32 {
    Pcg32::seed_from_u64(0x5eed)
}

/// Playing state on level 1 with an empty roster
pub(crate) fn playing_state(tuning: &Tuning) -> GameState {
    let mut state = GameState::new(tuning);
    state.phase = GamePhase::Playing;
    state
}

/// Melee enemy whose center sits at `center`
pub(crate) fn enemy_at(id: &str, center: Vec2, health: i32) -> Entity {
    Entity {
        id: id.to_string(),
        kind: EntityKind::MeleeEnemy,
        pos: center - Vec2::splat(ENEMY_SIZE / 2.0),
        size: ENEMY_SIZE,
        facing: Facing::Left,
        speed: 0.0,
        health,
        max_health: health,
        weapon: WeaponKind::Fists,
        damage: 23,
        attack_cooldown: 0,
        max_attack_cooldown: 60,
        is_attacking: false,
        is_moving: false,
        hit_flash: 0,
    }
}
