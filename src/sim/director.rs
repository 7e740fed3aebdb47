//! Level director
//!
//! Builds rosters from the difficulty table and decides where the
//! campaign goes after each cleared level.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::entity::{Entity, EntityKind, Facing, Player};
use super::state::{GamePhase, GameState, ItemKind};
use crate::consts::*;
use crate::narrative::NarrativeTopic;
use crate::tuning::{Tuning, WeaponKind};

/// Everything a level starts with besides the carried-over player
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    pub enemies: Vec<Entity>,
    pub allies: Vec<Entity>,
    pub items: Vec<(ItemKind, Vec2)>,
}

/// Build the roster for a 1-based level. Unknown levels produce an empty
/// roster, which completes immediately.
pub fn build_level<R: Rng + ?Sized>(
    level: u32,
    ally_recruited: bool,
    tuning: &Tuning,
    rng: &mut R,
) -> Roster {
    let mut roster = Roster::default();
    let Some(spec) = tuning.level(level) else {
        log::warn!("No difficulty row for level {level}");
        return roster;
    };

    let damage = tuning.enemy_damage(level);
    for i in 0..spec.enemy_count {
        // Off-screen on either flank, so waves walk in
        let x = if rng.random_bool(0.5) {
            -SPAWN_MARGIN
        } else {
            ARENA_WIDTH + SPAWN_MARGIN
        };
        let y = rng.random_range(0.0..ARENA_HEIGHT);
        roster.enemies.push(Entity {
            id: format!("e_{level}_{i}"),
            kind: EntityKind::MeleeEnemy,
            pos: Vec2::new(x, y),
            size: ENEMY_SIZE,
            facing: Facing::Right,
            speed: spec.enemy_speed,
            health: spec.enemy_health,
            max_health: spec.enemy_health,
            weapon: WeaponKind::Fists,
            damage,
            attack_cooldown: 0,
            max_attack_cooldown: tuning.combat.enemy_cooldown,
            is_attacking: false,
            is_moving: false,
            hit_flash: 0,
        });
    }

    if spec.boss {
        let boss = &tuning.boss;
        let health = spec.enemy_health.saturating_mul(boss.health_factor);
        roster.enemies.push(Entity {
            id: "boss".to_string(),
            kind: EntityKind::Boss,
            pos: Vec2::new(ARENA_WIDTH / 2.0 - BOSS_SIZE / 2.0, BOSS_SPAWN_Y),
            size: BOSS_SIZE,
            facing: Facing::Left,
            speed: spec.enemy_speed * boss.speed_factor,
            health,
            max_health: health,
            weapon: boss.weapon,
            damage: boss.damage,
            attack_cooldown: 0,
            max_attack_cooldown: boss.cooldown,
            is_attacking: false,
            is_moving: false,
            hit_flash: 0,
        });
    }

    if ally_recruited {
        let ally = &tuning.ally;
        roster.allies.push(Entity {
            id: "ally".to_string(),
            kind: EntityKind::Ally,
            pos: Vec2::new(80.0, ARENA_HEIGHT / 2.0 - ALLY_SIZE / 2.0),
            size: ALLY_SIZE,
            facing: Facing::Right,
            speed: ally.speed,
            health: ally.health,
            max_health: ally.health,
            weapon: ally.weapon,
            damage: ally.damage,
            attack_cooldown: 0,
            max_attack_cooldown: ally.cooldown,
            is_attacking: false,
            is_moving: false,
            hit_flash: 0,
        });
    }

    if level > 1 {
        if let Some(kind) = WeaponKind::DROPPABLE.choose(rng) {
            roster
                .items
                .push((ItemKind::Weapon(*kind), Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0)));
        }
    }

    roster
}

/// Replace the field with a fresh roster for `level`. Player, score and
/// currency carry over; leftover pickups and feedback do not.
pub fn install_level<R: Rng + ?Sized>(state: &mut GameState, level: u32, tuning: &Tuning, rng: &mut R) {
    let roster = build_level(level, state.ally_recruited, tuning, rng);
    log::info!(
        "Level {level}: {} enemies, {} allies",
        roster.enemies.len(),
        roster.allies.len()
    );
    state.level = level;
    state.enemies = roster.enemies;
    state.allies = roster.allies;
    state.items.clear();
    state.texts.clear();
    state.celebration_ticks = 0;
    state.combat_ticks = 0;
    for (kind, pos) in roster.items {
        state.spawn_item(kind, pos);
    }
}

/// Start a run: base player, zero counters, level 1
pub fn begin_campaign<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) {
    state.player = Player::new(tuning);
    state.score = 0;
    state.currency = 0;
    state.screen_shake = 0.0;
    install_level(state, 1, tuning, rng);
    state.set_phase(GamePhase::Playing);
    state.request_narrative(NarrativeTopic::Level {
        level: 1,
        boss: tuning.is_boss_level(1),
    });
}

/// Install the next level. The roster never waits on narrative text.
pub fn advance_level<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) {
    let next = state.level + 1;
    install_level(state, next, tuning, rng);
    state.set_phase(GamePhase::Playing);
    state.request_narrative(NarrativeTopic::Level {
        level: next,
        boss: tuning.is_boss_level(next),
    });
}

/// Cleared means no enemies left and the player still standing
pub fn level_complete(state: &GameState) -> bool {
    state.enemies.is_empty() && state.player_alive()
}

/// Where the campaign goes once the celebration window closes
pub fn after_celebration(level: u32, tuning: &Tuning) -> GamePhase {
    if level >= tuning.final_level() {
        GamePhase::Victory
    } else if tuning.is_warehouse_level(level) {
        GamePhase::Warehouse
    } else {
        GamePhase::LevelTransition
    }
}
