//! Kill rewards, drops and pickups

use rand::Rng;
use rand::seq::IndexedRandom;

use super::entity::{Entity, EntityKind};
use super::state::{GameEvent, GameState, ItemKind};
use crate::audio::SoundEffect;
use crate::tuning::{Tuning, WeaponKind};

const CREDIT_COLOR: &str = "#ffd60a";

/// Remove dead actors and pay out for every enemy that fell this tick.
///
/// Each dead enemy drops exactly one item at its last position: a weapon
/// with probability `weapon_drop_chance`, otherwise a currency bundle.
/// The player is never removed; its health is floored at zero instead.
pub fn sweep_dead<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) {
    let (dead, alive): (Vec<Entity>, Vec<Entity>) =
        std::mem::take(&mut state.enemies).into_iter().partition(|e| !e.is_alive());
    state.enemies = alive;

    for enemy in dead {
        award_kill(state, &enemy, tuning);
        let kind = roll_drop(tuning, rng);
        state.spawn_item(kind, enemy.pos);
        log::debug!("{} down, dropped {:?}", enemy.id, kind);
        state.emit(GameEvent::EnemyKilled {
            id: enemy.id,
            pos: enemy.pos,
        });
    }

    let before = state.allies.len();
    state.allies.retain(Entity::is_alive);
    if state.allies.len() < before {
        log::info!("Ally lost on level {}", state.level);
    }

    let body = &mut state.player.body;
    body.health = body.health.max(0);
}

fn award_kill(state: &mut GameState, enemy: &Entity, tuning: &Tuning) {
    let economy = &tuning.economy;
    let factor = if enemy.kind == EntityKind::Boss {
        tuning.boss.reward_factor
    } else {
        1
    };
    state.score = state
        .score
        .saturating_add(economy.kill_score.saturating_mul(u64::from(factor)));
    state.currency = state
        .currency
        .saturating_add(economy.kill_currency.saturating_mul(factor));
}

fn roll_drop<R: Rng + ?Sized>(tuning: &Tuning, rng: &mut R) -> ItemKind {
    if rng.random::<f32>() < tuning.economy.weapon_drop_chance {
        if let Some(kind) = WeaponKind::DROPPABLE.choose(rng) {
            return ItemKind::Weapon(*kind);
        }
    }
    ItemKind::Currency(tuning.economy.currency_drop_amount)
}

/// Collect every item within pickup radius of the player.
/// Removal and effect happen together, so each item pays out once.
pub fn collect_pickups(state: &mut GameState, tuning: &Tuning) {
    let center = state.player.body.center();
    let radius = tuning.economy.pickup_radius;
    let (taken, left): (Vec<_>, Vec<_>) = std::mem::take(&mut state.items)
        .into_iter()
        .partition(|item| item.center().distance(center) < radius);
    state.items = left;

    for item in taken {
        match item.kind {
            ItemKind::Weapon(kind) => equip_weapon(state, kind, tuning),
            ItemKind::Currency(amount) => {
                state.currency = state.currency.saturating_add(amount);
                let pos = state.player.body.pos;
                state.spawn_text(pos, format!("+{amount} CREDITS"), CREDIT_COLOR, tuning.feedback_life);
            }
        }
        state.sound(SoundEffect::Loot);
        state.emit(GameEvent::ItemCollected {
            id: item.id,
            kind: item.kind,
        });
    }
}

/// Swap the player's weapon; damage scales with upgrade level
pub fn equip_weapon(state: &mut GameState, kind: WeaponKind, tuning: &Tuning) {
    let stats = tuning.weapons.get(kind);
    let player = &mut state.player;
    let bonus = tuning
        .economy
        .weapon_level_bonus
        .saturating_mul(i32::try_from(player.upgrade_level).unwrap_or(i32::MAX));
    player.body.weapon = kind;
    player.body.damage = stats.damage.saturating_add(bonus);
    player.body.max_attack_cooldown = stats.cooldown;
    player.body.attack_cooldown = player.body.attack_cooldown.min(stats.cooldown);
    let pos = player.body.pos;
    state.spawn_text(pos, format!("ARMED: {}", kind.as_str()), &stats.color, tuning.feedback_life);
}
