//! Currency-gated upgrades and healing
//!
//! Upgrade cost grows linearly: `upgrade_cost_base * upgrade_level`.
//! An unaffordable purchase is a silent no-op.

use super::state::GameState;
use crate::audio::SoundEffect;
use crate::tuning::Tuning;

const UPGRADE_COLOR: &str = "#a855f7";
const HEAL_COLOR: &str = "#32d74b";

/// Price of the next upgrade from `upgrade_level`
pub fn upgrade_cost(upgrade_level: u32, tuning: &Tuning) -> u32 {
    tuning.economy.upgrade_cost_base.saturating_mul(upgrade_level)
}

/// Buy one upgrade level. Returns true when the purchase went through.
pub fn try_upgrade(state: &mut GameState, tuning: &Tuning) -> bool {
    let cost = upgrade_cost(state.player.upgrade_level, tuning);
    if state.currency < cost {
        return false;
    }
    let economy = &tuning.economy;
    state.currency -= cost;
    let player = &mut state.player;
    player.upgrade_level += 1;
    let body = &mut player.body;
    body.max_health = body.max_health.saturating_add(economy.upgrade_max_health);
    body.health = body.max_health;
    body.damage = body.damage.saturating_add(economy.upgrade_damage);
    body.speed += economy.upgrade_speed;
    log::info!("Upgrade to level {} for {cost}", player.upgrade_level);

    let pos = state.player.body.pos;
    state.spawn_text(pos, "OVERCLOCK!", UPGRADE_COLOR, tuning.feedback_life);
    state.sound(SoundEffect::Upgrade);
    true
}

/// Buy a heal. Refused at full health so currency is not wasted.
pub fn try_heal(state: &mut GameState, tuning: &Tuning) -> bool {
    let economy = &tuning.economy;
    let body = &state.player.body;
    if state.currency < economy.heal_cost || body.health >= body.max_health {
        return false;
    }
    state.currency -= economy.heal_cost;
    let body = &mut state.player.body;
    body.health = body.health.saturating_add(economy.heal_amount).min(body.max_health);

    let pos = body.pos;
    state.spawn_text(pos, "RESTORE!", HEAL_COLOR, tuning.feedback_life);
    state.sound(SoundEffect::Buy);
    true
}
