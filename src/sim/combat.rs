//! Combat resolution
//!
//! Hit detection is a center-to-center distance test against
//! `range + melee_slop`; there is no physics. Each activation sweeps the
//! defenders once, so nobody is struck twice by the same swing.

use glam::Vec2;
use rand::Rng;

use super::entity::{Entity, Facing};
use super::state::GameState;
use crate::audio::SoundEffect;
use crate::clamp_to_arena;
use crate::tuning::Tuning;

const HIT_COLOR: &str = "#ff3b30";
const BACKSTAB_COLOR: &str = "#a855f7";
const DAMAGE_COLOR: &str = "#ffffff";

/// Parameters for one sweep
#[derive(Debug, Clone, Copy)]
pub struct StrikeProfile {
    /// Center distance below which a defender is struck
    pub reach: f32,
    pub damage: i32,
    /// Bonus drawn from `0..jitter`
    pub jitter: i32,
    pub knockback: f32,
    pub flash_ticks: u32,
    /// Multiplier when the defender faces the same way as the attacker
    pub backstab: Option<f32>,
}

/// A landed blow
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Index into the defender slice
    pub target: usize,
    pub amount: i32,
    /// Defender position after knockback
    pub pos: Vec2,
    pub backstab: bool,
}

/// Base damage plus a random bonus; never negative
pub fn roll_damage<R: Rng + ?Sized>(base: i32, jitter: i32, rng: &mut R) -> i32 {
    let bonus = if jitter > 0 { rng.random_range(0..jitter) } else { 0 };
    base.saturating_add(bonus).max(0)
}

/// Push `target` away from `origin` along the line between them
pub fn knockback(origin: Vec2, target: &mut Entity, distance: f32) {
    let axis = target.center() - origin;
    if distance > 0.0 && axis.length_squared() > f32::EPSILON {
        target.pos += axis.normalize() * distance;
    }
}

/// Strike every living defender within reach. Health is not floored here;
/// dead defenders are removed by the post-combat sweep.
pub fn sweep<R: Rng + ?Sized>(
    attacker: &Entity,
    defenders: &mut [Entity],
    profile: &StrikeProfile,
    rng: &mut R,
) -> Vec<Hit> {
    let origin = attacker.center();
    let mut hits = Vec::new();
    for (index, defender) in defenders.iter_mut().enumerate() {
        if !defender.is_alive() || attacker.distance_to(defender) >= profile.reach {
            continue;
        }
        let mut amount = roll_damage(profile.damage, profile.jitter, rng);
        let backstab = profile.backstab.is_some() && defender.facing == attacker.facing;
        if let (true, Some(mult)) = (backstab, profile.backstab) {
            amount = (amount as f32 * mult).round().max(0.0) as i32;
        }
        defender.health -= amount;
        defender.hit_flash = profile.flash_ticks;
        knockback(origin, defender, profile.knockback);
        log::trace!("{} hits {} for {}", attacker.id, defender.id, amount);
        hits.push(Hit {
            target: index,
            amount,
            pos: defender.pos,
            backstab,
        });
    }
    hits
}

/// Feedback for landed blows: text, sound and shake scaled by hit count
fn report_hits(state: &mut GameState, hits: &[Hit], tuning: &Tuning) {
    for hit in hits {
        let (label, color) = if hit.backstab {
            ("BACKSTAB!", BACKSTAB_COLOR)
        } else {
            ("HIT!", HIT_COLOR)
        };
        state.spawn_text(hit.pos, format!("{label} -{}", hit.amount), color, tuning.feedback_life);
        state.sound(SoundEffect::Hit);
    }
    if !hits.is_empty() {
        state.add_shake(tuning.combat.hit_shake * hits.len() as f32, tuning.combat.max_shake);
    }
}

fn player_profile(state: &GameState, tuning: &Tuning, backstab: Option<f32>) -> StrikeProfile {
    let body = &state.player.body;
    let weapon = tuning.weapons.get(body.weapon);
    StrikeProfile {
        reach: weapon.range + tuning.combat.melee_slop,
        damage: body.damage,
        jitter: tuning.combat.damage_jitter,
        knockback: weapon.knockback,
        flash_ticks: tuning.combat.hit_flash_ticks,
        backstab,
    }
}

/// Player's primary attack. Returns false while the cooldown is running.
pub fn primary_attack<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) -> bool {
    if !state.player.body.try_begin_attack() {
        return false;
    }
    state.sound(SoundEffect::Attack);
    let profile = player_profile(state, tuning, None);
    let hits = sweep(&state.player.body, &mut state.enemies, &profile, rng);
    report_hits(state, &hits, tuning);
    true
}

/// Dash strike: lunge along facing, then sweep with the backstab bonus.
/// Runs on its own cooldown, independent of the primary attack.
pub fn dash_strike<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) -> bool {
    let player = &mut state.player;
    if player.dash_cooldown > 0 {
        return false;
    }
    player.dash_cooldown = tuning.combat.dash_cooldown;
    let body = &mut player.body;
    let lunge = Vec2::new(body.facing.sign() * tuning.combat.dash_distance, 0.0);
    body.pos = clamp_to_arena(body.pos + lunge, body.size);
    body.is_attacking = true;
    state.sound(SoundEffect::Skill);

    let profile = player_profile(state, tuning, Some(tuning.combat.backstab_multiplier));
    let hits = sweep(&state.player.body, &mut state.enemies, &profile, rng);
    report_hits(state, &hits, tuning);
    true
}

/// Index and center distance of the nearest living entity
pub fn nearest_living(from: &Entity, others: &[Entity]) -> Option<(usize, f32)> {
    others
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive())
        .map(|(i, e)| (i, from.distance_to(e)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Allies close on the nearest enemy and strike on their own cooldown
pub fn allies_act<R: Rng + ?Sized>(state: &mut GameState, tuning: &Tuning, rng: &mut R) {
    let spec = &tuning.ally;
    let weapon = tuning.weapons.get(spec.weapon);
    let reach = spec.range + tuning.combat.melee_slop;
    let mut hits = Vec::new();

    for ally in state.allies.iter_mut().filter(|a| a.is_alive()) {
        let Some((target, dist)) = nearest_living(ally, &state.enemies) else {
            ally.is_moving = false;
            continue;
        };
        if dist < reach {
            ally.is_moving = false;
            ally.facing = Facing::toward(state.enemies[target].center().x - ally.center().x);
            if ally.try_begin_attack() {
                let profile = StrikeProfile {
                    reach,
                    damage: ally.damage,
                    jitter: tuning.combat.damage_jitter,
                    knockback: weapon.knockback,
                    flash_ticks: tuning.combat.hit_flash_ticks,
                    backstab: None,
                };
                hits.extend(sweep(ally, &mut state.enemies, &profile, rng));
            }
        } else {
            let before = ally.pos;
            ally.chase(state.enemies[target].center(), reach * 0.5);
            ally.pos = clamp_to_arena(ally.pos, ally.size);
            ally.is_moving = ally.pos != before;
        }
    }

    report_hits(state, &hits, tuning);
}

/// Enemies chase the player and deal contact damage.
///
/// Contact damage is gated by the global `combat_ticks % contact_interval`
/// schedule rather than per-enemy timers, so every enemy in range lands on
/// the same boundary tick.
pub fn enemies_act(state: &mut GameState, tuning: &Tuning) {
    let combat = &tuning.combat;
    let contact_tick = state.combat_ticks % combat.contact_interval == 0;
    let player_center = state.player.body.center();
    let mut player_damage = Vec::new();
    let mut ally_damage = Vec::new();

    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        // Distance is measured before this tick's step
        let dist = enemy.chase(player_center, combat.chase_stop_distance);
        enemy.is_moving = dist > combat.moving_threshold;
        if !contact_tick {
            continue;
        }
        if dist < combat.contact_range {
            player_damage.push(enemy.damage);
        }
        for (index, ally) in state.allies.iter().enumerate() {
            if ally.is_alive() && enemy.distance_to(ally) < combat.contact_range {
                ally_damage.push((index, enemy.damage));
            }
        }
    }

    for amount in player_damage {
        let body = &mut state.player.body;
        body.health -= amount;
        body.hit_flash = combat.hit_flash_ticks;
        let pos = body.pos;
        state.spawn_text(pos, format!("DMG -{amount}"), DAMAGE_COLOR, tuning.feedback_life);
        state.sound(SoundEffect::DamageTaken);
        state.add_shake(combat.contact_shake, combat.max_shake);
    }

    for (index, amount) in ally_damage {
        if let Some(ally) = state.allies.get_mut(index) {
            ally.health -= amount;
            ally.hit_flash = combat.hit_flash_ticks;
        }
    }
}
