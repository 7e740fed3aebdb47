//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Each call
//! copies the previous snapshot and returns the next one; the previous
//! snapshot is never touched.

use rand::Rng;

use super::combat::{self, nearest_living};
use super::director::{advance_level, after_celebration, level_complete};
use super::entity::MoveIntent;
use super::loot::{collect_pickups, sweep_dead};
use super::progression::{try_heal, try_upgrade, upgrade_cost};
use super::state::{GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::error::NarrativeError;
use crate::narrative::{NarrativeTopic, resolve_text};
use crate::tuning::Tuning;

/// Input intents for a single tick.
///
/// Movement and `attack` are level-triggered and follow the key state.
/// `skill`, `buy` and `upgrade` are edge-triggered: the tick clears them
/// once they fire, so a held key does not repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Primary attack
    pub attack: bool,
    /// Dash strike
    pub skill: bool,
    /// Buy a heal
    pub buy: bool,
    /// Buy an upgrade
    pub upgrade: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
}

impl TickInput {
    pub fn movement(&self) -> MoveIntent {
        MoveIntent {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
        }
    }
}

/// Advance the game by one tick and return the new snapshot
pub fn tick<R: Rng + ?Sized>(
    prev: &GameState,
    input: &mut TickInput,
    tuning: &Tuning,
    rng: &mut R,
) -> GameState {
    let mut next = prev.clone();
    step(&mut next, input, tuning, rng);
    next
}

/// One tick applied to a private copy
fn step<R: Rng + ?Sized>(state: &mut GameState, input: &mut TickInput, tuning: &Tuning, rng: &mut R) {
    state.events.clear();
    state.frames += 1;
    state.decay_texts();
    state.screen_shake = (state.screen_shake - tuning.combat.shake_decay).max(0.0);
    expire_narrative(state, tuning);

    match state.phase {
        GamePhase::Playing => {
            if input.idle_mode {
                let mut auto = autopilot(state, tuning);
                play(state, &mut auto, tuning, rng);
            } else {
                play(state, input, tuning, rng);
            }
        }
        GamePhase::Celebrating => celebrate(state, tuning),
        GamePhase::LevelTransition => advance_level(state, tuning, rng),
        GamePhase::Idle | GamePhase::Warehouse | GamePhase::GameOver | GamePhase::Victory => {}
    }
}

/// Swap in fallback text once a narrative request has waited too long
fn expire_narrative(state: &mut GameState, tuning: &Tuning) {
    let timeout = tuning.narrative_timeout_ticks;
    let Some(pending) = state.pending_narrative else {
        return;
    };
    let waited = state.frames.saturating_sub(pending.requested_at);
    if timeout == 0 || waited < timeout {
        return;
    }
    let text = resolve_text(
        &pending.request.topic,
        Err(NarrativeError::Timeout {
            waited_ticks: waited,
        }),
    );
    state.accept_narrative(pending.request.ticket, text);
}

fn decay_all_timers(state: &mut GameState) {
    state.player.decay_timers();
    for entity in state.enemies.iter_mut().chain(state.allies.iter_mut()) {
        entity.decay_timers();
    }
}

/// Active gameplay, in the fixed order the balance depends on
fn play<R: Rng + ?Sized>(state: &mut GameState, input: &mut TickInput, tuning: &Tuning, rng: &mut R) {
    // 1. Timers
    decay_all_timers(state);

    // 2. Purchases; an unaffordable intent stays latched
    if input.upgrade && try_upgrade(state, tuning) {
        input.upgrade = false;
    }
    if input.buy && try_heal(state, tuning) {
        input.buy = false;
    }

    // 3. Movement
    state.player.apply_movement(input.movement());

    // 4. Attacks
    if input.attack {
        combat::primary_attack(state, tuning, rng);
    }
    if input.skill && combat::dash_strike(state, tuning, rng) {
        input.skill = false;
    }

    // 5. Allies
    combat::allies_act(state, tuning, rng);

    // 6. Pickups
    collect_pickups(state, tuning);

    // 7. Enemy movement and contact damage
    combat::enemies_act(state, tuning);

    // 8. Dead actors and loot
    sweep_dead(state, tuning, rng);

    // 9. Phase predicates; defeat wins over a simultaneous clear
    state.combat_ticks += 1;
    if !state.player_alive() {
        state.set_phase(GamePhase::GameOver);
        state.sound(SoundEffect::GameOver);
    } else if level_complete(state) {
        state.celebration_ticks = tuning.celebration_ticks;
        state.set_phase(GamePhase::Celebrating);
        state.sound(SoundEffect::Victory);
    }
}

/// Non-interactive window after a clear. Timers run, nothing moves.
fn celebrate(state: &mut GameState, tuning: &Tuning) {
    decay_all_timers(state);
    state.celebration_ticks = state.celebration_ticks.saturating_sub(1);
    if state.celebration_ticks > 0 {
        return;
    }
    let next = after_celebration(state.level, tuning);
    state.set_phase(next);
    if next == GamePhase::Victory {
        state.request_narrative(NarrativeTopic::Victory);
    }
}

/// Demo AI: walk to the nearest enemy (or loot), swing when in reach,
/// dash into exposed backs, spend currency when it can.
fn autopilot(state: &GameState, tuning: &Tuning) -> TickInput {
    let mut input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let player = &state.player;
    let body = &player.body;
    let center = body.center();
    let reach = tuning.weapons.get(body.weapon).range + tuning.combat.melee_slop;

    let target = match nearest_living(body, &state.enemies) {
        Some((index, dist)) => {
            let enemy = &state.enemies[index];
            let ahead = (enemy.center().x - center.x) * body.facing.sign() > 0.0;
            if dist < reach * 0.8 {
                input.attack = true;
            }
            if player.dash_cooldown == 0
                && ahead
                && enemy.facing == body.facing
                && dist < tuning.combat.dash_distance + reach
            {
                input.skill = true;
            }
            Some((enemy.center(), reach * 0.5))
        }
        None => state
            .items
            .iter()
            .map(|item| item.center())
            .min_by(|a, b| a.distance(center).total_cmp(&b.distance(center)))
            .map(|pos| (pos, tuning.economy.pickup_radius * 0.5)),
    };

    if let Some((goal, stop)) = target {
        let delta = goal - center;
        let slack = body.speed.max(1.0);
        if delta.length() > stop {
            input.left = delta.x < -slack;
            input.right = delta.x > slack;
            input.up = delta.y < -slack;
            input.down = delta.y > slack;
        }
        if !input.left && !input.right && delta.x.abs() > f32::EPSILON {
            // Turn to face the target without walking into it
            let wants_right = delta.x > 0.0;
            if wants_right != (body.facing.sign() > 0.0) {
                input.left = !wants_right;
                input.right = wants_right;
            }
        }
    }

    input.upgrade = state.currency >= upgrade_cost(player.upgrade_level, tuning);
    input.buy = !input.upgrade
        && body.health < body.max_health / 2
        && state.currency >= tuning.economy.heal_cost;
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::director::begin_campaign;
    use crate::sim::entity::Entity;
    use crate::sim::state::{GameEvent, ItemKind};
    use crate::sim::test_support::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn run(state: &GameState, input: &mut TickInput, tuning: &Tuning, n: usize) -> GameState {
        let mut rng = rng();
        let mut state = state.clone();
        for _ in 0..n {
            state = tick(&state, input, tuning, &mut rng);
        }
        state
    }

    #[test]
    fn test_tick_leaves_previous_snapshot_alone() {
        let tuning = quiet_tuning();
        let mut prev = playing_state(&tuning);
        prev.enemies.push(enemy_at("e", Vec2::new(600.0, 300.0), 60));
        let copy = prev.clone();
        let mut input = TickInput {
            right: true,
            attack: true,
            ..Default::default()
        };
        let next = tick(&prev, &mut input, &tuning, &mut rng());
        assert_eq!(prev, copy);
        assert_ne!(next.player.body.pos, prev.player.body.pos);
        assert_eq!(next.frames, prev.frames + 1);
    }

    #[test]
    fn test_kill_scenario_awards_and_drops() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        let c = state.player.body.center();
        // Two 40-damage swings finish a 60 hp enemy
        state.enemies.push(enemy_at("e", c + Vec2::new(50.0, 0.0), 60));
        let mut input = TickInput {
            attack: true,
            ..Default::default()
        };
        let mut rng = rng();

        state = tick(&state, &mut input, &tuning, &mut rng);
        assert_eq!(state.enemies[0].health, 20);

        // Cooldown holds the next swing back
        for _ in 0..tuning.player.cooldown {
            state = tick(&state, &mut input, &tuning, &mut rng);
        }
        assert!(state.enemies.is_empty());
        assert_eq!(state.currency, tuning.economy.kill_currency);
        assert_eq!(state.score, tuning.economy.kill_score);
        // Pickups ran before the sweep, so the drop is still on the field
        assert_eq!(state.items.len(), 1);
        assert!(matches!(state.items[0].kind, ItemKind::Currency(_) | ItemKind::Weapon(_)));
        assert_eq!(state.phase, GamePhase::Celebrating);
        assert_eq!(state.celebration_ticks, tuning.celebration_ticks);
    }

    #[test]
    fn test_held_attack_fires_once_per_cooldown() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        let c = state.player.body.center();
        state.enemies.push(enemy_at("dummy", c + Vec2::new(50.0, 0.0), 1_000_000));
        let mut input = TickInput {
            attack: true,
            ..Default::default()
        };
        let n = 100u32;
        let mut rng = rng();
        let mut swings = 0;
        for _ in 0..n {
            state = tick(&state, &mut input, &tuning, &mut rng);
            swings += state
                .events
                .iter()
                .filter(|e| **e == GameEvent::Sound(SoundEffect::Attack))
                .count() as u32;
        }
        assert!(swings > 1);
        assert!(swings <= n / tuning.player.cooldown + 1);
        assert!(input.attack, "attack follows the key and is never cleared");
    }

    #[test]
    fn test_edge_triggered_intents_are_consumed() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        state.currency = 1000;
        state.player.body.health = 50;
        let mut input = TickInput {
            upgrade: true,
            skill: true,
            ..Default::default()
        };
        let mut rng = rng();
        state = tick(&state, &mut input, &tuning, &mut rng);
        assert!(!input.upgrade);
        assert!(!input.skill);
        assert_eq!(state.player.upgrade_level, 2);

        state = tick(&state, &mut input, &tuning, &mut rng);
        assert_eq!(state.player.upgrade_level, 2);
        assert_eq!(state.currency, 900);
    }

    #[test]
    fn test_unaffordable_upgrade_stays_latched() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        state.enemies.push(enemy_at("far", Vec2::new(50.0, 50.0), 100));
        state.currency = 90;
        let mut input = TickInput {
            upgrade: true,
            ..Default::default()
        };
        state = tick(&state, &mut input, &tuning, &mut rng());
        assert_eq!(state.currency, 90);
        assert_eq!(state.player.upgrade_level, 1);
        assert!(input.upgrade);
    }

    #[test]
    fn test_contact_damage_lands_on_boundary_only() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        let c = state.player.body.center();
        state.enemies.push(enemy_at("e", c + Vec2::new(40.0, 0.0), 100));
        // One tick before the boundary
        state.combat_ticks = 39;
        let mut input = TickInput::default();
        let mut rng = rng();

        state = tick(&state, &mut input, &tuning, &mut rng);
        assert_eq!(state.player.body.health, 100);
        state = tick(&state, &mut input, &tuning, &mut rng);
        assert_eq!(state.player.body.health, 77);
        for _ in 0..39 {
            state = tick(&state, &mut input, &tuning, &mut rng);
        }
        assert_eq!(state.player.body.health, 77);
        state = tick(&state, &mut input, &tuning, &mut rng);
        assert_eq!(state.player.body.health, 54);
    }

    #[test]
    fn test_lethal_contact_ends_run() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        state.player.body.health = 10;
        let c = state.player.body.center();
        state.enemies.push(enemy_at("e", c + Vec2::new(40.0, 0.0), 100));
        let mut input = TickInput::default();
        state = tick(&state, &mut input, &tuning, &mut rng());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.body.health, 0);
        assert!(state.events.contains(&GameEvent::Sound(SoundEffect::GameOver)));

        // Terminal: further ticks change nothing but the frame counter
        let after = tick(&state, &mut input, &tuning, &mut rng());
        assert_eq!(after.phase, GamePhase::GameOver);
        assert_eq!(after.player, state.player);
    }

    #[test]
    fn test_defeat_beats_clear_in_same_tick() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        // Empty field and a dead player: both predicates hold
        state.player.body.health = 0;
        state = tick(&state, &mut TickInput::default(), &tuning, &mut rng());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.events.contains(&GameEvent::Sound(SoundEffect::Victory)));
    }

    #[test]
    fn test_empty_level_completes_immediately() {
        let tuning = quiet_tuning();
        let state = playing_state(&tuning);
        let next = tick(&state, &mut TickInput::default(), &tuning, &mut rng());
        assert_eq!(next.phase, GamePhase::Celebrating);
    }

    #[test]
    fn test_celebration_routes_to_transition_then_next_level() {
        let mut tuning = quiet_tuning();
        tuning.celebration_ticks = 3;
        let state = playing_state(&tuning);
        let mut input = TickInput {
            right: true,
            ..Default::default()
        };
        let celebrating = run(&state, &mut input, &tuning, 1);
        assert_eq!(celebrating.phase, GamePhase::Celebrating);
        let pos = celebrating.player.body.pos;

        let waiting = run(&celebrating, &mut input, &tuning, 2);
        assert_eq!(waiting.phase, GamePhase::Celebrating);
        assert_eq!(waiting.player.body.pos, pos);

        let transition = run(&waiting, &mut input, &tuning, 1);
        assert_eq!(transition.phase, GamePhase::LevelTransition);

        let next = run(&transition, &mut input, &tuning, 1);
        assert_eq!(next.phase, GamePhase::Playing);
        assert_eq!(next.level, 2);
        assert_eq!(next.enemies.len(), 5);
    }

    #[test]
    fn test_checkpoint_level_opens_warehouse() {
        let mut tuning = quiet_tuning();
        tuning.celebration_ticks = 1;
        let mut state = playing_state(&tuning);
        state.level = 2;
        let mut input = TickInput::default();
        let state = run(&state, &mut input, &tuning, 2);
        assert_eq!(state.phase, GamePhase::Warehouse);
        // Waits for the close callback
        let state = run(&state, &mut input, &tuning, 10);
        assert_eq!(state.phase, GamePhase::Warehouse);
    }

    #[test]
    fn test_final_clear_is_victory() {
        let mut tuning = quiet_tuning();
        tuning.celebration_ticks = 1;
        let mut state = playing_state(&tuning);
        state.level = 5;
        let state = run(&state, &mut TickInput::default(), &tuning, 2);
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(matches!(
            state.pending_narrative.map(|p| p.request.topic),
            Some(NarrativeTopic::Victory)
        ));
    }

    #[test]
    fn test_narrative_times_out_to_fallback() {
        let mut tuning = quiet_tuning();
        tuning.narrative_timeout_ticks = 5;
        let mut state = GameState::new(&tuning);
        begin_campaign(&mut state, &tuning, &mut rng());
        let topic = NarrativeTopic::Level { level: 1, boss: false };

        let mut input = TickInput::default();
        let state = run(&state, &mut input, &tuning, 4);
        assert!(state.pending_narrative.is_some());
        let state = run(&state, &mut input, &tuning, 1);
        assert!(state.pending_narrative.is_none());
        assert_eq!(state.narrative, topic.fallback());
    }

    #[test]
    fn test_pickup_reached_by_moving_same_tick() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        state.enemies.push(enemy_at("far", Vec2::new(50.0, 50.0), 100));
        // 60px right of the player's center: out of reach until the step
        let at = state.player.body.center() + Vec2::new(60.0, 0.0) - Vec2::splat(22.5);
        state.spawn_item(ItemKind::Currency(40), at);
        let mut input = TickInput {
            right: true,
            ..Default::default()
        };
        let state = tick(&state, &mut input, &tuning, &mut rng());
        assert!(state.items.is_empty());
        assert_eq!(state.currency, 40);
    }

    #[test]
    fn test_autopilot_clears_level_one() {
        let tuning = Tuning::default();
        let mut state = GameState::new(&tuning);
        let mut rng = rng();
        begin_campaign(&mut state, &tuning, &mut rng);
        let mut input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..3_000 {
            state = tick(&state, &mut input, &tuning, &mut rng);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::Celebrating);
        assert!(state.score >= 3 * tuning.economy.kill_score);
    }

    fn positions(entities: &[Entity]) -> Vec<(String, Vec2)> {
        entities.iter().map(|e| (e.id.clone(), e.pos)).collect()
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (any::<[bool; 8]>()).prop_map(|b| TickInput {
            up: b[0],
            down: b[1],
            left: b[2],
            right: b[3],
            attack: b[4],
            skill: b[5],
            buy: b[6],
            upgrade: b[7],
            idle_mode: false,
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_health_stays_in_bounds(seed in any::<u64>(), inputs in prop::collection::vec(arb_input(), 1..300)) {
            use rand::SeedableRng;
            let tuning = Tuning::default();
            let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
            let mut state = GameState::new(&tuning);
            begin_campaign(&mut state, &tuning, &mut rng);
            state.currency = 500;
            for mut input in inputs {
                state = tick(&state, &mut input, &tuning, &mut rng);
                let body = &state.player.body;
                prop_assert!(0 <= body.health && body.health <= body.max_health);
                for e in state.enemies.iter().chain(state.allies.iter()) {
                    prop_assert!(0 < e.health && e.health <= e.max_health, "{} at {}", e.id, e.health);
                }
            }
        }

        #[test]
        fn prop_nothing_moves_outside_play(seed in any::<u64>(), inputs in prop::collection::vec(arb_input(), 1..400)) {
            use rand::SeedableRng;
            let mut tuning = Tuning::default();
            tuning.celebration_ticks = 20;
            let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
            let mut state = GameState::new(&tuning);
            begin_campaign(&mut state, &tuning, &mut rng);
            // Weak enemies so runs reach the non-playing phases
            for e in &mut state.enemies {
                e.health = 1;
            }
            for mut input in inputs {
                let next = tick(&state, &mut input, &tuning, &mut rng);
                if !matches!(state.phase, GamePhase::Playing | GamePhase::LevelTransition) {
                    prop_assert_eq!(next.player.body.pos, state.player.body.pos);
                    prop_assert_eq!(positions(&next.enemies), positions(&state.enemies));
                    prop_assert_eq!(positions(&next.allies), positions(&state.allies));
                }
                state = next;
            }
        }
    }
}
