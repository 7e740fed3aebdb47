//! Warehouse interlude callbacks
//!
//! The hub UI mutates a small slice of state through these functions. Every
//! callback is a no-op outside the warehouse phase.

use serde::{Deserialize, Serialize};

use super::loot::equip_weapon;
use super::state::{GamePhase, GameState};
use crate::audio::SoundEffect;
use crate::tuning::{Tuning, WeaponKind};

/// Named things the warehouse sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubOffer {
    /// Restore health to max
    Repair,
    /// Swap to a specific weapon
    Armory(WeaponKind),
}

impl HubOffer {
    pub fn cost(&self, tuning: &Tuning) -> u32 {
        match self {
            HubOffer::Repair => tuning.economy.repair_cost,
            HubOffer::Armory(_) => tuning.economy.armory_cost,
        }
    }
}

/// What the driver should do after a side challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    Rewarded(u32),
    /// Failure wipes the run
    Restart,
    Ignored,
}

fn in_warehouse(state: &GameState) -> bool {
    state.phase == GamePhase::Warehouse
}

/// Buy an offer. Returns false when unaffordable or outside the warehouse.
pub fn spend(state: &mut GameState, offer: HubOffer, tuning: &Tuning) -> bool {
    let cost = offer.cost(tuning);
    if !in_warehouse(state) || state.currency < cost {
        return false;
    }
    state.currency -= cost;
    match offer {
        HubOffer::Repair => {
            let body = &mut state.player.body;
            body.health = body.max_health;
        }
        HubOffer::Armory(kind) => equip_weapon(state, kind, tuning),
    }
    log::info!("Warehouse purchase {offer:?} for {cost}");
    state.sound(SoundEffect::Buy);
    true
}

/// Recruit the companion; it joins from the next level on
pub fn recruit_ally(state: &mut GameState) -> bool {
    if !in_warehouse(state) || state.ally_recruited {
        return false;
    }
    state.ally_recruited = true;
    log::info!("Ally recruited");
    true
}

/// Mark a task done and pay its reward. Unknown or finished tasks are ignored.
pub fn complete_task(state: &mut GameState, task_id: &str) -> bool {
    if !in_warehouse(state) {
        return false;
    }
    let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id && !t.completed) else {
        return false;
    };
    task.completed = true;
    let reward = task.reward;
    state.currency = state.currency.saturating_add(reward);
    log::info!("Task {task_id} complete, +{reward}");
    true
}

/// Settle the binary side challenge
pub fn resolve_challenge(state: &mut GameState, success: bool, tuning: &Tuning) -> ChallengeOutcome {
    if !in_warehouse(state) {
        return ChallengeOutcome::Ignored;
    }
    if success {
        let reward = tuning.economy.challenge_reward;
        state.currency = state.currency.saturating_add(reward);
        ChallengeOutcome::Rewarded(reward)
    } else {
        log::warn!("Side challenge failed on level {}, restarting run", state.level);
        ChallengeOutcome::Restart
    }
}

/// Leave the warehouse toward the next level
pub fn close_warehouse(state: &mut GameState) -> bool {
    if !in_warehouse(state) {
        return false;
    }
    state.set_phase(GamePhase::LevelTransition);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::*;

    fn warehouse(tuning: &Tuning) -> GameState {
        let mut state = playing_state(tuning);
        state.phase = GamePhase::Warehouse;
        state
    }

    #[test]
    fn test_callbacks_ignored_outside_warehouse() {
        let tuning = quiet_tuning();
        let mut state = playing_state(&tuning);
        state.currency = 1000;
        assert!(!spend(&mut state, HubOffer::Repair, &tuning));
        assert!(!recruit_ally(&mut state));
        assert!(!complete_task(&mut state, "patrol"));
        assert_eq!(resolve_challenge(&mut state, false, &tuning), ChallengeOutcome::Ignored);
        assert!(!close_warehouse(&mut state));
        assert_eq!(state.currency, 1000);
    }

    #[test]
    fn test_repair_and_armory() {
        let tuning = quiet_tuning();
        let mut state = warehouse(&tuning);
        state.currency = 250;
        state.player.body.health = 10;

        assert!(spend(&mut state, HubOffer::Repair, &tuning));
        assert_eq!(state.player.body.health, 100);
        assert_eq!(state.currency, 190);

        assert!(spend(&mut state, HubOffer::Armory(WeaponKind::Hammer), &tuning));
        assert_eq!(state.player.body.weapon, WeaponKind::Hammer);
        assert_eq!(state.currency, 40);

        assert!(!spend(&mut state, HubOffer::Repair, &tuning));
        assert_eq!(state.currency, 40);
    }

    #[test]
    fn test_tasks_pay_once() {
        let tuning = quiet_tuning();
        let mut state = warehouse(&tuning);
        assert!(complete_task(&mut state, "intel"));
        assert!(!complete_task(&mut state, "intel"));
        assert!(!complete_task(&mut state, "missing"));
        assert_eq!(state.currency, 100);
        assert!(state.tasks.iter().find(|t| t.id == "intel").is_some_and(|t| t.completed));
    }

    #[test]
    fn test_recruit_once_and_close() {
        let tuning = quiet_tuning();
        let mut state = warehouse(&tuning);
        assert!(recruit_ally(&mut state));
        assert!(!recruit_ally(&mut state));
        assert!(state.ally_recruited);
        assert!(close_warehouse(&mut state));
        assert_eq!(state.phase, GamePhase::LevelTransition);
    }

    #[test]
    fn test_challenge_outcomes() {
        let tuning = quiet_tuning();
        let mut state = warehouse(&tuning);
        assert_eq!(resolve_challenge(&mut state, true, &tuning), ChallengeOutcome::Rewarded(80));
        assert_eq!(state.currency, 80);
        assert_eq!(resolve_challenge(&mut state, false, &tuning), ChallengeOutcome::Restart);
    }
}
