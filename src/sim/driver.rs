//! Session driver
//!
//! Owns the current snapshot, the random source and the host-facing
//! collaborators (audio sink, narrative mailbox). The host calls
//! [`Simulation::tick`] once per display refresh; every mutation goes
//! through a private copy that is published in one step.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::director::begin_campaign;
use super::hub::{self, ChallengeOutcome, HubOffer};
use super::state::{GameEvent, GamePhase, GameState};
use super::tick::{TickInput, tick};
use crate::audio::AudioSink;
use crate::error::{NarrativeError, SaveError};
use crate::narrative::{NarrativeMailbox, Narrator, resolve_text};
use crate::persistence::SaveEnvelope;
use crate::tuning::Tuning;

pub struct Simulation<R = Pcg32> {
    state: GameState,
    rng: R,
    tuning: Tuning,
    audio: Option<Box<dyn AudioSink>>,
    mailbox: Option<NarrativeMailbox>,
}

impl Simulation<Pcg32> {
    /// Seeded session on the title screen
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), tuning)
    }

    /// Snapshot the session, random stream included
    pub fn save(&self) -> Result<String, SaveError> {
        SaveEnvelope::new(self.state.clone(), self.rng.clone()).to_json()
    }

    /// Resume a saved session. Collaborators are not part of the save.
    pub fn restore(json: &str, tuning: Tuning) -> Result<Self, SaveError> {
        let envelope = SaveEnvelope::from_json(json)?;
        log::info!(
            "Restored session at level {} ({:?}, frame {})",
            envelope.state.level,
            envelope.state.phase,
            envelope.state.frames
        );
        let mut sim = Self::with_rng(envelope.rng, tuning);
        sim.state = envelope.state;
        Ok(sim)
    }
}

impl<R: Rng> Simulation<R> {
    /// Session with an injected random source
    pub fn with_rng(rng: R, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(&tuning),
            rng,
            tuning,
            audio: None,
            mailbox: None,
        }
    }

    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    /// Answer narrative requests on background threads
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.mailbox = Some(NarrativeMailbox::new(narrator));
        self
    }

    /// Current published snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Idle -> Playing. Ignored in any other phase.
    pub fn start(&mut self) -> bool {
        if self.state.phase != GamePhase::Idle {
            return false;
        }
        let mut next = self.state.clone();
        next.events.clear();
        begin_campaign(&mut next, &self.tuning, &mut self.rng);
        self.publish(next);
        true
    }

    /// Back to the title screen. Outstanding narrative requests go stale.
    pub fn restart(&mut self) {
        let mut next = GameState::new(&self.tuning);
        next.narrative_ticket = self.state.narrative_ticket;
        next.phase = self.state.phase;
        next.set_phase(GamePhase::Idle);
        self.publish(next);
    }

    /// Advance one tick. Edge-triggered intents in `input` are cleared
    /// once consumed.
    pub fn tick(&mut self, input: &mut TickInput) -> &GameState {
        self.pump_narrative();
        let next = tick(&self.state, input, &self.tuning, &mut self.rng);
        self.publish(next);
        &self.state
    }

    /// Hand in narrative text for a ticket. Stale tickets are dropped.
    pub fn deliver_narrative(&mut self, ticket: u64, result: Result<String, NarrativeError>) -> bool {
        let Some(pending) = self.state.pending_narrative else {
            log::debug!("No narrative pending, dropping ticket {ticket}");
            return false;
        };
        if pending.request.ticket != ticket {
            log::info!("Discarding stale narrative for ticket {ticket}");
            return false;
        }
        let text = resolve_text(&pending.request.topic, result);
        self.apply(|state, _| state.accept_narrative(ticket, text))
    }

    pub fn spend(&mut self, offer: HubOffer) -> bool {
        self.apply(|state, tuning| hub::spend(state, offer, tuning))
    }

    pub fn recruit_ally(&mut self) -> bool {
        self.apply(|state, _| hub::recruit_ally(state))
    }

    pub fn complete_task(&mut self, task_id: &str) -> bool {
        self.apply(|state, _| hub::complete_task(state, task_id))
    }

    /// Success pays a reward; failure restarts the whole run
    pub fn resolve_challenge(&mut self, success: bool) -> ChallengeOutcome {
        let outcome = self.apply(|state, tuning| hub::resolve_challenge(state, success, tuning));
        if outcome == ChallengeOutcome::Restart {
            self.restart();
        }
        outcome
    }

    pub fn close_warehouse(&mut self) -> bool {
        self.apply(|state, _| hub::close_warehouse(state))
    }

    /// Run a callback against a copy and publish the result
    fn apply<T>(&mut self, f: impl FnOnce(&mut GameState, &Tuning) -> T) -> T {
        let mut next = self.state.clone();
        next.events.clear();
        let out = f(&mut next, &self.tuning);
        self.publish(next);
        out
    }

    fn pump_narrative(&mut self) {
        let Some(mailbox) = &self.mailbox else {
            return;
        };
        for (ticket, result) in mailbox.drain() {
            self.deliver_narrative(ticket, result);
        }
    }

    /// Make `next` current and notify collaborators of its events
    fn publish(&mut self, next: GameState) {
        self.state = next;
        for event in &self.state.events {
            match event {
                GameEvent::Sound(effect) => {
                    if let Some(audio) = self.audio.as_mut() {
                        audio.play(*effect);
                    }
                }
                GameEvent::NarrativeRequested(request) => {
                    if let Some(mailbox) = &self.mailbox {
                        mailbox.dispatch(*request);
                    }
                }
                _ => {}
            }
        }
    }
}
