//! Flavour text between levels
//!
//! Narrative is decoration: requests are tagged with a ticket, answered
//! whenever the generator gets around to it, and replaced by fixed text on
//! failure. Nothing in the phase machine waits for it.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::error::NarrativeError;

/// Shown on the title screen before the first request
pub const OPENING_TEXT: &str =
    "Squad on standby. Target locked on the cyber district. Clear every thug.";

/// What a line of narrative is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeTopic {
    Level { level: u32, boss: bool },
    Victory,
}

impl NarrativeTopic {
    /// Deterministic text used when the generator fails or stalls
    pub fn fallback(&self) -> String {
        match self {
            NarrativeTopic::Level { .. } => {
                "Front line locked. The squad begins its advance.".to_string()
            }
            NarrativeTopic::Victory => "The streets fall silent. Mission complete.".to_string(),
        }
    }
}

/// A pending request, tagged so late answers for stale topics can be dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub ticket: u64,
    pub topic: NarrativeTopic,
}

/// Turn a generator result into display text
pub fn resolve_text(topic: &NarrativeTopic, result: Result<String, NarrativeError>) -> String {
    match result {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            log::warn!("{}; using fallback", NarrativeError::Empty);
            topic.fallback()
        }
        Err(err) => {
            log::warn!("{err}; using fallback");
            topic.fallback()
        }
    }
}

/// External text generator. May block; it is always called off the tick path.
pub trait Narrator: Send + Sync {
    fn compose(&self, topic: &NarrativeTopic) -> Result<String, NarrativeError>;
}

/// Offline generator with canned lines
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedNarrator;

impl Narrator for ScriptedNarrator {
    fn compose(&self, topic: &NarrativeTopic) -> Result<String, NarrativeError> {
        Ok(match topic {
            NarrativeTopic::Level { boss: true, level } => format!(
                "Sector {level}: the red-haired boss is in sight. Hold the line."
            ),
            NarrativeTopic::Level { level, .. } => format!(
                "Sector {level}: more street thugs are crawling out of the neon shadows."
            ),
            NarrativeTopic::Victory => "District secured. The squad stands victorious.".to_string(),
        })
    }
}

type Delivery = (u64, Result<String, NarrativeError>);

/// Runs a narrator on worker threads and collects answers for the driver
pub struct NarrativeMailbox {
    narrator: Arc<dyn Narrator>,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl NarrativeMailbox {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { narrator, tx, rx }
    }

    /// Start composing in the background
    pub fn dispatch(&self, request: NarrativeRequest) {
        let narrator = Arc::clone(&self.narrator);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("narrative-{}", request.ticket))
            .spawn(move || {
                let result = narrator.compose(&request.topic);
                // Receiver gone means the session ended; nothing to do
                let _ = tx.send((request.ticket, result));
            });
        if let Err(err) = spawned {
            log::warn!("Failed to spawn narrative worker: {err}");
            let _ = self.tx.send((
                request.ticket,
                Err(NarrativeError::Generator(err.to_string())),
            ));
        }
    }

    /// Collect every answer that has arrived, without blocking
    pub fn drain(&self) -> Vec<Delivery> {
        self.rx.try_iter().collect()
    }
}
