//! Data shared by every state on the stack.

use std::fmt;

use crate::core::{Catalog, Event, SimpleRng};
use crate::error::StateInitError;
use crate::highscore::HighScores;

/// Receives the lifecycle of play sessions, e.g. to broadcast them.
pub trait SessionObserver {
    fn session_started(&mut self, piece_type: &str) {
        let _ = piece_type;
    }

    /// Engine-level events only: commands, counters, piece changes.
    fn game_event(&mut self, event: &Event) {
        let _ = event;
    }

    fn session_ended(&mut self, score: u32) {
        let _ = score;
    }
}

pub struct SharedData {
    /// Loaded game data; `None` until the load state finishes.
    pub catalog: Option<Catalog>,
    pub high_scores: HighScores,
    pub observer: Option<Box<dyn SessionObserver>>,
    seeds: SimpleRng,
}

impl SharedData {
    pub fn new(seed: u32) -> Self {
        Self {
            catalog: None,
            high_scores: HighScores::default(),
            observer: None,
            seeds: SimpleRng::new(seed),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_high_scores(mut self, high_scores: HighScores) -> Self {
        self.high_scores = high_scores;
        self
    }

    pub fn catalog(&self) -> Result<&Catalog, StateInitError> {
        self.catalog.as_ref().ok_or(StateInitError::MissingData("game data"))
    }

    /// Seed for the next play session.
    pub fn next_seed(&mut self) -> u32 {
        self.seeds.next_u32()
    }

    pub(crate) fn notify(&mut self, f: impl FnOnce(&mut dyn SessionObserver)) {
        if let Some(observer) = self.observer.as_deref_mut() {
            f(observer);
        }
    }
}

impl fmt::Debug for SharedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedData")
            .field("catalog", &self.catalog.is_some())
            .field("high_scores", &self.high_scores.entries().len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
