//! Application state machine.
//!
//! A stack of screens sharing one [`SharedData`] bag. The stack starts with a
//! [`LoadState`], which reads the game data on a worker thread and then turns
//! into the main menu:
//!
//! ```text
//! load -> main-menu -> new-game -> play <-> paused
//!                   \-> high-scores
//! ```
//!
//! When the last state is popped, [`StateManager::empty_event`] fires and the
//! binary exits.

pub mod error;
pub mod highscore;
pub mod manager;
pub mod screens;
pub mod shared;

pub use blockfall_core as core;
pub use blockfall_term as term;
pub use blockfall_types as types;

pub use error::{ScoreFileError, StateInitError};
pub use highscore::{HighScores, ScoreEntry};
pub use manager::{StackEmptied, State, StateManager, Transition};
pub use screens::{
    HighScoresState, LoadState, Loader, MainMenuState, NewGameMenuState, PausedState, PlayState,
    PLAY_ORIGIN,
};
pub use shared::{SessionObserver, SharedData};
