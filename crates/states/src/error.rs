//! Error types for the state machine.

use std::path::PathBuf;

/// A state refused to start. The transition that would have activated it is
/// abandoned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateInitError {
    #[error("shared data is missing {0}")]
    MissingData(&'static str),
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScoreFileError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed high score file: {0}")]
    Parse(#[from] serde_json::Error),
}
