#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("the game has already started")]
    GameStarted,
    #[error("invalid listen address: {0}")]
    InvalidAddress(String),
    #[error("relay i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol: {0}")]
    Protocol(String),
    #[error("relay host stopped")]
    Stopped,
}
