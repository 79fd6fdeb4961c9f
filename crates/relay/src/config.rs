use std::net::SocketAddr;

use crate::error::RelayError;

/// Relay host configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    /// Display name of participant 0.
    pub name: String,
    /// Whether the host process plays too. A pure relay only forwards.
    pub local_player: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            name: "host".to_string(),
            local_player: true,
        }
    }
}

impl RelayConfig {
    /// Read `BLOCKFALL_RELAY_HOST`, `BLOCKFALL_RELAY_PORT` and
    /// `BLOCKFALL_RELAY_NAME`, falling back to the defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("BLOCKFALL_RELAY_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("BLOCKFALL_RELAY_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let name = env::var("BLOCKFALL_RELAY_NAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.name);

        Self {
            host,
            port,
            name,
            local_player: defaults.local_player,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, RelayError> {
        let text = format!("{}:{}", self.host, self.port);
        text.parse().map_err(|_| RelayError::InvalidAddress(text))
    }
}
