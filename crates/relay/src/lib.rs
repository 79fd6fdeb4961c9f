//! Multiplayer relay over TCP with a line-delimited JSON protocol.
//!
//! The host only relays: it hands out participant ids, rebroadcasts gameplay
//! events and announces the winner once every participant has ended. It never
//! runs game logic for anyone.
//!
//! # Message Types
//!
//! ## Client → Host
//!
//! - **hello**: join the lobby under a display name
//! - **event**: an opaque gameplay event to mirror to the others
//! - **ended**: the client's session finished with a score
//!
//! ## Host → Client
//!
//! - **welcome**: the assigned id and everyone already present
//! - **joined** / **left**: roster changes
//! - **started**: the lobby is closed
//! - **rejected**: the connection arrived after the start
//! - **event** / **ended**: mirrored from another participant
//! - **winner**: highest score, ties to the lowest id

pub mod config;
pub mod error;
pub mod handle;
pub mod host;
pub mod protocol;

pub use config::RelayConfig;
pub use error::RelayError;
pub use handle::RelayHandle;
pub use host::{run_host, HostCommand, HostNotice};
pub use protocol::{
    encode_line, parse_client_message, parse_host_message, ClientMessage, HostMessage, Peer, PeerId,
    HOST_ID,
};
