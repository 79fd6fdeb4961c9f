//! Bridges the sync game loop with the async relay host.

use std::net::SocketAddr;

use serde_json::Value;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, oneshot};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::host::{run_host, HostCommand, HostNotice};

/// Running relay host owned by a synchronous caller.
pub struct RelayHandle {
    _rt: Runtime,
    commands: mpsc::UnboundedSender<HostCommand>,
    notices: mpsc::UnboundedReceiver<HostNotice>,
    addr: SocketAddr,
}

impl RelayHandle {
    /// Bind the listener and return once it accepts connections.
    pub fn start(config: RelayConfig) -> Result<Self, RelayError> {
        let rt = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("relay")
            .enable_all()
            .build()?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (note_tx, note_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let task = rt.spawn(run_host(config, cmd_rx, note_tx, Some(ready_tx)));

        let addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            // The host gave up before binding; surface its error.
            Err(_) => {
                return Err(match rt.block_on(task) {
                    Ok(Err(e)) => e,
                    _ => RelayError::Stopped,
                })
            }
        };

        Ok(Self {
            _rt: rt,
            commands: cmd_tx,
            notices: note_rx,
            addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn start_game(&self) -> Result<(), RelayError> {
        self.send(HostCommand::Start)
    }

    pub fn publish(&self, payload: Value) -> Result<(), RelayError> {
        self.send(HostCommand::Publish(payload))
    }

    pub fn end_local(&self, score: u32) -> Result<(), RelayError> {
        self.send(HostCommand::EndLocal(score))
    }

    /// Next notice, if one is waiting.
    pub fn try_recv(&mut self) -> Option<HostNotice> {
        self.notices.try_recv().ok()
    }

    fn send(&self, cmd: HostCommand) -> Result<(), RelayError> {
        self.commands.send(cmd).map_err(|_| RelayError::Stopped)
    }
}
