//! Standalone relay host.
//!
//! Forwards events between connected clients without playing itself. Type
//! `start` to close the lobby; `quit` or end of input stops the relay.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use blockfall::relay::{run_host, HostCommand, HostNotice, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = RelayConfig {
        local_player: false,
        ..RelayConfig::from_env()
    };
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (note_tx, mut note_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();

    let host = tokio::spawn(run_host(config, cmd_rx, note_tx, Some(ready_tx)));
    let addr = match ready_rx.await {
        Ok(addr) => addr,
        Err(_) => return host.await?.context("relay failed to start"),
    };
    info!(%addr, "type `start` to begin the game");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = stdin.next_line() => {
                match line?.as_deref().map(str::trim) {
                    Some("start") => {
                        if cmd_tx.send(HostCommand::Start).is_err() {
                            break;
                        }
                    }
                    Some("quit") | None => break,
                    Some("") => {}
                    Some(other) => warn!(command = other, "unknown command"),
                }
            }
            notice = note_rx.recv() => {
                match notice {
                    Some(HostNotice::Winner { id, score }) => info!(id, score, "game over"),
                    Some(HostNotice::Event { from, payload }) => {
                        tracing::debug!(from, %payload, "event");
                    }
                    Some(other) => info!(?other, "relay"),
                    None => break,
                }
            }
        }
    }

    drop(cmd_tx);
    host.await?.context("relay stopped with an error")?;
    Ok(())
}
