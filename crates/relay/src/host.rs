//! Relay host: identity bookkeeping and broadcast, no game logic.
//!
//! Before the game starts, clients connect and say `hello`; each gets the next
//! id and the list of everyone already present. After the start, late
//! connections are rejected, gameplay events are relayed to every other
//! participant, and once every participant has ended the winner is announced.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::protocol::{encode_line, parse_client_message, ClientMessage, HostMessage, Peer, PeerId, HOST_ID};

/// Command from the host process to the relay task.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Close the lobby and announce the start.
    Start,
    /// Mirror a host-local gameplay event to every client.
    Publish(Value),
    /// The host's own session ended with this score.
    EndLocal(u32),
}

/// What the relay reports back to the host process.
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotice {
    Joined { id: PeerId, name: String },
    Left { id: PeerId },
    Event { from: PeerId, payload: Value },
    Ended { id: PeerId, score: u32 },
    Winner { id: PeerId, score: u32 },
}

struct Participant {
    name: String,
    /// `None` for the host itself and for clients gone after ending.
    tx: Option<mpsc::UnboundedSender<HostMessage>>,
    ended: Option<u32>,
}

/// Who is present and how far along they are.
pub(crate) struct Roster {
    started: bool,
    local_player: bool,
    winner_sent: bool,
    peers: BTreeMap<PeerId, Participant>,
}

impl Roster {
    pub(crate) fn new(config: &RelayConfig) -> Self {
        let mut peers = BTreeMap::new();
        peers.insert(
            HOST_ID,
            Participant {
                name: config.name.clone(),
                tx: None,
                ended: None,
            },
        );
        Self {
            started: false,
            local_player: config.local_player,
            winner_sent: false,
            peers,
        }
    }

    fn peer_list(&self) -> Vec<Peer> {
        self.peers
            .iter()
            .map(|(&id, p)| Peer {
                id,
                name: p.name.clone(),
            })
            .collect()
    }

    fn insert(&mut self, id: PeerId, name: String, tx: mpsc::UnboundedSender<HostMessage>) {
        self.peers.insert(
            id,
            Participant {
                name,
                tx: Some(tx),
                ended: None,
            },
        );
    }

    /// Drop a disconnected client. A finished session keeps its score in the race.
    fn remove(&mut self, id: PeerId) {
        match self.peers.get_mut(&id) {
            Some(p) if p.ended.is_some() => p.tx = None,
            Some(_) => {
                self.peers.remove(&id);
            }
            None => {}
        }
    }

    /// Send to every connected client except `except`.
    fn broadcast(&self, msg: &HostMessage, except: Option<PeerId>) {
        for (&id, p) in &self.peers {
            if Some(id) == except {
                continue;
            }
            if let Some(tx) = &p.tx {
                let _ = tx.send(msg.clone());
            }
        }
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(players = self.peers.len(), "game started");
        self.broadcast(&HostMessage::Started, None);
    }

    /// Record a finished session; returns the winner if this completed the game.
    pub(crate) fn record_end(&mut self, id: PeerId, score: u32) -> Option<(PeerId, u32)> {
        if !self.started {
            return None;
        }
        let p = self.peers.get_mut(&id)?;
        if p.ended.is_some() {
            return None;
        }
        p.ended = Some(score);
        info!(id, score, "participant ended");
        self.broadcast(&HostMessage::Ended { id, score }, None);
        self.check_winner()
    }

    /// Announce the winner once every participant has ended.
    ///
    /// Highest score wins; ties go to the lowest id.
    pub(crate) fn check_winner(&mut self) -> Option<(PeerId, u32)> {
        if !self.started || self.winner_sent {
            return None;
        }
        let local_player = self.local_player;
        let mut best: Option<(PeerId, u32)> = None;
        let mut any = false;
        for (&id, p) in &self.peers {
            if id == HOST_ID && !local_player {
                continue;
            }
            any = true;
            let score = p.ended?;
            // Ascending ids: strictly greater keeps the lowest id on ties.
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((id, score));
            }
        }
        if !any {
            return None;
        }
        let (id, score) = best?;
        self.winner_sent = true;
        info!(id, score, "winner");
        self.broadcast(&HostMessage::Winner { id, score }, None);
        Some((id, score))
    }
}

type SharedRoster = Arc<Mutex<Roster>>;

/// Run the relay until the command channel closes.
///
/// `ready` receives the bound address once the listener is up.
pub async fn run_host(
    config: RelayConfig,
    mut commands: mpsc::UnboundedReceiver<HostCommand>,
    notices: mpsc::UnboundedSender<HostNotice>,
    ready: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), RelayError> {
    let listener = TcpListener::bind(config.socket_addr()?).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, name = %config.name, "relay listening");
    if let Some(tx) = ready {
        let _ = tx.send(bound);
    }

    let roster: SharedRoster = Arc::new(Mutex::new(Roster::new(&config)));
    let mut next_id: PeerId = HOST_ID + 1;

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, addr) = accepted?;
                if roster.lock().await.started {
                    info!(%addr, "rejecting late connection");
                    tokio::spawn(reject(socket));
                    continue;
                }
                let id = next_id;
                next_id += 1;
                info!(id, %addr, "client connected");

                let roster = Arc::clone(&roster);
                let notices = notices.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(socket, id, roster, notices).await {
                        warn!(id, error = %e, "client error");
                    }
                    info!(id, "client disconnected");
                });
            }
            cmd = commands.recv() => {
                let Some(cmd) = cmd else {
                    info!("relay handle closed, stopping");
                    return Ok(());
                };
                let mut r = roster.lock().await;
                match cmd {
                    HostCommand::Start => r.start(),
                    HostCommand::Publish(payload) => {
                        if r.started {
                            r.broadcast(&HostMessage::Event { from: HOST_ID, payload }, Some(HOST_ID));
                        } else {
                            debug!("host event before start dropped");
                        }
                    }
                    HostCommand::EndLocal(score) => {
                        if let Some((id, score)) = r.record_end(HOST_ID, score) {
                            let _ = notices.send(HostNotice::Winner { id, score });
                        }
                    }
                }
            }
        }
    }
}

async fn reject(mut socket: TcpStream) {
    let msg = HostMessage::Rejected {
        reason: RelayError::GameStarted.to_string(),
    };
    if let Ok(line) = encode_line(&msg) {
        let _ = socket.write_all(line.as_bytes()).await;
    }
    let _ = socket.shutdown().await;
}

async fn handle_client(
    socket: TcpStream,
    id: PeerId,
    roster: SharedRoster,
    notices: mpsc::UnboundedSender<HostNotice>,
) -> Result<(), RelayError> {
    let (reader, mut writer) = socket.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<HostMessage>();

    // Writer task: ends when every sender is gone.
    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Ok(line) = encode_line(&msg) else {
                continue;
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let mut lines = BufReader::new(reader).lines();
    let mut registered = false;
    let result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(RelayError::from(e)),
        };
        if line.trim().is_empty() {
            continue;
        }
        let msg = match parse_client_message(&line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(id, error = %e, "ignoring malformed line");
                continue;
            }
        };

        let mut r = roster.lock().await;
        match msg {
            ClientMessage::Hello { name } if !registered => {
                if r.started {
                    let _ = tx.send(HostMessage::Rejected {
                        reason: RelayError::GameStarted.to_string(),
                    });
                    break Ok(());
                }
                let _ = tx.send(HostMessage::Welcome {
                    id,
                    peers: r.peer_list(),
                });
                r.broadcast(&HostMessage::Joined { id, name: name.clone() }, None);
                r.insert(id, name.clone(), tx.clone());
                registered = true;
                info!(id, name = %name, "client joined");
                let _ = notices.send(HostNotice::Joined { id, name });
            }
            ClientMessage::Hello { .. } => debug!(id, "repeated hello ignored"),
            ClientMessage::Event { payload } => {
                if registered && r.started {
                    r.broadcast(
                        &HostMessage::Event {
                            from: id,
                            payload: payload.clone(),
                        },
                        Some(id),
                    );
                    let _ = notices.send(HostNotice::Event { from: id, payload });
                } else {
                    debug!(id, "event before start dropped");
                }
            }
            ClientMessage::Ended { score } => {
                if registered && r.started {
                    let _ = notices.send(HostNotice::Ended { id, score });
                    if let Some((wid, wscore)) = r.record_end(id, score) {
                        let _ = notices.send(HostNotice::Winner { id: wid, score: wscore });
                    }
                }
            }
        }
    };

    if registered {
        let mut r = roster.lock().await;
        r.remove(id);
        r.broadcast(&HostMessage::Left { id }, None);
        let _ = notices.send(HostNotice::Left { id });
        // A participant who left no longer holds up the result.
        if let Some((wid, wscore)) = r.check_winner() {
            let _ = notices.send(HostNotice::Winner { id: wid, score: wscore });
        }
    }
    drop(tx);
    let _ = write_task.await;
    result
}
