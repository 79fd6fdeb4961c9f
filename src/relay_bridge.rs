//! Publishes local play sessions through a relay host.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::core::{Event, EventKind};
use crate::relay::{HostNotice, RelayHandle};
use crate::states::SessionObserver;

/// Relay payload for one engine event: `{"event": name, ...fields}`.
pub fn event_payload(event: &Event) -> Value {
    let mut payload = match event.kind {
        EventKind::PositionChanged { current, last } | EventKind::ParentChanged { current, last } => {
            json!({ "current": [current.x, current.y], "last": [last.x, last.y] })
        }
        EventKind::BlockAdded { block } | EventKind::BlockRemoved { block } => {
            json!({ "block": block.raw() })
        }
        EventKind::CurrentPieceChanged { current, last } => json!({
            "current": current.map(|id| id.raw()),
            "last": last.map(|id| id.raw()),
        }),
        EventKind::ScoreChanged { score } => json!({ "score": score }),
        EventKind::LevelChanged { level } => json!({ "level": level }),
        EventKind::LinesChanged { lines } => json!({ "lines": lines }),
        EventKind::Rotated
        | EventKind::PieceRotatedLeft
        | EventKind::PieceRotatedRight
        | EventKind::PieceMoved => json!({}),
    };
    if let Value::Object(map) = &mut payload {
        map.insert("event".to_string(), Value::from(event.name()));
    }
    payload
}

/// Log whatever the relay has reported since the last call.
pub fn drain_notices(handle: &RefCell<RelayHandle>) {
    let mut handle = handle.borrow_mut();
    while let Some(notice) = handle.try_recv() {
        match notice {
            HostNotice::Joined { id, name } => info!(id, name = %name, "relay peer joined"),
            HostNotice::Left { id } => info!(id, "relay peer left"),
            HostNotice::Event { .. } => {}
            HostNotice::Ended { id, score } => info!(id, score, "relay peer ended"),
            HostNotice::Winner { id, score } => info!(id, score, "relay winner"),
        }
    }
}

/// Forwards the local session to connected peers as participant 0.
///
/// The relay game starts with the first session. Later sessions keep
/// publishing events, but only the first score counts on the host.
pub struct RelayObserver {
    handle: Rc<RefCell<RelayHandle>>,
    started: bool,
    /// Set once the current session has reported its end.
    ended: bool,
}

impl RelayObserver {
    pub fn new(handle: Rc<RefCell<RelayHandle>>) -> Self {
        Self {
            handle,
            started: false,
            ended: false,
        }
    }
}

impl SessionObserver for RelayObserver {
    fn session_started(&mut self, piece_type: &str) {
        self.ended = false;
        if self.started {
            return;
        }
        self.started = true;
        info!(piece_type, "starting relay game");
        if let Err(e) = self.handle.borrow().start_game() {
            warn!(error = %e, "relay unavailable");
        }
    }

    fn game_event(&mut self, event: &Event) {
        if !self.started || self.ended {
            return;
        }
        if let Err(e) = self.handle.borrow().publish(event_payload(event)) {
            warn!(error = %e, "relay unavailable");
        }
    }

    fn session_ended(&mut self, score: u32) {
        if !self.started || self.ended {
            return;
        }
        self.ended = true;
        if let Err(e) = self.handle.borrow().end_local(score) {
            warn!(error = %e, "relay unavailable");
        }
        drain_notices(&self.handle);
    }
}
