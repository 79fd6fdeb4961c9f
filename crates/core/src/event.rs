//! Event module - synchronous publish/subscribe with suppression scopes
//!
//! An [`EventDispatcher`] holds an insertion-ordered set of handlers. Invoking it
//! calls every handler, in subscription order, on the calling thread. While a
//! [`Suppressed`] guard is alive the dispatcher drops every event it is given.
//!
//! Dispatch works on a snapshot of the handler list taken when `invoke` starts,
//! so handlers may subscribe, unsubscribe or re-enter `invoke` freely.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Point;

/// Shared handler reference. Identity (not equality) decides membership.
pub type Handler<E = Event> = Rc<dyn Fn(&E)>;

/// Build a handler from a closure.
pub fn handler<E, F>(f: F) -> Handler<E>
where
    F: Fn(&E) + 'static,
{
    Rc::new(f)
}

/// Unsubscribe was asked to remove a handler that is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("handler not found in dispatcher")]
pub struct HandlerNotFound;

/// Identity of an event source. Unique per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        EntityId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened. The payload fields replace free-form positional and keyed
/// arguments; [`EventKind::name`] gives the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Absolute position moved from `last` to `current`.
    PositionChanged { current: Point, last: Point },
    /// The parent was rebound. Carries absolute positions, not parent identities.
    ParentChanged { current: Point, last: Point },
    /// A piece rotated its blocks.
    Rotated,
    /// A block was merged into a grid.
    BlockAdded { block: EntityId },
    /// A block was removed by a row clear.
    BlockRemoved { block: EntityId },
    CurrentPieceChanged {
        current: Option<EntityId>,
        last: Option<EntityId>,
    },
    ScoreChanged { score: u32 },
    LevelChanged { level: u32 },
    LinesChanged { lines: u32 },
    PieceRotatedLeft,
    PieceRotatedRight,
    PieceMoved,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PositionChanged { .. } => "position-changed",
            EventKind::ParentChanged { .. } => "parent-changed",
            EventKind::Rotated => "rotated",
            EventKind::BlockAdded { .. } => "block-added",
            EventKind::BlockRemoved { .. } => "block-removed",
            EventKind::CurrentPieceChanged { .. } => "current-piece-changed",
            EventKind::ScoreChanged { .. } => "score-changed",
            EventKind::LevelChanged { .. } => "level-changed",
            EventKind::LinesChanged { .. } => "lines-changed",
            EventKind::PieceRotatedLeft => "piece-rotated-left",
            EventKind::PieceRotatedRight => "piece-rotated-right",
            EventKind::PieceMoved => "piece-moved",
        }
    }
}

/// Immutable event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub source: EntityId,
    pub kind: EventKind,
}

impl Event {
    pub fn new(source: EntityId, kind: EventKind) -> Self {
        Self { source, kind }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Publish/subscribe channel with reference-counted suppression.
pub struct EventDispatcher<E = Event> {
    handlers: RefCell<Vec<Handler<E>>>,
    suppress_count: Cell<u32>,
}

impl<E> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            suppress_count: Cell::new(0),
        }
    }

    /// Add a handler. Adding one that is already registered is a no-op.
    pub fn subscribe(&self, handler: &Handler<E>) {
        let mut handlers = self.handlers.borrow_mut();
        if !handlers.iter().any(|h| same_handler(h, handler)) {
            handlers.push(Rc::clone(handler));
        }
    }

    /// Remove a handler.
    pub fn unsubscribe(&self, handler: &Handler<E>) -> Result<(), HandlerNotFound> {
        let mut handlers = self.handlers.borrow_mut();
        let idx = handlers
            .iter()
            .position(|h| same_handler(h, handler))
            .ok_or(HandlerNotFound)?;
        handlers.remove(idx);
        Ok(())
    }

    pub fn contains(&self, handler: &Handler<E>) -> bool {
        self.handlers
            .borrow()
            .iter()
            .any(|h| same_handler(h, handler))
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    /// Deliver an event to every handler registered when the call started.
    ///
    /// Does nothing while suppressed.
    pub fn invoke(&self, event: &E) {
        if self.is_suppressed() {
            return;
        }
        // The borrow ends before any handler runs.
        let snapshot: Vec<Handler<E>> = self.handlers.borrow().clone();
        for h in &snapshot {
            h(event);
        }
    }

    /// Open a suppression scope. Events are dropped until every open scope
    /// has been closed.
    pub fn suppress(&self) -> Suppressed<'_, E> {
        self.suppress_count.set(self.suppress_count.get() + 1);
        Suppressed { dispatcher: self }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_count.get() > 0
    }
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.len())
            .field("suppress_count", &self.suppress_count.get())
            .finish()
    }
}

/// Suppression scope. Dropping it (including during unwinding) closes the scope.
#[must_use = "events are only suppressed while the guard is alive"]
pub struct Suppressed<'a, E = Event> {
    dispatcher: &'a EventDispatcher<E>,
}

impl<E> Drop for Suppressed<'_, E> {
    fn drop(&mut self) {
        let count = self.dispatcher.suppress_count.get();
        self.dispatcher.suppress_count.set(count.saturating_sub(1));
    }
}

fn same_handler<E>(a: &Handler<E>, b: &Handler<E>) -> bool {
    // Compare data pointers only; vtable pointers are not guaranteed unique.
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}
