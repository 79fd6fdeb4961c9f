//! Positioned entities - local offsets composed through a parent chain
//!
//! A [`Node`] has a local offset and an optional, non-owning parent link. Its
//! absolute position is recomputed on every query by walking the chain, so it
//! can never be stale.
//!
//! Notifications travel both ways:
//!
//! - **Down**: a node listens to its parent's dispatcher. When the parent
//!   reports that its own position changed, the node re-emits a
//!   `position-changed` in its own frame.
//! - **Up**: everything a node emits is delivered to its own handlers and then
//!   relayed to its parent's dispatcher, up to the root.
//!
//! The listener is moved from the old parent to the new one as part of
//! [`Node::set_parent`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::event::{handler, EntityId, Event, EventDispatcher, EventKind, Handler, Suppressed};
use crate::types::Point;

/// Non-owning link from a node to whatever sits above it.
#[derive(Clone, Default)]
pub enum ParentLink {
    /// No parent. The node's local offset is its absolute position.
    #[default]
    Root,
    /// A positioned parent. Contributes its absolute position.
    Entity(Weak<Node>),
    /// An event-only parent with no position (origin (0, 0)). Receives the
    /// node's events but never moves it.
    Observer(Weak<EventDispatcher>),
}

impl ParentLink {
    pub fn entity(node: &Rc<Node>) -> Self {
        ParentLink::Entity(Rc::downgrade(node))
    }

    pub fn observer(dispatcher: &Rc<EventDispatcher>) -> Self {
        ParentLink::Observer(Rc::downgrade(dispatcher))
    }

    /// Absolute origin the child's local offset is applied to.
    fn origin(&self) -> Point {
        match self {
            ParentLink::Entity(parent) => parent
                .upgrade()
                .map(|p| p.absolute_position())
                .unwrap_or(Point::ORIGIN),
            ParentLink::Root | ParentLink::Observer(_) => Point::ORIGIN,
        }
    }

    fn dispatcher(&self) -> Option<Rc<EventDispatcher>> {
        match self {
            ParentLink::Root => None,
            ParentLink::Entity(parent) => parent.upgrade().map(|p| Rc::clone(&p.events)),
            ParentLink::Observer(d) => d.upgrade(),
        }
    }

    fn entity_id(&self) -> Option<EntityId> {
        match self {
            ParentLink::Entity(parent) => parent.upgrade().map(|p| p.id),
            ParentLink::Root | ParentLink::Observer(_) => None,
        }
    }

    fn relay(&self, event: &Event) {
        match self {
            ParentLink::Root => {}
            ParentLink::Entity(parent) => {
                if let Some(parent) = parent.upgrade() {
                    parent.dispatch(event);
                }
            }
            ParentLink::Observer(d) => {
                if let Some(d) = d.upgrade() {
                    d.invoke(event);
                }
            }
        }
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentLink::Root => write!(f, "Root"),
            ParentLink::Entity(p) => match p.upgrade() {
                Some(p) => write!(f, "Entity({})", p.id),
                None => write!(f, "Entity(<dropped>)"),
            },
            ParentLink::Observer(_) => write!(f, "Observer"),
        }
    }
}

/// A positioned entity.
pub struct Node {
    id: EntityId,
    local: Cell<Point>,
    parent: RefCell<ParentLink>,
    events: Rc<EventDispatcher>,
    /// Subscribed on the current parent's dispatcher.
    listener: Handler,
}

impl Node {
    /// Create a detached node.
    pub fn new(local: Point) -> Rc<Node> {
        Self::with_parent(local, ParentLink::Root)
    }

    /// Create a node under `parent`, already listening to it.
    pub fn with_parent(local: Point, parent: ParentLink) -> Rc<Node> {
        let node = Rc::new_cyclic(|me: &Weak<Node>| {
            let me = me.clone();
            Node {
                id: EntityId::next(),
                local: Cell::new(local),
                parent: RefCell::new(ParentLink::Root),
                events: Rc::new(EventDispatcher::new()),
                listener: handler(move |e: &Event| {
                    if let Some(me) = me.upgrade() {
                        me.on_parent_event(e);
                    }
                }),
            }
        });
        if let Some(d) = parent.dispatcher() {
            d.subscribe(&node.listener);
        }
        *node.parent.borrow_mut() = parent;
        node
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn local_offset(&self) -> Point {
        self.local.get()
    }

    /// Move the node within its parent's frame. Emits `position-changed`.
    pub fn set_local_offset(&self, value: Point) {
        let last = self.absolute_position();
        self.local.set(value);
        self.emit(EventKind::PositionChanged {
            current: self.absolute_position(),
            last,
        });
    }

    /// Sum of local offsets along the parent chain.
    pub fn absolute_position(&self) -> Point {
        self.parent.borrow().origin() + self.local.get()
    }

    pub fn parent(&self) -> ParentLink {
        self.parent.borrow().clone()
    }

    /// Rebind the parent. The listener moves from the old parent's dispatcher
    /// to the new one before `parent-changed` is emitted.
    pub fn set_parent(&self, parent: ParentLink) {
        let last = self.absolute_position();
        let old = std::mem::replace(&mut *self.parent.borrow_mut(), parent.clone());
        if let Some(d) = old.dispatcher() {
            let removed = d.unsubscribe(&self.listener);
            debug_assert!(removed.is_ok(), "node {} was not listening to its parent", self.id);
        }
        if let Some(d) = parent.dispatcher() {
            d.subscribe(&self.listener);
        }
        self.emit(EventKind::ParentChanged {
            current: self.absolute_position(),
            last,
        });
    }

    /// Open a suppression scope on this node's dispatcher.
    pub fn suppress(&self) -> Suppressed<'_> {
        self.events.suppress()
    }

    /// Emit an event originating from this node.
    pub fn emit(&self, kind: EventKind) {
        self.dispatch(&Event::new(self.id, kind));
    }

    /// Deliver to this node's handlers, then relay to the parent.
    fn dispatch(&self, event: &Event) {
        if self.events.is_suppressed() {
            return;
        }
        self.events.invoke(event);
        let parent = self.parent.borrow().clone();
        parent.relay(event);
    }

    fn on_parent_event(&self, e: &Event) {
        if Some(e.source) != self.parent.borrow().entity_id() {
            return;
        }
        let parent_last = match e.kind {
            EventKind::PositionChanged { last, .. } | EventKind::ParentChanged { last, .. } => last,
            _ => return,
        };
        self.emit(EventKind::PositionChanged {
            current: self.absolute_position(),
            last: parent_last + self.local.get(),
        });
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        if let Some(d) = self.parent.get_mut().dispatcher() {
            if d.unsubscribe(&self.listener).is_err() {
                debug!(node = %self.id, "listener already detached");
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("local", &self.local.get())
            .field("parent", &*self.parent.borrow())
            .finish()
    }
}
