//! State stack and the `State` interface.
//!
//! Only the top of the stack receives input and renders. States never touch
//! the stack directly: `input` and `render` return a [`Transition`] that the
//! manager applies once the state has returned.

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::EventDispatcher;
use crate::error::StateInitError;
use crate::shared::SharedData;
use crate::term::{FrameBuffer, Viewport};
use crate::types::InputSymbol;

pub trait State {
    fn name(&self) -> &'static str;

    /// Called once, before the first `enter`. An error abandons the push.
    fn init(&mut self, shared: &mut SharedData) -> Result<(), StateInitError> {
        let _ = shared;
        Ok(())
    }

    /// Called whenever the state becomes the top of the stack.
    fn enter(&mut self, shared: &mut SharedData) {
        let _ = shared;
    }

    /// Called whenever the state stops being the top of the stack.
    fn exit(&mut self, shared: &mut SharedData) {
        let _ = shared;
    }

    fn input(&mut self, shared: &mut SharedData, symbol: InputSymbol) -> Transition;

    fn render(
        &mut self,
        shared: &mut SharedData,
        fb: &mut FrameBuffer,
        delta: Duration,
        viewport: Viewport,
    ) -> Transition;
}

/// What the stack should do after a state's `input` or `render`.
pub enum Transition {
    None,
    Push(Box<dyn State>),
    Pop,
    Replace(Box<dyn State>),
}

impl Transition {
    pub fn push(state: impl State + 'static) -> Self {
        Transition::Push(Box::new(state))
    }

    pub fn replace(state: impl State + 'static) -> Self {
        Transition::Replace(Box::new(state))
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::None => write!(f, "None"),
            Transition::Push(s) => write!(f, "Push({})", s.name()),
            Transition::Pop => write!(f, "Pop"),
            Transition::Replace(s) => write!(f, "Replace({})", s.name()),
        }
    }
}

/// Fired when the last state is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEmptied;

pub struct StateManager {
    stack: Vec<Box<dyn State>>,
    shared: SharedData,
    empty: EventDispatcher<StackEmptied>,
}

impl StateManager {
    pub fn new(shared: SharedData) -> Self {
        Self {
            stack: Vec::new(),
            shared,
            empty: EventDispatcher::new(),
        }
    }

    pub fn shared(&self) -> &SharedData {
        &self.shared
    }

    pub fn shared_mut(&mut self) -> &mut SharedData {
        &mut self.shared
    }

    pub fn into_shared(self) -> SharedData {
        self.shared
    }

    /// Subscribe here to learn when the stack runs empty.
    pub fn empty_event(&self) -> &EventDispatcher<StackEmptied> {
        &self.empty
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Name of the active state.
    pub fn top(&self) -> Option<&'static str> {
        self.stack.last().map(|s| s.name())
    }

    /// Exit the current top, then init and enter `state`.
    ///
    /// If `state` fails to initialize, the previous top is entered again.
    pub fn push(&mut self, mut state: Box<dyn State>) -> Result<(), StateInitError> {
        if let Some(top) = self.stack.last_mut() {
            top.exit(&mut self.shared);
        }
        if let Err(e) = state.init(&mut self.shared) {
            warn!(state = state.name(), error = %e, "state refused to start");
            if let Some(top) = self.stack.last_mut() {
                top.enter(&mut self.shared);
            }
            return Err(e);
        }
        info!(state = state.name(), depth = self.stack.len() + 1, "push");
        state.enter(&mut self.shared);
        self.stack.push(state);
        Ok(())
    }

    /// Exit and remove the top, then enter the new top if there is one.
    pub fn pop(&mut self) -> Option<Box<dyn State>> {
        let mut top = self.stack.pop()?;
        top.exit(&mut self.shared);
        info!(state = top.name(), depth = self.stack.len(), "pop");
        match self.stack.last_mut() {
            Some(next) => next.enter(&mut self.shared),
            None => {
                info!("state stack empty");
                self.empty.invoke(&StackEmptied);
            }
        }
        Some(top)
    }

    /// Swap the top for `state` without entering the state beneath.
    ///
    /// If `state` fails to initialize, the old top is put back and entered.
    pub fn replace(&mut self, mut state: Box<dyn State>) -> Result<(), StateInitError> {
        let Some(mut old) = self.stack.pop() else {
            return self.push(state);
        };
        old.exit(&mut self.shared);
        if let Err(e) = state.init(&mut self.shared) {
            warn!(state = state.name(), error = %e, "replacement refused to start");
            old.enter(&mut self.shared);
            self.stack.push(old);
            return Err(e);
        }
        info!(from = old.name(), to = state.name(), "replace");
        drop(old);
        state.enter(&mut self.shared);
        self.stack.push(state);
        Ok(())
    }

    /// Forward one input symbol to the top state.
    pub fn input(&mut self, symbol: InputSymbol) -> Result<(), StateInitError> {
        let Some(top) = self.stack.last_mut() else {
            return Ok(());
        };
        let t = top.input(&mut self.shared, symbol);
        self.apply(t)
    }

    /// Let the top state advance and draw.
    pub fn render(
        &mut self,
        fb: &mut FrameBuffer,
        delta: Duration,
        viewport: Viewport,
    ) -> Result<(), StateInitError> {
        let Some(top) = self.stack.last_mut() else {
            return Ok(());
        };
        let t = top.render(&mut self.shared, fb, delta, viewport);
        self.apply(t)
    }

    pub fn apply(&mut self, transition: Transition) -> Result<(), StateInitError> {
        match transition {
            Transition::None => Ok(()),
            Transition::Push(s) => self.push(s),
            Transition::Pop => {
                self.pop();
                Ok(())
            }
            Transition::Replace(s) => self.replace(s),
        }
    }
}

impl fmt::Debug for StateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stack.iter().map(|s| s.name()).collect();
        f.debug_struct("StateManager")
            .field("stack", &names)
            .field("shared", &self.shared)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::handler;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        fail_init: bool,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Log) -> Box<dyn State> {
            Box::new(Probe { name, log: Rc::clone(log), fail_init: false })
        }

        fn failing(name: &'static str, log: &Log) -> Box<dyn State> {
            Box::new(Probe { name, log: Rc::clone(log), fail_init: true })
        }

        fn note(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}.{}", self.name, what));
        }
    }

    impl State for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn init(&mut self, _: &mut SharedData) -> Result<(), StateInitError> {
            self.note("init");
            if self.fail_init {
                return Err(StateInitError::Rejected("nope".into()));
            }
            Ok(())
        }
        fn enter(&mut self, _: &mut SharedData) {
            self.note("enter");
        }
        fn exit(&mut self, _: &mut SharedData) {
            self.note("exit");
        }
        fn input(&mut self, _: &mut SharedData, symbol: InputSymbol) -> Transition {
            self.note("input");
            match symbol {
                InputSymbol::Escape => Transition::Pop,
                _ => Transition::None,
            }
        }
        fn render(&mut self, _: &mut SharedData, _: &mut FrameBuffer, _: Duration, _: Viewport) -> Transition {
            self.note("render");
            Transition::None
        }
    }

    fn manager() -> (StateManager, Log) {
        (StateManager::new(SharedData::new(1)), Rc::new(RefCell::new(Vec::new())))
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn push_exits_old_top_before_init_and_enter() {
        let (mut m, log) = manager();
        m.push(Probe::boxed("a", &log)).unwrap();
        take(&log);
        m.push(Probe::boxed("b", &log)).unwrap();
        assert_eq!(take(&log), vec!["a.exit", "b.init", "b.enter"]);
        assert_eq!(m.top(), Some("b"));
    }

    #[test]
    fn pop_reenters_state_below() {
        let (mut m, log) = manager();
        m.push(Probe::boxed("a", &log)).unwrap();
        m.push(Probe::boxed("b", &log)).unwrap();
        take(&log);
        m.pop();
        assert_eq!(take(&log), vec!["b.exit", "a.enter"]);
    }

    #[test]
    fn popping_last_state_fires_empty_once() {
        let (mut m, log) = manager();
        let fired = Rc::new(Cell::new(0));
        let h = {
            let fired = Rc::clone(&fired);
            handler(move |_: &StackEmptied| fired.set(fired.get() + 1))
        };
        m.empty_event().subscribe(&h);

        m.push(Probe::boxed("a", &log)).unwrap();
        take(&log);
        m.pop();
        assert_eq!(take(&log), vec!["a.exit"]);
        assert_eq!(fired.get(), 1);
        assert!(m.is_empty());
        assert!(m.pop().is_none());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn failed_push_reenters_previous_top() {
        let (mut m, log) = manager();
        m.push(Probe::boxed("a", &log)).unwrap();
        take(&log);
        assert!(m.push(Probe::failing("b", &log)).is_err());
        assert_eq!(take(&log), vec!["a.exit", "b.init", "a.enter"]);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn replace_does_not_enter_state_beneath() {
        let (mut m, log) = manager();
        m.push(Probe::boxed("a", &log)).unwrap();
        m.push(Probe::boxed("b", &log)).unwrap();
        take(&log);
        m.replace(Probe::boxed("c", &log)).unwrap();
        assert_eq!(take(&log), vec!["b.exit", "c.init", "c.enter"]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.top(), Some("c"));
    }

    #[test]
    fn failed_replace_restores_old_top() {
        let (mut m, log) = manager();
        m.push(Probe::boxed("a", &log)).unwrap();
        take(&log);
        assert!(m.replace(Probe::failing("b", &log)).is_err());
        assert_eq!(take(&log), vec!["a.exit", "b.init", "a.enter"]);
        assert_eq!(m.top(), Some("a"));
    }

    #[test]
    fn input_and_render_reach_only_the_top() {
        let (mut m, log) = manager();
        m.push(Probe::boxed("a", &log)).unwrap();
        m.push(Probe::boxed("b", &log)).unwrap();
        take(&log);

        let mut fb = FrameBuffer::new(10, 10);
        m.input(InputSymbol::Up).unwrap();
        m.render(&mut fb, Duration::ZERO, Viewport::new(10, 10)).unwrap();
        assert_eq!(take(&log), vec!["b.input", "b.render"]);

        m.input(InputSymbol::Escape).unwrap();
        assert_eq!(take(&log), vec!["b.input", "b.exit", "a.enter"]);
    }
}
