use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use super::{blank, MainMenuState, Redraw};
use crate::core::{load_catalog, Catalog, ConfigError};
use crate::error::StateInitError;
use crate::manager::{State, Transition};
use crate::shared::SharedData;
use crate::term::{CellStyle, FrameBuffer, Viewport};
use crate::types::InputSymbol;

/// Produces the game data on the worker thread.
pub type Loader = Box<dyn FnOnce() -> Result<Catalog, ConfigError> + Send>;

/// Reads the game data off the frame loop, then becomes the main menu.
///
/// A failed load stays on screen with its reason until Escape.
pub struct LoadState {
    loader: Option<Loader>,
    worker: Option<JoinHandle<Result<Catalog, ConfigError>>>,
    failure: Option<String>,
    redraw: Redraw,
}

impl LoadState {
    pub fn new(loader: Loader) -> Self {
        Self {
            loader: Some(loader),
            worker: None,
            failure: None,
            redraw: Redraw::default(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(Box::new(move || load_catalog(&path)))
    }

    /// Reason the load failed, once known.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn join(&mut self) -> Option<Result<Catalog, ConfigError>> {
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(result) => Some(result),
            Err(_) => {
                self.failure = Some("game data loader panicked".to_string());
                None
            }
        }
    }

    fn draw(&self, fb: &mut FrameBuffer, viewport: Viewport) {
        blank(fb, viewport);
        let mid = i32::from(viewport.height) / 2;
        match &self.failure {
            None => fb.put_str_centered(mid, "Loading...", CellStyle::default()),
            Some(reason) => {
                fb.put_str_centered(mid - 1, "Could not load game data", CellStyle::default().bold());
                fb.put_str_centered(mid, reason, CellStyle::default());
                fb.put_str_centered(mid + 2, "Press Esc to quit", CellStyle::default());
            }
        }
    }
}

impl State for LoadState {
    fn name(&self) -> &'static str {
        "load"
    }

    fn init(&mut self, _shared: &mut SharedData) -> Result<(), StateInitError> {
        let loader = self
            .loader
            .take()
            .ok_or_else(|| StateInitError::Rejected("loader already started".to_string()))?;
        let worker = thread::Builder::new()
            .name("data-loader".to_string())
            .spawn(loader)
            .map_err(|e| StateInitError::Rejected(format!("cannot start loader: {e}")))?;
        self.worker = Some(worker);
        Ok(())
    }

    fn enter(&mut self, _shared: &mut SharedData) {
        self.redraw.mark();
    }

    fn exit(&mut self, _shared: &mut SharedData) {
        // Leaving early: wait for the worker so nothing outlives the state.
        if self.worker.is_some() {
            let _ = self.join();
        }
    }

    fn input(&mut self, _shared: &mut SharedData, symbol: InputSymbol) -> Transition {
        match symbol {
            InputSymbol::Escape => Transition::Pop,
            _ => Transition::None,
        }
    }

    fn render(
        &mut self,
        shared: &mut SharedData,
        fb: &mut FrameBuffer,
        _delta: Duration,
        viewport: Viewport,
    ) -> Transition {
        if self.worker.as_ref().is_some_and(JoinHandle::is_finished) {
            match self.join() {
                Some(Ok(catalog)) => {
                    info!(types = catalog.piece_types().len(), "game data ready");
                    shared.catalog = Some(catalog);
                    return Transition::replace(MainMenuState::new());
                }
                Some(Err(e)) => {
                    warn!(error = %e, "game data failed to load");
                    self.failure = Some(e.to_string());
                }
                None => warn!("game data loader panicked"),
            }
            self.redraw.mark();
        }

        if self.redraw.take(viewport) {
            self.draw(fb, viewport);
        }
        Transition::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_catalog;
    use crate::screens::testing::{contains, VIEW};
    use crate::StateManager;

    const DATA: &str = r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],
        "types":[{"name":"Mono","polyominoes":[{"color":1,"blocks":[[0,0]]}]}]}"#;

    fn pump_until(
        m: &mut StateManager,
        fb: &mut FrameBuffer,
        done: impl Fn(&StateManager, &FrameBuffer) -> bool,
    ) {
        for _ in 0..500 {
            m.render(fb, Duration::from_millis(16), VIEW).unwrap();
            if done(m, fb) {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("load never finished");
    }

    #[test]
    fn successful_load_becomes_main_menu() {
        let mut m = StateManager::new(SharedData::new(1));
        m.push(Box::new(LoadState::new(Box::new(|| parse_catalog(DATA))))).unwrap();
        let mut fb = FrameBuffer::new(VIEW.width, VIEW.height);

        pump_until(&mut m, &mut fb, |m, _| m.top() == Some("main-menu"));
        assert_eq!(m.len(), 1);
        assert!(m.shared().catalog.is_some());
    }

    #[test]
    fn failed_load_shows_reason_and_escape_pops() {
        let mut m = StateManager::new(SharedData::new(1));
        let load = LoadState::new(Box::new(|| parse_catalog("{ not json")));
        m.push(Box::new(load)).unwrap();
        let mut fb = FrameBuffer::new(VIEW.width, VIEW.height);

        pump_until(&mut m, &mut fb, |_, fb| contains(fb, "Could not load game data"));
        assert_eq!(m.top(), Some("load"));
        assert!(m.shared().catalog.is_none());

        m.input(InputSymbol::Escape).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn escape_while_loading_joins_worker() {
        let mut m = StateManager::new(SharedData::new(1));
        let load = LoadState::new(Box::new(|| {
            thread::sleep(Duration::from_millis(30));
            parse_catalog(DATA)
        }));
        m.push(Box::new(load)).unwrap();
        m.input(InputSymbol::Escape).unwrap();
        assert!(m.is_empty());
        assert!(m.shared().catalog.is_none());
    }
}
