use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info};

use super::{PausedState, Redraw};
use crate::core::{handler, Event, Game, GameSnapshot, Handler, PieceTemplate};
use crate::error::StateInitError;
use crate::highscore::ScoreEntry;
use crate::manager::{State, Transition};
use crate::shared::SharedData;
use crate::term::{FrameBuffer, GameView, Viewport};
use crate::types::{InputSymbol, Point};

/// Absolute position of the playfield's top-left cell.
pub const PLAY_ORIGIN: Point = Point::new(15, 1);

/// One play session. Losing records the score and pops back to the menu.
pub struct PlayState {
    piece_type: String,
    templates: Vec<PieceTemplate>,
    game: Option<Game>,
    pending: Rc<RefCell<Vec<Event>>>,
    listener: Option<Handler>,
    redraw: Redraw,
    view: GameView,
    snapshot: GameSnapshot,
}

impl PlayState {
    pub fn new(piece_type: impl Into<String>, templates: Vec<PieceTemplate>) -> Self {
        Self {
            piece_type: piece_type.into(),
            templates,
            game: None,
            pending: Rc::new(RefCell::new(Vec::new())),
            listener: None,
            redraw: Redraw::default(),
            view: GameView::default(),
            snapshot: GameSnapshot::default(),
        }
    }

    /// The running session, once initialized.
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    fn finish(&mut self, shared: &mut SharedData, lost: bool) {
        let Some(game) = &self.game else {
            return;
        };
        let entry = ScoreEntry::new(game.score(), game.lines(), game.level());
        info!(score = entry.score, lines = entry.lines, level = entry.level, lost, "session ended");
        if lost && shared.high_scores.add(entry) {
            debug!(score = entry.score, "new high score");
        }
        shared.notify(|o| o.session_ended(entry.score));
    }

    /// Drain buffered engine events; true if anything happened.
    fn flush_events(&mut self, shared: &mut SharedData) -> bool {
        let events = std::mem::take(&mut *self.pending.borrow_mut());
        if let Some(game) = &self.game {
            for event in events.iter().filter(|e| e.source == game.id()) {
                shared.notify(|o| o.game_event(event));
            }
        }
        !events.is_empty()
    }
}

impl State for PlayState {
    fn name(&self) -> &'static str {
        "play"
    }

    fn init(&mut self, shared: &mut SharedData) -> Result<(), StateInitError> {
        let seed = shared.next_seed();
        let game = Game::new(PLAY_ORIGIN, self.templates.clone(), seed)
            .map_err(|e| StateInitError::Rejected(e.to_string()))?;

        let pending = Rc::clone(&self.pending);
        let listener = handler(move |e: &Event| pending.borrow_mut().push(*e));
        game.events().subscribe(&listener);

        info!(piece_type = %self.piece_type, seed, "session started");
        shared.notify(|o| o.session_started(&self.piece_type));
        self.listener = Some(listener);
        self.game = Some(game);
        Ok(())
    }

    fn enter(&mut self, _shared: &mut SharedData) {
        self.redraw.mark();
    }

    fn input(&mut self, shared: &mut SharedData, symbol: InputSymbol) -> Transition {
        let Some(game) = self.game.as_mut() else {
            return Transition::Pop;
        };
        match symbol {
            InputSymbol::Escape => {
                self.finish(shared, false);
                Transition::Pop
            }
            InputSymbol::Pause => Transition::push(PausedState::new()),
            InputSymbol::Up => {
                game.rotate_left();
                Transition::None
            }
            InputSymbol::Char('x') | InputSymbol::Char('X') => {
                game.rotate_right();
                Transition::None
            }
            InputSymbol::Left => {
                game.left();
                Transition::None
            }
            InputSymbol::Right => {
                game.right();
                Transition::None
            }
            InputSymbol::Down => {
                game.down();
                Transition::None
            }
            _ => Transition::None,
        }
    }

    fn render(
        &mut self,
        shared: &mut SharedData,
        fb: &mut FrameBuffer,
        delta: Duration,
        viewport: Viewport,
    ) -> Transition {
        let Some(game) = self.game.as_mut() else {
            return Transition::Pop;
        };
        if !game.step(delta) {
            self.flush_events(shared);
            self.finish(shared, true);
            return Transition::Pop;
        }
        if self.flush_events(shared) {
            self.redraw.mark();
        }
        if !self.redraw.take(viewport) {
            return Transition::None;
        }

        let Some(game) = &self.game else {
            return Transition::None;
        };
        game.snapshot_into(&mut self.snapshot);
        fb.resize(viewport.width, viewport.height);
        let empty = BTreeMap::new();
        let colors = shared.catalog.as_ref().map_or(&empty, |c| c.colors());
        self.view.render_into(&self.snapshot, colors, fb);
        Transition::None
    }
}

impl Drop for PlayState {
    fn drop(&mut self) {
        if let (Some(game), Some(listener)) = (&self.game, &self.listener) {
            let _ = game.events().unsubscribe(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::{contains, VIEW};
    use crate::shared::SessionObserver;
    use crate::types::ColorId;

    fn mono() -> Vec<PieceTemplate> {
        vec![PieceTemplate::new(vec![Point::ORIGIN], ColorId(1))]
    }

    #[derive(Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl SessionObserver for Recorder {
        fn session_started(&mut self, piece_type: &str) {
            self.0.borrow_mut().push(format!("start {piece_type}"));
        }
        fn game_event(&mut self, event: &Event) {
            self.0.borrow_mut().push(event.name().to_string());
        }
        fn session_ended(&mut self, score: u32) {
            self.0.borrow_mut().push(format!("end {score}"));
        }
    }

    #[test]
    fn redraws_only_after_engine_events() {
        let mut shared = SharedData::new(3);
        let mut play = PlayState::new("Mono", mono());
        play.init(&mut shared).unwrap();
        play.enter(&mut shared);

        let mut fb = FrameBuffer::new(VIEW.width, VIEW.height);
        play.render(&mut shared, &mut fb, Duration::ZERO, VIEW);
        assert!(contains(&fb, "Score: 0"));

        fb.put_char(0, 0, '?', Default::default());
        play.render(&mut shared, &mut fb, Duration::from_millis(1), VIEW);
        assert_eq!(fb.get(0, 0).map(|c| c.ch), Some('?'));

        // Gravity tick spawns a piece: events flow, screen redraws.
        play.render(&mut shared, &mut fb, Duration::from_secs(1), VIEW);
        assert_eq!(fb.get(0, 0).map(|c| c.ch), Some(' '));
    }

    #[test]
    fn pause_pushes_paused_state() {
        let mut shared = SharedData::new(3);
        let mut play = PlayState::new("Mono", mono());
        play.init(&mut shared).unwrap();
        assert!(matches!(play.input(&mut shared, InputSymbol::Pause), Transition::Push(s) if s.name() == "paused"));
    }

    #[test]
    fn observer_sees_session_lifecycle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut shared = SharedData::new(3);
        shared.observer = Some(Box::new(Recorder(Rc::clone(&log))));

        let mut play = PlayState::new("Mono", mono());
        play.init(&mut shared).unwrap();
        let mut fb = FrameBuffer::new(VIEW.width, VIEW.height);
        play.render(&mut shared, &mut fb, Duration::from_secs(1), VIEW);
        play.input(&mut shared, InputSymbol::Left);
        play.render(&mut shared, &mut fb, Duration::ZERO, VIEW);
        assert!(matches!(play.input(&mut shared, InputSymbol::Escape), Transition::Pop));

        let log = log.borrow();
        assert_eq!(log[0], "start Mono");
        assert!(log.iter().any(|e| e == "current-piece-changed"));
        assert!(log.iter().any(|e| e == "piece-moved"));
        // Block and grid events are not forwarded.
        assert!(!log.iter().any(|e| e == "position-changed"));
        assert_eq!(log.last().map(String::as_str), Some("end 0"));
        // Abandoned sessions are not recorded.
        assert!(shared.high_scores.is_empty());
    }
}
