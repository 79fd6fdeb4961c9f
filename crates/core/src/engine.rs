//! Game engine - one play session
//!
//! Owns the grid, the falling piece, the counters and the gravity clock. The
//! grid reports to the engine's dispatcher, so every block, piece and grid
//! event bubbles up to whoever subscribes to [`Game::events`].

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info};

use crate::entity::ParentLink;
use crate::event::{EntityId, Event, EventDispatcher, EventKind};
use crate::grid::Grid;
use crate::piece::Piece;
use crate::rng::SimpleRng;
use crate::snapshot::{BlockView, GameSnapshot};
use crate::template::PieceTemplate;
use crate::types::{
    GameCommand, Point, BASE_GRAVITY_SECS, GRID_HEIGHT, GRID_WIDTH, LINES_PER_LEVEL,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("a game needs at least one piece template")]
    NoTemplates,
    #[error("grid must be at least 1x1, got {width}x{height}")]
    InvalidGridSize { width: usize, height: usize },
}

pub struct Game {
    id: EntityId,
    events: Rc<EventDispatcher>,
    grid: Grid,
    current: Option<Piece>,
    score: u32,
    level: u32,
    lines: u32,
    elapsed: Duration,
    templates: Vec<PieceTemplate>,
    rng: SimpleRng,
}

impl Game {
    /// New session on a standard 10x20 grid placed at `position`.
    pub fn new(position: Point, templates: Vec<PieceTemplate>, seed: u32) -> Result<Self, GameError> {
        Self::with_grid_size(position, GRID_WIDTH, GRID_HEIGHT, templates, seed)
    }

    pub fn with_grid_size(
        position: Point,
        width: usize,
        height: usize,
        templates: Vec<PieceTemplate>,
        seed: u32,
    ) -> Result<Self, GameError> {
        if templates.is_empty() {
            return Err(GameError::NoTemplates);
        }
        if width == 0 || height == 0 {
            return Err(GameError::InvalidGridSize { width, height });
        }
        let events = Rc::new(EventDispatcher::new());
        let grid = Grid::new(position, width, height, ParentLink::observer(&events));
        Ok(Self {
            id: EntityId::next(),
            events,
            grid,
            current: None,
            score: 0,
            level: 1,
            lines: 0,
            elapsed: Duration::ZERO,
            templates,
            rng: SimpleRng::new(seed),
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Engine events plus everything bubbling up from the grid.
    pub fn events(&self) -> &Rc<EventDispatcher> {
        &self.events
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access, for setting up positions.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn templates(&self) -> &[PieceTemplate] {
        &self.templates
    }

    /// Time between gravity ticks at the current level.
    pub fn gravity_interval(&self) -> Duration {
        Duration::from_secs_f64(BASE_GRAVITY_SECS / f64::from(self.level.max(1)))
    }

    /// Where new pieces appear: centered horizontally on row 0.
    pub fn spawn_position(&self) -> Point {
        Point::new((self.grid.width() / 2) as i32, 0)
    }

    /// Advance the clock. Returns false when the session is over.
    pub fn step(&mut self, delta: Duration) -> bool {
        self.elapsed += delta;
        if self.elapsed < self.gravity_interval() {
            return true;
        }
        self.elapsed = Duration::ZERO;

        let mut new_piece = false;
        if self.current.is_none() {
            new_piece = true;
            self.spawn();
            if !self.spawn_is_clear() {
                info!(score = self.score, lines = self.lines, "spawn overlaps the stack, session over");
                return false;
            }
        }

        if self.down() {
            return true;
        }
        if new_piece {
            info!(score = self.score, lines = self.lines, "spawn blocked, session over");
            return false;
        }
        self.land()
    }

    /// Rotate the active piece left. False if there is none or it is blocked.
    pub fn rotate_left(&mut self) -> bool {
        let rotated = match &self.current {
            Some(piece) => piece.rotate_left(&self.grid),
            None => false,
        };
        if rotated {
            self.emit(EventKind::PieceRotatedLeft);
        }
        rotated
    }

    pub fn rotate_right(&mut self) -> bool {
        let rotated = match &self.current {
            Some(piece) => piece.rotate_right(&self.grid),
            None => false,
        };
        if rotated {
            self.emit(EventKind::PieceRotatedRight);
        }
        rotated
    }

    pub fn left(&mut self) -> bool {
        self.shift(Point::new(-1, 0))
    }

    pub fn right(&mut self) -> bool {
        self.shift(Point::new(1, 0))
    }

    pub fn down(&mut self) -> bool {
        self.shift(Point::new(0, 1))
    }

    pub fn apply(&mut self, command: GameCommand) -> bool {
        match command {
            GameCommand::RotateLeft => self.rotate_left(),
            GameCommand::RotateRight => self.rotate_right(),
            GameCommand::Left => self.left(),
            GameCommand::Right => self.right(),
            GameCommand::Down => self.down(),
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.clear();
        out.origin = self.grid.node().absolute_position();
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.landed.extend(self.grid.blocks().map(BlockView::from));
        if let Some(piece) = &self.current {
            out.active.extend(piece.blocks().iter().map(BlockView::from));
        }
        out.score = self.score;
        out.lines = self.lines;
        out.level = self.level;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    fn shift(&mut self, delta: Point) -> bool {
        let moved = match &self.current {
            Some(piece) => piece.move_delta(delta, &self.grid),
            None => false,
        };
        if moved {
            self.emit(EventKind::PieceMoved);
        }
        moved
    }

    fn spawn(&mut self) {
        let idx = self.rng.next_index(self.templates.len());
        let piece = self.templates[idx].spawn(&self.grid, self.spawn_position());
        debug!(template = idx, piece = %piece.id(), "spawned piece");
        self.set_current(Some(piece));
    }

    fn spawn_is_clear(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|piece| piece.cells().all(|c| self.grid.is_clear(c)))
    }

    /// Merge the active piece and settle the counters.
    fn land(&mut self) -> bool {
        let Some(piece) = self.set_current(None) else {
            return true;
        };
        let spilled = self.grid.add_polyomino(piece);
        let removed = self.grid.clear_rows();

        let count = removed.len() as u32;
        let width = self.grid.width() as u32;
        let lines = self.lines + count / width;
        self.set_lines(lines);
        // Multi-row clears score quadratically: count * rows.
        self.set_score(self.score + count * (count / width));
        self.set_level(self.lines / LINES_PER_LEVEL + 1);
        if count > 0 {
            debug!(blocks = count, lines = self.lines, score = self.score, "rows cleared");
        }

        if !spilled.is_empty() {
            info!(spilled = spilled.len(), "piece landed above the field, session over");
            return false;
        }
        true
    }

    fn set_current(&mut self, piece: Option<Piece>) -> Option<Piece> {
        let current = piece.as_ref().map(Piece::id);
        let old = std::mem::replace(&mut self.current, piece);
        let last = old.as_ref().map(Piece::id);
        self.emit(EventKind::CurrentPieceChanged { current, last });
        old
    }

    fn set_score(&mut self, score: u32) {
        self.score = score;
        self.emit(EventKind::ScoreChanged { score });
    }

    fn set_level(&mut self, level: u32) {
        self.level = level;
        self.emit(EventKind::LevelChanged { level });
    }

    fn set_lines(&mut self, lines: u32) {
        self.lines = lines;
        self.emit(EventKind::LinesChanged { lines });
    }

    fn emit(&self, kind: EventKind) {
        self.events.invoke(&Event::new(self.id, kind));
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("score", &self.score)
            .field("level", &self.level)
            .field("lines", &self.lines)
            .field("current", &self.current.as_ref().map(Piece::id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::handler;
    use crate::types::ColorId;
    use std::cell::RefCell;

    fn single() -> Vec<PieceTemplate> {
        vec![PieceTemplate::new(vec![Point::ORIGIN], ColorId(1))]
    }

    fn tick(game: &Game) -> Duration {
        game.gravity_interval()
    }

    #[test]
    fn empty_template_set_is_rejected() {
        assert_eq!(Game::new(Point::ORIGIN, vec![], 1).err(), Some(GameError::NoTemplates));
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert_eq!(
            Game::with_grid_size(Point::ORIGIN, 0, 20, single(), 1).err(),
            Some(GameError::InvalidGridSize { width: 0, height: 20 })
        );
        assert!(Game::with_grid_size(Point::ORIGIN, 10, 0, single(), 1).is_err());
    }

    #[test]
    fn spawn_onto_a_block_ends_the_session() {
        let mut game = Game::with_grid_size(Point::ORIGIN, 10, 4, single(), 1).unwrap();
        assert!(game.grid_mut().insert_block(Point::new(5, 0), ColorId(2)));
        let d = tick(&game);
        assert!(!game.step(d));
        assert_eq!(game.grid().block_count(), 1);
    }

    #[test]
    fn no_tick_before_threshold() {
        let mut game = Game::new(Point::ORIGIN, single(), 1).unwrap();
        assert!(game.step(Duration::from_millis(100)));
        assert!(game.current_piece().is_none());
    }

    #[test]
    fn first_tick_spawns_and_drops_one_row() {
        let mut game = Game::new(Point::ORIGIN, single(), 1).unwrap();
        let d = tick(&game);
        assert!(game.step(d));
        let piece = game.current_piece().unwrap();
        assert_eq!(piece.local_offset(), Point::new(5, 1));
    }

    #[test]
    fn accumulator_resets_after_tick() {
        let mut game = Game::new(Point::ORIGIN, single(), 1).unwrap();
        let d = tick(&game);
        assert!(game.step(d + Duration::from_millis(200)));
        assert!(game.step(Duration::from_millis(200)));
        assert_eq!(game.current_piece().unwrap().local_offset(), Point::new(5, 1));
    }

    #[test]
    fn commands_without_piece_fail() {
        let mut game = Game::new(Point::ORIGIN, single(), 1).unwrap();
        assert!(!game.left());
        assert!(!game.right());
        assert!(!game.down());
        assert!(!game.rotate_left());
        assert!(!game.rotate_right());
    }

    #[test]
    fn successful_command_emits_named_event() {
        let mut game = Game::new(Point::ORIGIN, single(), 1).unwrap();
        let d = tick(&game);
        game.step(d);

        let names = Rc::new(RefCell::new(Vec::new()));
        let h = {
            let names = Rc::clone(&names);
            handler(move |e: &Event| names.borrow_mut().push(e.name()))
        };
        game.events().subscribe(&h);

        assert!(game.left());
        assert!(names.borrow().contains(&"piece-moved"));
        assert!(game.rotate_left());
        assert!(names.borrow().contains(&"piece-rotated-left"));
    }

    #[test]
    fn piece_lands_after_reaching_floor() {
        let mut game = Game::with_grid_size(Point::ORIGIN, 4, 3, single(), 1).unwrap();
        let d = tick(&game);
        assert!(game.step(d)); // spawn at row 0, fall to row 1
        assert!(game.step(d)); // row 2
        assert!(game.step(d)); // blocked: land
        assert!(game.current_piece().is_none());
        assert!(game.grid().get(Point::new(2, 2)).is_some());
    }
}
