//! Snapshot module - plain-data view of a session for renderers and observers

use crate::block::Block;
use crate::types::{ColorId, Point};

/// One block, by absolute position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockView {
    pub position: Point,
    pub color: ColorId,
}

impl From<&Block> for BlockView {
    fn from(block: &Block) -> Self {
        Self {
            position: block.absolute_position(),
            color: block.color(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Absolute position of the grid's top-left cell.
    pub origin: Point,
    pub width: usize,
    pub height: usize,
    pub landed: Vec<BlockView>,
    pub active: Vec<BlockView>,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
}

impl GameSnapshot {
    /// Reset to empty, keeping allocations.
    pub fn clear(&mut self) {
        self.origin = Point::ORIGIN;
        self.width = 0;
        self.height = 0;
        self.landed.clear();
        self.active.clear();
        self.score = 0;
        self.lines = 0;
        self.level = 0;
    }

    /// Grid-relative cell of an absolute position.
    pub fn cell_of(&self, position: Point) -> Point {
        position - self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Game;
    use crate::template::PieceTemplate;
    use std::time::Duration;

    #[test]
    fn snapshot_reports_active_piece_and_counters() {
        let templates = vec![PieceTemplate::new(vec![Point::ORIGIN, Point::new(1, 0)], ColorId(3))];
        let mut game = Game::new(Point::new(30, 1), templates, 9).unwrap();
        let tick = game.gravity_interval();
        game.step(tick);

        let snap = game.snapshot();
        assert_eq!(snap.origin, Point::new(30, 1));
        assert_eq!((snap.width, snap.height), (10, 20));
        assert!(snap.landed.is_empty());
        assert_eq!(snap.active.len(), 2);
        assert_eq!(snap.cell_of(snap.active[0].position), Point::new(5, 1));
        assert_eq!(snap.level, 1);
    }

    #[test]
    fn snapshot_into_reuses_buffer() {
        let templates = vec![PieceTemplate::new(vec![Point::ORIGIN], ColorId(1))];
        let mut game = Game::new(Point::ORIGIN, templates, 1).unwrap();
        let mut snap = GameSnapshot::default();
        game.snapshot_into(&mut snap);
        assert!(snap.active.is_empty());

        game.step(Duration::from_secs(1));
        game.snapshot_into(&mut snap);
        assert_eq!(snap.active.len(), 1);
        game.snapshot_into(&mut snap);
        assert_eq!(snap.active.len(), 1);
    }
}
