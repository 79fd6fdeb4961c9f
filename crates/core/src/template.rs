//! Piece templates - immutable shape and color blueprints

use crate::entity::ParentLink;
use crate::grid::Grid;
use crate::piece::Piece;
use crate::types::{ColorId, Point};

/// Relative block offsets plus a color. Stateless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceTemplate {
    offsets: Vec<Point>,
    color: ColorId,
}

impl PieceTemplate {
    pub fn new(offsets: Vec<Point>, color: ColorId) -> Self {
        Self { offsets, color }
    }

    pub fn offsets(&self) -> &[Point] {
        &self.offsets
    }

    pub fn color(&self) -> ColorId {
        self.color
    }

    /// Build a piece at `position` under `parent`.
    pub fn instantiate(&self, position: Point, parent: ParentLink) -> Piece {
        let mut piece = Piece::new(position, parent);
        for &offset in &self.offsets {
            piece.push_block(offset, self.color);
        }
        piece
    }

    /// Build a piece at `position` on `grid`.
    pub fn spawn(&self, grid: &Grid, position: Point) -> Piece {
        self.instantiate(position, ParentLink::entity(grid.node()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_piece_is_a_child_of_the_grid() {
        let grid = Grid::new(Point::new(30, 1), 10, 20, ParentLink::Root);
        let template = PieceTemplate::new(vec![Point::new(0, 0), Point::new(1, 0)], ColorId(4));
        let piece = template.spawn(&grid, Point::new(5, 0));

        assert_eq!(piece.blocks().len(), 2);
        assert!(piece.blocks().iter().all(|b| b.color() == ColorId(4)));
        assert_eq!(piece.blocks()[1].absolute_position(), Point::new(36, 1));
    }
}
