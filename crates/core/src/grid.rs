//! Grid module - the playfield of landed blocks
//!
//! The grid is a fixed `width × height` surface where each cell is empty or
//! holds one landed block. Uses a flat vector, row-major (`y * width + x`).
//! Coordinates: x ranges 0..width (left to right), y ranges 0..height (top to
//! bottom). Negative rows are above the field and always clear: there is a
//! floor and two walls, but no ceiling.

use std::rc::Rc;

use tracing::debug;

use crate::block::Block;
use crate::entity::{Node, ParentLink};
use crate::event::EventKind;
use crate::piece::{Piece, Surface};
use crate::types::{ColorId, Point};

#[derive(Debug)]
pub struct Grid {
    node: Rc<Node>,
    width: usize,
    height: usize,
    cells: Vec<Option<Block>>,
}

impl Grid {
    pub fn new(position: Point, width: usize, height: usize, parent: ParentLink) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        cells.resize_with(width * height, || None);
        Self {
            node: Node::with_parent(position, parent),
            width,
            height,
            cells,
        }
    }

    pub fn node(&self) -> &Rc<Node> {
        &self.node
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Calculate flat index from grid-relative coordinates.
    #[inline(always)]
    fn index(&self, position: Point) -> Option<usize> {
        let (x, y) = (position.x, position.y);
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// True above the field, false outside the walls or below the floor,
    /// otherwise true iff the cell is empty.
    pub fn is_clear(&self, position: Point) -> bool {
        if position.y < 0 {
            return true;
        }
        match self.index(position) {
            Some(idx) => self.cells[idx].is_none(),
            None => false,
        }
    }

    /// Landed block at a cell, if any.
    pub fn get(&self, position: Point) -> Option<&Block> {
        self.index(position).and_then(|idx| self.cells[idx].as_ref())
    }

    /// Every landed block, row-major.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.cells.iter().flatten()
    }

    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.height {
            return false;
        }
        let start = y * self.width;
        self.cells[start..start + self.width].iter().all(Option::is_some)
    }

    /// Create a landed block directly in an empty cell.
    ///
    /// Returns false if the cell is outside the field or occupied.
    pub fn insert_block(&mut self, position: Point, color: ColorId) -> bool {
        let Some(idx) = self.index(position) else {
            return false;
        };
        if self.cells[idx].is_some() {
            return false;
        }
        let block = Block::new(position, color, ParentLink::entity(&self.node));
        let id = block.id();
        self.cells[idx] = Some(block);
        self.node.emit(EventKind::BlockAdded { block: id });
        true
    }

    /// Merge a landed piece into the grid, consuming it.
    ///
    /// Each block is silently rebased onto the grid (its absolute position does
    /// not change) and stored in its cell; one `block-added` follows per stored
    /// block. Blocks that have no cell to go to (above the field, or a cell that
    /// is somehow taken) are returned instead of stored.
    pub fn add_polyomino(&mut self, piece: Piece) -> Vec<Block> {
        let origin = piece.local_offset();
        let mut added = Vec::new();
        let mut spilled = Vec::new();

        for block in piece.into_blocks() {
            let cell = origin + block.local_offset();
            {
                let _quiet = block.node().suppress();
                block.node().set_parent(ParentLink::entity(&self.node));
                block.node().set_local_offset(cell);
            }
            match self.index(cell) {
                Some(idx) if self.cells[idx].is_none() => {
                    added.push(block.id());
                    self.cells[idx] = Some(block);
                }
                _ => {
                    debug!(x = cell.x, y = cell.y, "block has no cell, spilling");
                    spilled.push(block);
                }
            }
        }

        for id in added {
            self.node.emit(EventKind::BlockAdded { block: id });
        }
        spilled
    }

    /// Remove every complete row, shifting everything above each one down.
    ///
    /// Rows are examined from index 0 toward the floor, each exactly once.
    /// Returns the removed blocks row by row, left to right, after one
    /// `block-removed` per block.
    pub fn clear_rows(&mut self) -> Vec<Block> {
        let mut removed = Vec::new();
        let width = self.width;

        for y in 0..self.height {
            if !self.is_row_full(y) {
                continue;
            }
            debug!(row = y, "clearing row");

            let start = y * width;
            removed.extend(self.cells[start..start + width].iter_mut().filter_map(Option::take));

            // Rows above were already examined, so shifting them is safe.
            for row in (1..=y).rev() {
                for x in 0..width {
                    let moved = self.cells[(row - 1) * width + x].take();
                    if let Some(block) = &moved {
                        let local = block.local_offset();
                        block.node().set_local_offset(Point::new(local.x, local.y + 1));
                    }
                    self.cells[row * width + x] = moved;
                }
            }
            // Row 0 was emptied by the shift.
        }

        for block in &removed {
            self.node.emit(EventKind::BlockRemoved { block: block.id() });
        }
        removed
    }
}

impl Surface for Grid {
    fn is_clear(&self, position: Point) -> bool {
        Grid::is_clear(self, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{handler, Event};
    use crate::template::PieceTemplate;
    use std::cell::RefCell;

    fn grid() -> Grid {
        Grid::new(Point::ORIGIN, 10, 20, ParentLink::Root)
    }

    #[test]
    fn test_grid_index_calculation() {
        let g = grid();
        assert_eq!(g.index(Point::new(0, 0)), Some(0));
        assert_eq!(g.index(Point::new(9, 0)), Some(9));
        assert_eq!(g.index(Point::new(0, 1)), Some(10));
        assert_eq!(g.index(Point::new(9, 19)), Some(199));
        assert_eq!(g.index(Point::new(-1, 0)), None);
        assert_eq!(g.index(Point::new(10, 0)), None);
        assert_eq!(g.index(Point::new(0, 20)), None);
    }

    #[test]
    fn is_clear_bounds() {
        let mut g = grid();
        assert!(g.is_clear(Point::new(0, 0)));
        assert!(g.is_clear(Point::new(-5, -1)));
        assert!(g.is_clear(Point::new(42, -3)));
        assert!(!g.is_clear(Point::new(-1, 0)));
        assert!(!g.is_clear(Point::new(10, 0)));
        assert!(!g.is_clear(Point::new(0, 20)));

        assert!(g.insert_block(Point::new(3, 3), ColorId(1)));
        assert!(!g.is_clear(Point::new(3, 3)));
        assert!(!g.insert_block(Point::new(3, 3), ColorId(1)));
    }

    #[test]
    fn add_polyomino_rebases_blocks_quietly() {
        let mut g = Grid::new(Point::new(35, 1), 10, 20, ParentLink::Root);
        let piece = PieceTemplate::new(vec![Point::new(0, 0), Point::new(1, 0)], ColorId(2))
            .spawn(&g, Point::new(4, 19));
        let before: Vec<_> = piece.blocks().iter().map(|b| b.absolute_position()).collect();

        let log = Rc::new(RefCell::new(Vec::new()));
        let h = {
            let log = Rc::clone(&log);
            handler(move |e: &Event| log.borrow_mut().push(e.name()))
        };
        g.node().events().subscribe(&h);

        let spilled = g.add_polyomino(piece);
        assert!(spilled.is_empty());
        assert_eq!(*log.borrow(), vec!["block-added", "block-added"]);

        let landed = g.get(Point::new(5, 19)).unwrap();
        assert_eq!(landed.local_offset(), Point::new(5, 19));
        assert_eq!(landed.absolute_position(), before[1]);
        assert_eq!(g.block_count(), 2);
    }

    #[test]
    fn add_polyomino_spills_blocks_above_field() {
        let mut g = grid();
        let piece = PieceTemplate::new(vec![Point::new(0, 0), Point::new(0, -1)], ColorId(1))
            .spawn(&g, Point::new(2, 0));
        let spilled = g.add_polyomino(piece);
        assert_eq!(spilled.len(), 1);
        assert_eq!(spilled[0].local_offset(), Point::new(2, -1));
        assert!(g.get(Point::new(2, 0)).is_some());
    }

    #[test]
    fn clear_full_row_shifts_rows_above() {
        let mut g = grid();
        for x in 0..10 {
            g.insert_block(Point::new(x, 19), ColorId(1));
        }
        g.insert_block(Point::new(4, 5), ColorId(7));

        let removed = g.clear_rows();
        assert_eq!(removed.len(), 10);
        assert!(g.get(Point::new(4, 5)).is_none());
        let moved = g.get(Point::new(4, 6)).unwrap();
        assert_eq!(moved.color(), ColorId(7));
        assert_eq!(moved.absolute_position(), Point::new(4, 6));
        assert_eq!(g.block_count(), 1);
    }

    #[test]
    fn clear_rows_handles_non_adjacent_rows() {
        let mut g = grid();
        for x in 0..10 {
            g.insert_block(Point::new(x, 19), ColorId(1));
            g.insert_block(Point::new(x, 17), ColorId(2));
        }
        g.insert_block(Point::new(0, 18), ColorId(3));

        let removed = g.clear_rows();
        assert_eq!(removed.len(), 20);
        // Row 17's blocks come first: rows are scanned from index 0.
        assert_eq!(removed[0].color(), ColorId(2));
        assert_eq!(g.block_count(), 1);
        assert_eq!(g.get(Point::new(0, 19)).map(|b| b.color()), Some(ColorId(3)));
        assert!((0..10).all(|x| g.get(Point::new(x, 0)).is_none()));
    }

    #[test]
    fn partial_rows_are_kept() {
        let mut g = grid();
        for x in 0..9 {
            g.insert_block(Point::new(x, 19), ColorId(1));
        }
        assert!(g.clear_rows().is_empty());
        assert_eq!(g.block_count(), 9);
    }
}
