//! Piece module - a falling group of blocks with atomic rotate/translate
//!
//! Every block's local offset is relative to the piece; the piece's own local
//! offset is its position on the grid. An operation first computes every
//! candidate cell, checks all of them against the surface, and only then
//! commits. A rejected operation leaves the piece untouched.

use std::rc::Rc;

use tracing::trace;

use crate::block::Block;
use crate::entity::{Node, ParentLink};
use crate::event::{EntityId, EventKind};
use crate::types::{ColorId, Point};

/// Occupancy queries a piece validates its moves against.
///
/// Coordinates are relative to the surface.
pub trait Surface {
    fn is_clear(&self, position: Point) -> bool;
}

/// A surface with no walls, floor or contents. Every cell is clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Surface for Unbounded {
    fn is_clear(&self, _position: Point) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct Piece {
    node: Rc<Node>,
    blocks: Vec<Block>,
}

impl Piece {
    /// Create an empty piece at `position` within `parent`.
    pub fn new(position: Point, parent: ParentLink) -> Self {
        Self {
            node: Node::with_parent(position, parent),
            blocks: Vec::new(),
        }
    }

    /// Create a block owned by this piece.
    pub fn push_block(&mut self, local: Point, color: ColorId) {
        let block = Block::new(local, color, ParentLink::entity(&self.node));
        self.blocks.push(block);
    }

    pub fn id(&self) -> EntityId {
        self.node.id()
    }

    pub fn node(&self) -> &Rc<Node> {
        &self.node
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn local_offset(&self) -> Point {
        self.node.local_offset()
    }

    pub fn absolute_position(&self) -> Point {
        self.node.absolute_position()
    }

    /// Cells the blocks occupy on the surface.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let origin = self.node.local_offset();
        self.blocks.iter().map(move |b| origin + b.local_offset())
    }

    pub(crate) fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Rotate 90° left about the piece origin: (x, y) → (−y, x).
    pub fn rotate_left(&self, surface: &dyn Surface) -> bool {
        self.rotate(surface, Point::rotated_left)
    }

    /// Rotate 90° right about the piece origin: (x, y) → (y, −x).
    pub fn rotate_right(&self, surface: &dyn Surface) -> bool {
        self.rotate(surface, Point::rotated_right)
    }

    /// Translate the whole piece by `delta`.
    pub fn move_delta(&self, delta: Point, surface: &dyn Surface) -> bool {
        let candidates: Vec<Point> = self.blocks.iter().map(|b| b.local_offset() + delta).collect();
        if !self.fits(&candidates, surface) {
            trace!(piece = %self.id(), dx = delta.x, dy = delta.y, "move rejected");
            return false;
        }
        // Blocks are relative to the piece, so only the piece moves.
        self.node.set_local_offset(self.node.local_offset() + delta);
        true
    }

    fn rotate(&self, surface: &dyn Surface, f: fn(Point) -> Point) -> bool {
        let candidates: Vec<Point> = self.blocks.iter().map(|b| f(b.local_offset())).collect();
        if !self.fits(&candidates, surface) {
            trace!(piece = %self.id(), "rotation rejected");
            return false;
        }
        for (block, offset) in self.blocks.iter().zip(candidates) {
            block.node().set_local_offset(offset);
        }
        self.node.emit(EventKind::Rotated);
        true
    }

    fn fits(&self, candidates: &[Point], surface: &dyn Surface) -> bool {
        let origin = self.node.local_offset();
        candidates.iter().all(|&c| surface.is_clear(origin + c))
    }
}
