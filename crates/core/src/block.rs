//! Block - the leaf of the entity hierarchy

use std::rc::Rc;

use crate::entity::{Node, ParentLink};
use crate::event::EntityId;
use crate::types::{ColorId, Point};

/// A single colored cell. Owned by exactly one container at a time: a falling
/// [`Piece`](crate::piece::Piece) or a [`Grid`](crate::grid::Grid) cell.
///
/// Not `Clone`: ownership moves between containers, it is never duplicated.
#[derive(Debug)]
pub struct Block {
    node: Rc<Node>,
    color: ColorId,
}

impl Block {
    pub fn new(local: Point, color: ColorId, parent: ParentLink) -> Self {
        Self {
            node: Node::with_parent(local, parent),
            color,
        }
    }

    pub fn id(&self) -> EntityId {
        self.node.id()
    }

    pub fn color(&self) -> ColorId {
        self.color
    }

    pub fn node(&self) -> &Rc<Node> {
        &self.node
    }

    pub fn local_offset(&self) -> Point {
        self.node.local_offset()
    }

    pub fn absolute_position(&self) -> Point {
        self.node.absolute_position()
    }
}
