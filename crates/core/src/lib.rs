//! Core game logic - entities, events, grid and engine
//!
//! Everything here is single-threaded, deterministic for a given seed, and free
//! of terminal or network I/O.
//!
//! # Module Structure
//!
//! - [`event`]: synchronous dispatcher with suppression scopes
//! - [`entity`]: parent/child nodes with derived absolute positions
//! - [`block`], [`piece`], [`template`]: the falling pieces
//! - [`grid`]: the playfield, merging and row clearing
//! - [`engine`]: gravity, commands, counters for one session
//! - [`config`]: colors and piece sets from `data.json`
//! - [`snapshot`]: plain-data view for renderers
//!
//! # Positions
//!
//! Every entity stores an offset relative to its parent. Absolute position is
//! always derived: the sum of offsets up the chain. Moving a parent fires a
//! `position-changed` event on every descendant.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use blockfall_core::{Game, PieceTemplate};
//! use blockfall_core::types::{ColorId, Point};
//!
//! let square = PieceTemplate::new(
//!     vec![Point::new(0, 0), Point::new(1, 0), Point::new(0, 1), Point::new(1, 1)],
//!     ColorId(1),
//! );
//! let mut game = Game::new(Point::ORIGIN, vec![square], 7).unwrap();
//!
//! // One gravity interval spawns a piece and drops it a row.
//! assert!(game.step(Duration::from_millis(500)));
//! assert!(game.left());
//! assert_eq!(game.score(), 0);
//! ```

pub mod block;
pub mod config;
pub mod engine;
pub mod entity;
pub mod event;
pub mod grid;
pub mod piece;
pub mod rng;
pub mod snapshot;
pub mod template;

pub use blockfall_types as types;

pub use block::Block;
pub use config::{load_catalog, parse_catalog, Catalog, ColorPair, ConfigError, NamedColor};
pub use engine::{Game, GameError};
pub use entity::{Node, ParentLink};
pub use event::{handler, EntityId, Event, EventDispatcher, EventKind, Handler, HandlerNotFound};
pub use grid::Grid;
pub use piece::{Piece, Surface, Unbounded};
pub use rng::SimpleRng;
pub use snapshot::{BlockView, GameSnapshot};
pub use template::PieceTemplate;
