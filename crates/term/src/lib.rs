//! Terminal rendering layer.
//!
//! States draw into a persistent [`FrameBuffer`]; the [`TerminalRenderer`]
//! flushes it with crossterm, sending only the cells that changed since the
//! previous frame. Screens that did not change simply leave the buffer alone.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use blockfall_core as core;
pub use blockfall_types as types;

pub use fb::{centered_column, Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{named_rgb, pair_style, GameView, Viewport};
pub use renderer::{changed_spans, encode_frame, Span, TerminalRenderer};
