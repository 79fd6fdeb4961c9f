//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core simulation, state machine, rendering, relay).
//!
//! # Coordinates
//!
//! Positions are integer 2D vectors. `x` grows to the right, `y` grows toward
//! the floor: row 0 is the top of the playfield and row `GRID_HEIGHT - 1` is the
//! bottom. Negative rows are above the visible field.
//!
//! # Grid Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19)
//! - **Spawn position**: (`GRID_WIDTH / 2`, 0)
//!
//! # Timing
//!
//! One gravity tick happens every `BASE_GRAVITY_SECS / level` seconds.
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{Point, GRID_WIDTH, GRID_HEIGHT};
//!
//! let p = Point::new(2, 3) + Point::new(1, -1);
//! assert_eq!(p, Point::new(3, 2));
//!
//! assert_eq!(GRID_WIDTH, 10);
//! assert_eq!(GRID_HEIGHT, 20);
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Grid width in cells (10 columns)
pub const GRID_WIDTH: usize = 10;

/// Grid height in cells (20 rows)
pub const GRID_HEIGHT: usize = 20;

/// Gravity interval at level 1, in seconds. Divided by the level at higher levels.
pub const BASE_GRAVITY_SECS: f64 = 0.5;

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Number of entries kept on the high score table.
pub const MAX_HIGH_SCORES: usize = 10;

/// Target frame interval of the game loop in milliseconds (16ms ≈ 60 FPS)
pub const FRAME_MS: u64 = 16;

/// Integer 2D vector used for local offsets and absolute positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The origin (0, 0).
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rotate 90° left about the origin: (x, y) → (−y, x).
    pub const fn rotated_left(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Rotate 90° right about the origin: (x, y) → (y, −x).
    pub const fn rotated_right(self) -> Self {
        Self {
            x: self.y,
            y: -self.x,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Color tag carried by a block. Resolved to real colors by the renderer
/// through the loaded color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ColorId(pub u16);

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single discrete input symbol delivered to the active state.
///
/// Mapping symbols to commands is up to each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSymbol {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Escape,
    Pause,
    Char(char),
}

/// Player commands accepted by the game engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    /// Rotate the piece 90° left: (x, y) → (−y, x)
    RotateLeft,
    /// Rotate the piece 90° right: (x, y) → (y, −x)
    RotateRight,
    /// Move the piece one cell left
    Left,
    /// Move the piece one cell right
    Right,
    /// Move the piece one cell toward the floor
    Down,
}
