//! Map coordinates.
//!
//! Two coordinate spaces exist: pixel positions for movement and combat, and
//! tile positions for building placement. One tile is [`TILE_SIZE`] pixels on
//! a side. Accessors that cannot answer (fog of war, dead unit) return
//! `Option::None` rather than a sentinel coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge length of a map tile in pixels.
pub const TILE_SIZE: i32 = 32;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A pixel-space map position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position, in pixels.
    pub fn distance_to(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// The tile containing this position.
    pub fn to_tile(self) -> TilePosition {
        TilePosition {
            x: self.x.div_euclid(TILE_SIZE),
            y: self.y.div_euclid(TILE_SIZE),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// TilePosition
// ---------------------------------------------------------------------------

/// A tile-space map position (building placement resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Pixel position of this tile's top-left corner.
    pub fn to_position(self) -> Position {
        Position {
            x: self.x * TILE_SIZE,
            y: self.y * TILE_SIZE,
        }
    }
}

impl fmt::Display for TilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile ({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
