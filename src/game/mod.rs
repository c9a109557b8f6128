//! # Game Module
//!
//! Game rules and the state machine that drives them.
//!
//! - Player model: stats, inventory, quests and world flags
//! - Dungeon traversal: the floor tile map and tile effects
//! - Combat resolution: damage formulas, enemy behaviour and level-ups
//! - Game state: the screen state machine that ties everything together

pub mod combat;
pub mod dungeon;
pub mod player;
pub mod rng;
pub mod state;

pub use combat::*;
pub use dungeon::*;
pub use player::*;
pub use rng::*;
pub use state::*;

use crate::config::{MAP_HEIGHT, MAP_WIDTH};
use serde::{Deserialize, Serialize};

/// A tile coordinate on a dungeon floor.
///
/// # Examples
///
/// ```
/// use descent::{Direction, Position};
///
/// let pos = Position::new(3, 4);
/// assert_eq!(pos.step(Direction::North), Some(Position::new(3, 3)));
/// assert_eq!(Position::new(0, 0).step(Direction::West), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Returns true if the position lies on the map.
    pub fn in_bounds(self) -> bool {
        (self.x as usize) < MAP_WIDTH && (self.y as usize) < MAP_HEIGHT
    }

    /// The neighbouring position in `direction`, if it lies on the map.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.to_delta();
        let x = self.x as i32 + dx;
        let y = self.y as i32 + dy;
        if x < 0 || y < 0 {
            return None;
        }
        let next = Position::new(x as u8, y as u8);
        next.in_bounds().then_some(next)
    }
}

/// Directions for movement on the dungeon grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a `(dx, dy)` delta.
    pub fn to_delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Returns all 4 directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}
