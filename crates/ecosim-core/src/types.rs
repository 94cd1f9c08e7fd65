//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Step one tile in `direction`
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// Whether the position lies inside `[0, width) x [0, height)`
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        (0..width).contains(&self.x) && (0..height).contains(&self.y)
    }

    /// Manhattan distance to another position
    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction for movement. Rabbits only ever move along the axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The four cardinal directions, in the order draws are made from
    pub const CARDINAL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

/// Tile state.
///
/// `regrow_timer == 0` means the tile currently bears grass. `free_capacity`
/// counts how many more rabbits may stand on the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub regrow_timer: u32,
    pub free_capacity: u32,
}

impl Tile {
    /// A grassy, unoccupied tile
    pub fn fresh(capacity: u32) -> Self {
        Self {
            regrow_timer: 0,
            free_capacity: capacity,
        }
    }

    pub fn has_grass(&self) -> bool {
        self.regrow_timer == 0
    }

    pub fn has_room(&self) -> bool {
        self.free_capacity > 0
    }

    /// Strip the grass and start the regrow countdown.
    /// Returns false when there was nothing to eat.
    pub fn graze(&mut self, regrow_delay: u32) -> bool {
        if !self.has_grass() {
            return false;
        }
        self.regrow_timer = regrow_delay;
        true
    }

    /// Advance the regrow countdown by one tick
    pub fn regrow(&mut self) {
        self.regrow_timer = self.regrow_timer.saturating_sub(1);
    }
}
