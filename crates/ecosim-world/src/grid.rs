//! 2D bounded grid for the world.

use ecosim_core::{Position, Tile};
use serde::{Deserialize, Serialize};

/// A dense, bounded grid of tiles stored row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    capacity: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Every tile starts grassy with full capacity
    pub fn new(width: i32, height: i32, capacity: u32) -> Self {
        let size = width.max(0) as usize * height.max(0) as usize;
        Self {
            width,
            height,
            capacity,
            tiles: vec![Tile::fresh(capacity); size],
        }
    }

    /// Configured per-tile capacity
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.in_bounds(self.width, self.height)
    }

    /// Get tile at position. Panics outside the grid.
    pub fn get(&self, pos: Position) -> &Tile {
        let index = self.pos_to_index(pos);
        &self.tiles[index]
    }

    pub fn get_mut(&mut self, pos: Position) -> &mut Tile {
        let index = self.pos_to_index(pos);
        &mut self.tiles[index]
    }

    /// Whether another rabbit can stand at `pos`
    pub fn has_room(&self, pos: Position) -> bool {
        self.contains(pos) && self.get(pos).has_room()
    }

    /// Take one unit of capacity at `pos`
    pub fn occupy(&mut self, pos: Position) {
        let tile = self.get_mut(pos);
        assert!(
            tile.free_capacity > 0,
            "tile {} is already at capacity",
            pos
        );
        tile.free_capacity -= 1;
    }

    /// Give one unit of capacity back at `pos`
    pub fn release(&mut self, pos: Position) {
        let capacity = self.capacity;
        let tile = self.get_mut(pos);
        assert!(
            tile.free_capacity < capacity,
            "tile {} released more capacity than it holds",
            pos
        );
        tile.free_capacity += 1;
    }

    /// Count tiles that currently bear grass
    pub fn grass_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.has_grass()).count()
    }

    /// Advance every regrow timer by one tick, skipping tiles flagged in `fresh`.
    ///
    /// `fresh` is indexed like the tile storage and marks tiles grazed this tick.
    pub fn regrow(&mut self, fresh: &[bool]) {
        debug_assert_eq!(fresh.len(), self.tiles.len());
        for (tile, &skip) in self.tiles.iter_mut().zip(fresh) {
            if !skip {
                tile.regrow();
            }
        }
    }

    /// Regrow timers in row-major order
    pub fn timers(&self) -> Vec<u32> {
        self.tiles.iter().map(|tile| tile.regrow_timer).collect()
    }

    pub fn pos_to_index(&self, pos: Position) -> usize {
        assert!(self.contains(pos), "position {} is outside the grid", pos);
        (pos.y * self.width + pos.x) as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Iterator over all tiles with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (self.index_to_pos(i), tile))
    }
}
