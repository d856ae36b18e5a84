//! Chunks: fixed-size square blocks of map tiles, the unit of streaming

use serde::{Deserialize, Serialize};

use crate::world::coord::ChunkCoordinate;

/// Number of tiles per chunk side
pub const CHUNK_WIDTH: usize = 16;

/// Ground type of a single tile
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    /// Not generated yet
    #[default]
    Void = 0,
    Water = 1,
    Sand = 2,
    Grass = 3,
    Dirt = 4,
    Stone = 5,
    Snow = 6,
}

impl Tile {
    /// Whether something solid can stand on this tile.
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Tile::Void | Tile::Water)
    }
}

/// Tile storage of one chunk, addressed `[local_x][local_z]`
pub type TileGrid = [[Tile; CHUNK_WIDTH]; CHUNK_WIDTH];

/// A single chunk: its grid address plus a `CHUNK_WIDTH`² tile grid
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    coord: ChunkCoordinate,
    tiles: TileGrid,
    /// Set once the generator has populated the tiles
    generated: bool,
}

impl Chunk {
    /// Create a new chunk with every tile [`Tile::Void`]
    pub fn new(coord: ChunkCoordinate) -> Self {
        Self {
            coord,
            tiles: [[Tile::Void; CHUNK_WIDTH]; CHUNK_WIDTH],
            generated: false,
        }
    }

    pub fn coord(&self) -> ChunkCoordinate {
        self.coord
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub(crate) fn mark_generated(&mut self) {
        self.generated = true;
    }

    /// Tile at a local position. Panics if either index is `>= CHUNK_WIDTH`.
    pub fn tile(&self, local_x: usize, local_z: usize) -> Tile {
        self.tiles[local_x][local_z]
    }

    /// Tile at a local position, `None` when out of bounds.
    pub fn get_tile(&self, local_x: usize, local_z: usize) -> Option<Tile> {
        self.tiles.get(local_x)?.get(local_z).copied()
    }

    pub fn set_tile(&mut self, local_x: usize, local_z: usize, tile: Tile) {
        self.tiles[local_x][local_z] = tile;
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut TileGrid {
        &mut self.tiles
    }

    /// Global tile coordinate of a local position: `coord * CHUNK_WIDTH + local`.
    pub fn global_tile(&self, local_x: usize, local_z: usize) -> (i32, i32) {
        let (ox, oz) = self.coord.tile_origin();
        (ox + local_x as i32, oz + local_z as i32)
    }

    /// Count tiles of the given kind
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles
            .iter()
            .flat_map(|column| column.iter())
            .filter(|t| **t == tile)
            .count()
    }
}
