//! World grid data: chunk coordinates, chunks and tiles

pub mod coord;
pub mod chunk;

pub use coord::ChunkCoordinate;
pub use chunk::{Chunk, Tile, TileGrid, CHUNK_WIDTH};
