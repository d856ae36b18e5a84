//! Chunk content generation
//!
//! The cache only needs the [`Generator`] port. [`TerrainGenerator`] is the
//! stock noise-based implementation; closures work too.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::world::chunk::{Tile, TileGrid, CHUNK_WIDTH};
use crate::world::coord::ChunkCoordinate;

/// Fills a freshly created chunk's tiles.
///
/// Called once per cold load while the cache lock is held. Returning an
/// error leaves the coordinate unloaded; nothing partial is inserted.
pub trait Generator: Send + Sync {
    fn populate(&self, coord: ChunkCoordinate, tiles: &mut TileGrid) -> Result<()>;
}

impl<F> Generator for F
where
    F: Fn(ChunkCoordinate, &mut TileGrid) -> Result<()> + Send + Sync,
{
    fn populate(&self, coord: ChunkCoordinate, tiles: &mut TileGrid) -> Result<()> {
        self(coord, tiles)
    }
}

/// Fills every tile with the same value
#[derive(Clone, Copy, Debug)]
pub struct FlatGenerator {
    pub tile: Tile,
}

impl Generator for FlatGenerator {
    fn populate(&self, _coord: ChunkCoordinate, tiles: &mut TileGrid) -> Result<()> {
        for column in tiles.iter_mut() {
            column.fill(self.tile);
        }
        Ok(())
    }
}

/// Parameters controlling terrain generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,       // Horizontal scale in tiles (larger = smoother)
    pub octaves: u32,     // FBM octaves (detail levels)
    pub persistence: f32, // FBM persistence (0.5 typical)
    pub lacunarity: f32,  // FBM lacunarity (2.0 typical)
    /// Normalized heights (0-1) below this are water
    pub sea_level: f32,
    /// Height band above sea level that becomes sand
    pub beach_width: f32,
    /// Grass gives way to stone above this
    pub rock_level: f32,
    /// Stone gives way to snow above this
    pub snow_level: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 100.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            sea_level: 0.4,
            beach_width: 0.03,
            rock_level: 0.7,
            snow_level: 0.85,
        }
    }
}

/// Procedural terrain generator using fractal Brownian motion (FBM)
pub struct TerrainGenerator {
    params: TerrainParams,
    noise: Fbm<Perlin>,
}

impl TerrainGenerator {
    /// Create a new terrain generator with the given parameters
    pub fn new(params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    /// Get terrain parameters
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Normalized terrain height (0-1) at a global tile position
    pub fn height_at(&self, x: i32, z: i32) -> f32 {
        let nx = x as f64 / self.params.scale as f64;
        let nz = z as f64 / self.params.scale as f64;

        // FBM is roughly [-1, 1]; remap and clamp overshoot
        let value = (self.noise.get([nx, nz]) + 1.0) / 2.0;
        value.clamp(0.0, 1.0) as f32
    }

    /// Ground type for a normalized height
    pub fn classify(&self, height: f32) -> Tile {
        let p = &self.params;
        if height < p.sea_level {
            Tile::Water
        } else if height < p.sea_level + p.beach_width {
            Tile::Sand
        } else if height < p.rock_level {
            Tile::Grass
        } else if height < p.snow_level {
            Tile::Stone
        } else {
            Tile::Snow
        }
    }

    pub fn tile_at(&self, x: i32, z: i32) -> Tile {
        self.classify(self.height_at(x, z))
    }
}

impl Generator for TerrainGenerator {
    fn populate(&self, coord: ChunkCoordinate, tiles: &mut TileGrid) -> Result<()> {
        let (ox, oz) = coord.tile_origin();
        for (lx, column) in tiles.iter_mut().enumerate() {
            for (lz, tile) in column.iter_mut().enumerate() {
                *tile = self.tile_at(ox + lx as i32, oz + lz as i32);
            }
        }
        debug_assert_eq!(tiles.len(), CHUNK_WIDTH);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::world::chunk::Chunk;

    fn populated(generator: &dyn Generator, coord: ChunkCoordinate) -> Chunk {
        let mut chunk = Chunk::new(coord);
        generator.populate(coord, chunk.tiles_mut()).unwrap();
        chunk
    }

    #[test]
    fn test_flat_generator_fills_all_tiles() {
        let chunk = populated(&FlatGenerator { tile: Tile::Dirt }, ChunkCoordinate::new(0, 0));
        assert_eq!(chunk.count(Tile::Dirt), CHUNK_WIDTH * CHUNK_WIDTH);
    }

    #[test]
    fn test_closure_generator() {
        let generator = |coord: ChunkCoordinate, tiles: &mut TileGrid| -> Result<()> {
            if coord.x() < 0 {
                return Err(Error::generation(coord, "west is unmapped"));
            }
            tiles[0][0] = Tile::Stone;
            Ok(())
        };

        let chunk = populated(&generator, ChunkCoordinate::new(1, 0));
        assert_eq!(chunk.tile(0, 0), Tile::Stone);

        let mut tiles = *chunk.tiles();
        assert!(generator.populate(ChunkCoordinate::new(-1, 0), &mut tiles).is_err());
    }

    #[test]
    fn test_terrain_is_deterministic() {
        let a = TerrainGenerator::new(TerrainParams::default());
        let b = TerrainGenerator::new(TerrainParams::default());
        let coord = ChunkCoordinate::new(-3, 7);
        assert_eq!(populated(&a, coord), populated(&b, coord));
    }

    #[test]
    fn test_terrain_leaves_no_void() {
        let generator = TerrainGenerator::new(TerrainParams::default());
        let chunk = populated(&generator, ChunkCoordinate::new(2, 2));
        assert_eq!(chunk.count(Tile::Void), 0);
    }

    #[test]
    fn test_height_in_unit_range() {
        let generator = TerrainGenerator::new(TerrainParams::default());
        for x in (-200..200).step_by(37) {
            for z in (-200..200).step_by(41) {
                let h = generator.height_at(x, z);
                assert!((0.0..=1.0).contains(&h));
            }
        }
    }

    #[test]
    fn test_classify_bands() {
        let generator = TerrainGenerator::new(TerrainParams::default());
        assert_eq!(generator.classify(0.0), Tile::Water);
        assert_eq!(generator.classify(0.41), Tile::Sand);
        assert_eq!(generator.classify(0.5), Tile::Grass);
        assert_eq!(generator.classify(0.75), Tile::Stone);
        assert_eq!(generator.classify(1.0), Tile::Snow);
    }

    #[test]
    fn test_tiles_follow_global_position() {
        let generator = TerrainGenerator::new(TerrainParams::default());
        let coord = ChunkCoordinate::new(1, -1);
        let chunk = populated(&generator, coord);
        let (gx, gz) = chunk.global_tile(5, 9);
        assert_eq!(chunk.tile(5, 9), generator.tile_at(gx, gz));
    }
}
