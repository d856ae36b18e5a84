//! Tierstream - tiered, spatially-windowed chunk cache for streaming worlds
//!
//! A [`TieredChunkCache`](streaming::TieredChunkCache) keeps the chunks around
//! a moving reference point resident in two tiers: a small hot window of
//! active chunks and a wider cold band of generated but inactive ones.

pub mod core;
pub mod world;
pub mod streaming;
pub mod terrain;
pub mod config;

pub use crate::core::{Error, Result};
pub use config::WorldConfig;
pub use streaming::{
    CacheConfig, ChunkEvent, EventBus, EventPort, RecenterPlan, Tier, TieredChunkCache,
};
pub use terrain::{Generator, TerrainGenerator, TerrainParams};
pub use world::{Chunk, ChunkCoordinate, Tile, CHUNK_WIDTH};
