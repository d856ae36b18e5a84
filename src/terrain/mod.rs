//! Procedural chunk content

pub mod generator;
pub use generator::{FlatGenerator, Generator, TerrainGenerator, TerrainParams};
