//! Error types for the chunk cache

use thiserror::Error;

use crate::world::coord::ChunkCoordinate;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Generation failed for chunk {coord}: {message}")]
    Generation {
        coord: ChunkCoordinate,
        message: String,
    },

    #[error("Recenter left {} chunk(s) unloaded after generation failures", failed.len())]
    IncompleteRecenter { failed: Vec<ChunkCoordinate> },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Build a generation error for `coord`.
    pub fn generation(coord: ChunkCoordinate, message: impl Into<String>) -> Self {
        Self::Generation {
            coord,
            message: message.into(),
        }
    }
}
