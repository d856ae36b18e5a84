//! World configuration file
//!
//! ```json
//! {
//!   "cache": { "hot_radius": 2, "cold_radius": 4 },
//!   "terrain": { "seed": 7, "scale": 120.0 }
//! }
//! ```
//!
//! Missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::streaming::config::CacheConfig;
use crate::terrain::generator::TerrainParams;

/// Everything needed to stand up a streamed world
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub cache: CacheConfig,
    pub terrain: TerrainParams,
}

impl WorldConfig {
    /// Parse and validate a JSON config string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }
}
