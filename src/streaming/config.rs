//! Window radii for the tiered cache

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Hot/cold window radii, in chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Radius of the fully active window around the reference point
    pub hot_radius: u32,
    /// Radius of the buffer band; must be `>= hot_radius`
    pub cold_radius: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            hot_radius: 2,
            cold_radius: 4,
        }
    }
}

impl CacheConfig {
    pub fn new(hot_radius: u32, cold_radius: u32) -> Self {
        Self { hot_radius, cold_radius }
    }

    /// Reject configurations where the cold window does not enclose the hot one.
    pub fn validate(&self) -> Result<()> {
        if self.cold_radius < self.hot_radius {
            return Err(Error::Config(format!(
                "cold_radius ({}) must be >= hot_radius ({})",
                self.cold_radius, self.hot_radius
            )));
        }
        Ok(())
    }

    /// Chunks resident once the windows are filled
    pub fn resident_capacity(&self) -> usize {
        let side = (self.cold_radius as usize).saturating_mul(2).saturating_add(1);
        side.saturating_mul(side)
    }
}
