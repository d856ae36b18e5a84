//! Chunk grid addressing

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::world::chunk::CHUNK_WIDTH;

/// Immutable 2D address of a chunk in the world grid.
///
/// Ordering is field-wise and signed: by `x`, then by `z`. This differs from
/// comparing [`packed`](Self::packed) keys as unsigned integers, which would
/// sort negative coordinates after positive ones. Hashing goes through the
/// packed key, which is consistent with equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkCoordinate {
    x: i16,
    z: i16,
}

impl ChunkCoordinate {
    /// Create a new chunk coordinate
    pub const fn new(x: i16, z: i16) -> Self {
        Self { x, z }
    }

    pub const fn x(&self) -> i16 {
        self.x
    }

    pub const fn z(&self) -> i16 {
        self.z
    }

    /// Single 32-bit key: `x` in the high half, `z` in the low half.
    pub const fn packed(&self) -> u32 {
        ((self.x as u16 as u32) << 16) | (self.z as u16 as u32)
    }

    /// Inverse of [`packed`](Self::packed).
    pub const fn from_packed(key: u32) -> Self {
        Self {
            x: (key >> 16) as u16 as i16,
            z: key as u16 as i16,
        }
    }

    /// Build from wide integers, `None` if either axis leaves the i16 range.
    pub fn checked(x: i32, z: i32) -> Option<Self> {
        Some(Self {
            x: i16::try_from(x).ok()?,
            z: i16::try_from(z).ok()?,
        })
    }

    /// Chunk containing a world position (one world unit per tile, XZ plane).
    ///
    /// Positions beyond the addressable grid saturate to its edge.
    pub fn from_world_pos(pos: Vec3) -> Self {
        let width = CHUNK_WIDTH as f32;
        let axis = |v: f32| (v / width).floor().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        Self {
            x: axis(pos.x),
            z: axis(pos.z),
        }
    }

    /// Global tile coordinate of this chunk's (0, 0) tile.
    pub fn tile_origin(&self) -> (i32, i32) {
        (
            self.x as i32 * CHUNK_WIDTH as i32,
            self.z as i32 * CHUNK_WIDTH as i32,
        )
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev_distance(&self, other: ChunkCoordinate) -> u32 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dz = (self.z as i32 - other.z as i32).unsigned_abs();
        dx.max(dz)
    }
}

impl Hash for ChunkCoordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.packed());
    }
}

impl Ord for ChunkCoordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x.cmp(&other.x).then(self.z.cmp(&other.z))
    }
}

impl PartialOrd for ChunkCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i16, i16)> for ChunkCoordinate {
    fn from((x, z): (i16, i16)) -> Self {
        Self::new(x, z)
    }
}

impl fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
