//! Square chunk windows around a reference coordinate

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::world::coord::ChunkCoordinate;

/// Inclusive square of chunk coordinates within `radius` (Chebyshev) of `center`.
///
/// Side length is `2 * radius + 1`, so radius 0 covers only the center. Rows
/// that would leave the addressable i16 grid are cut off, which makes windows
/// touching the world edge smaller than `(2r + 1)²`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionWindow {
    center: ChunkCoordinate,
    radius: u32,
}

impl RegionWindow {
    pub fn new(center: ChunkCoordinate, radius: u32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> ChunkCoordinate {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    fn axis_range(&self, c: i16) -> RangeInclusive<i32> {
        // Anything wider than the grid covers the whole axis anyway
        let r = self.radius.min(u16::MAX as u32) as i32;
        let lo = (c as i32 - r).max(i16::MIN as i32);
        let hi = (c as i32 + r).min(i16::MAX as i32);
        lo..=hi
    }

    /// Membership test against the inclusive square, O(1).
    pub fn contains(&self, coord: ChunkCoordinate) -> bool {
        self.center.chebyshev_distance(coord) <= self.radius
    }

    /// Coordinates in ascending order (x, then z).
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoordinate> + use<> {
        let zs = self.axis_range(self.center.z());
        self.axis_range(self.center.x()).flat_map(move |x| {
            zs.clone()
                .map(move |z| ChunkCoordinate::new(x as i16, z as i16))
        })
    }

    /// Number of coordinates covered.
    pub fn len(&self) -> usize {
        let span = |r: RangeInclusive<i32>| (r.end() - r.start() + 1) as usize;
        span(self.axis_range(self.center.x())) * span(self.axis_range(self.center.z()))
    }

    /// Always false: a window covers at least its center.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_set(&self) -> BTreeSet<ChunkCoordinate> {
        self.iter().collect()
    }
}

/// All coordinates within `radius` of `center`, as an ordered set.
pub fn window(center: ChunkCoordinate, radius: u32) -> BTreeSet<ChunkCoordinate> {
    RegionWindow::new(center, radius).to_set()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_zero_is_center_only() {
        let c = ChunkCoordinate::new(4, -7);
        let set = window(c, 0);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&c));
    }

    #[test]
    fn test_size_matches_side_squared() {
        for r in 0..6u32 {
            let w = RegionWindow::new(ChunkCoordinate::new(-3, 11), r);
            let side = (2 * r + 1) as usize;
            assert_eq!(w.len(), side * side);
            assert_eq!(w.iter().count(), side * side);
            assert_eq!(w.to_set().len(), side * side);
        }
    }

    #[test]
    fn test_boundary_membership() {
        let w = RegionWindow::new(ChunkCoordinate::new(0, 0), 2);
        assert!(w.contains(ChunkCoordinate::new(2, 2)));
        assert!(w.contains(ChunkCoordinate::new(-2, -2)));
        assert!(w.contains(ChunkCoordinate::new(2, -2)));
        assert!(!w.contains(ChunkCoordinate::new(3, 0)));
        assert!(!w.contains(ChunkCoordinate::new(0, -3)));
        assert!(!w.contains(ChunkCoordinate::new(3, 3)));

        let set = w.to_set();
        for x in -4i16..=4 {
            for z in -4i16..=4 {
                let c = ChunkCoordinate::new(x, z);
                let inside = x.abs() <= 2 && z.abs() <= 2;
                assert_eq!(set.contains(&c), inside, "{c}");
                assert_eq!(w.contains(c), inside, "{c}");
            }
        }
    }

    #[test]
    fn test_iteration_is_ascending() {
        let w = RegionWindow::new(ChunkCoordinate::new(1, -1), 2);
        let coords: Vec<_> = w.iter().collect();
        let mut sorted = coords.clone();
        sorted.sort();
        assert_eq!(coords, sorted);
        assert_eq!(coords.first(), Some(&ChunkCoordinate::new(-1, -3)));
        assert_eq!(coords.last(), Some(&ChunkCoordinate::new(3, 1)));
    }

    #[test]
    fn test_truncated_at_world_edge() {
        let w = RegionWindow::new(ChunkCoordinate::new(i16::MAX, 0), 1);
        // Only x = MAX-1 and MAX exist
        assert_eq!(w.len(), 2 * 3);
        assert_eq!(w.iter().count(), 6);
        assert!(w.iter().all(|c| c.x() >= i16::MAX - 1));
    }

    #[test]
    fn test_huge_radius_covers_axis() {
        let w = RegionWindow::new(ChunkCoordinate::new(0, 0), u32::MAX);
        assert!(w.contains(ChunkCoordinate::new(i16::MIN, i16::MAX)));
    }
}
