//! Diff-based migration planning between two window positions
//!
//! Given the old and new reference coordinates, the planner compares the hot
//! and cold windows at both positions and sorts every affected coordinate
//! into exactly one of four action sets:
//!
//! | set              | coordinates                        | transition            |
//! |------------------|------------------------------------|-----------------------|
//! | `full_load`      | `newHot - oldHot`                  | unloaded/cold -> hot  |
//! | `partial_load`   | `(newCold - oldCold) - newHot`     | unloaded -> cold      |
//! | `partial_unload` | `(oldHot - newHot) ∩ newCold`      | hot -> cold           |
//! | `full_unload`    | `oldCold - newCold`                | cold/hot -> unloaded  |
//!
//! Each set is sorted ascending so that execution and event order are
//! deterministic.

use crate::streaming::window::RegionWindow;
use crate::world::coord::ChunkCoordinate;

/// The four disjoint action sets for one recenter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecenterPlan {
    /// Must end up hot and were not hot before
    pub full_load: Vec<ChunkCoordinate>,
    /// Newly inside the cold band, previously unloaded
    pub partial_load: Vec<ChunkCoordinate>,
    /// Leaving the hot window but still inside the cold one
    pub partial_unload: Vec<ChunkCoordinate>,
    /// Outside even the new cold window
    pub full_unload: Vec<ChunkCoordinate>,
}

impl RecenterPlan {
    /// True when the recenter has nothing to do.
    pub fn is_empty(&self) -> bool {
        self.full_load.is_empty()
            && self.partial_load.is_empty()
            && self.partial_unload.is_empty()
            && self.full_unload.is_empty()
    }

    /// Total number of actions across all four sets.
    pub fn len(&self) -> usize {
        self.full_load.len()
            + self.partial_load.len()
            + self.partial_unload.len()
            + self.full_unload.len()
    }

    /// Every coordinate touched by the plan, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.full_load
            .iter()
            .chain(&self.partial_load)
            .chain(&self.partial_unload)
            .chain(&self.full_unload)
            .copied()
    }

    /// Fold chunks that live outside the tracked windows into the unload sets.
    pub(crate) fn absorb_strays(
        &mut self,
        demote: impl IntoIterator<Item = ChunkCoordinate>,
        evict: impl IntoIterator<Item = ChunkCoordinate>,
    ) {
        extend_sorted(&mut self.partial_unload, demote);
        extend_sorted(&mut self.full_unload, evict);

        // A stray hot chunk in the new cold band is demoted, not cold loaded
        let demoted = &self.partial_unload;
        self.partial_load.retain(|c| demoted.binary_search(c).is_err());
    }

    /// Fold window coordinates missing from their tier into the load sets.
    ///
    /// `promote` must lie in the new hot window and `fill` in the new cold
    /// band, so both stay disjoint from the unload sets.
    pub(crate) fn absorb_holes(
        &mut self,
        promote: impl IntoIterator<Item = ChunkCoordinate>,
        fill: impl IntoIterator<Item = ChunkCoordinate>,
    ) {
        extend_sorted(&mut self.full_load, promote);
        extend_sorted(&mut self.partial_load, fill);
    }
}

fn extend_sorted(set: &mut Vec<ChunkCoordinate>, extra: impl IntoIterator<Item = ChunkCoordinate>) {
    let before = set.len();
    set.extend(extra);
    if set.len() != before {
        set.sort_unstable();
        set.dedup();
    }
}

/// Plans tier migrations for a fixed pair of radii.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecenterPlanner {
    hot_radius: u32,
    cold_radius: u32,
}

impl RecenterPlanner {
    /// `cold_radius` must be at least `hot_radius`; the cache config validates this.
    pub fn new(hot_radius: u32, cold_radius: u32) -> Self {
        debug_assert!(cold_radius >= hot_radius);
        Self { hot_radius, cold_radius }
    }

    pub fn hot_window(&self, center: ChunkCoordinate) -> RegionWindow {
        RegionWindow::new(center, self.hot_radius)
    }

    pub fn cold_window(&self, center: ChunkCoordinate) -> RegionWindow {
        RegionWindow::new(center, self.cold_radius)
    }

    /// Plan the move from `old_center` to `new_center`.
    ///
    /// `None` as the old center means nothing is resident yet, so both new
    /// windows are loaded from scratch.
    pub fn plan(
        &self,
        old_center: Option<ChunkCoordinate>,
        new_center: ChunkCoordinate,
    ) -> RecenterPlan {
        if old_center == Some(new_center) {
            return RecenterPlan::default();
        }

        let new_hot = self.hot_window(new_center);
        let new_cold = self.cold_window(new_center);

        let Some(old_center) = old_center else {
            return RecenterPlan {
                full_load: new_hot.iter().collect(),
                partial_load: new_cold.iter().filter(|c| !new_hot.contains(*c)).collect(),
                ..Default::default()
            };
        };

        let old_hot = self.hot_window(old_center);
        let old_cold = self.cold_window(old_center);

        RecenterPlan {
            full_load: new_hot.iter().filter(|c| !old_hot.contains(*c)).collect(),
            partial_load: new_cold
                .iter()
                .filter(|c| !old_cold.contains(*c) && !new_hot.contains(*c))
                .collect(),
            partial_unload: old_hot
                .iter()
                .filter(|c| !new_hot.contains(*c) && new_cold.contains(*c))
                .collect(),
            full_unload: old_cold.iter().filter(|c| !new_cold.contains(*c)).collect(),
        }
    }
}

/// One-shot form of [`RecenterPlanner::plan`].
pub fn plan_recenter(
    old_center: ChunkCoordinate,
    new_center: ChunkCoordinate,
    hot_radius: u32,
    cold_radius: u32,
) -> RecenterPlan {
    RecenterPlanner::new(hot_radius, cold_radius).plan(Some(old_center), new_center)
}
