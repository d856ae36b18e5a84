//! Two-tier chunk cache windowed around a moving reference point
//!
//! Chunks near the reference point live in the *hot* tier (active,
//! renderable); a wider band around it is kept in the *cold* tier (generated
//! but inactive) so that small movements never regenerate anything.
//! Everything outside both windows is dropped.
//!
//! Per coordinate the cache is a small state machine:
//!
//! ```text
//! Unloaded --generate--> Cold --promote (ChunkLoaded)--> Hot
//!    ^                    |  <--demote (ChunkUnloaded)--
//!    +------evict---------+
//! ```
//!
//! A hot chunk is always demoted before eviction, so every chunk that was
//! ever active produces exactly one `ChunkUnloaded` before it is destroyed.
//!
//! All operations take one mutex for their whole duration, generator and
//! event callbacks included.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec3;

use crate::core::{Error, Result};
use crate::streaming::config::CacheConfig;
use crate::streaming::events::{ChunkEvent, EventPort};
use crate::streaming::planner::{RecenterPlan, RecenterPlanner};
use crate::terrain::generator::Generator;
use crate::world::chunk::Chunk;
use crate::world::coord::ChunkCoordinate;

/// Upper bound on map slots reserved up front
const MAX_PREALLOCATED: usize = 4096;

/// Residency of a single coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    Unloaded,
    Cold,
    Hot,
}

/// Resident chunk counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hot: usize,
    pub cold: usize,
}

impl CacheStats {
    pub fn resident(&self) -> usize {
        self.hot + self.cold
    }
}

/// Report cache corruption and abort the current operation.
#[cold]
fn invariant_violation(message: String) -> ! {
    log::error!("Chunk cache invariant violated: {}", message);
    panic!("chunk cache invariant violated: {message}");
}

/// State guarded by the cache mutex. Each map owns its chunks outright;
/// moving between tiers is a remove followed by an insert.
struct Tiers {
    hot: HashMap<ChunkCoordinate, Chunk>,
    cold: HashMap<ChunkCoordinate, Chunk>,
    center: Option<ChunkCoordinate>,
}

impl Tiers {
    fn tier(&self, coord: ChunkCoordinate) -> Tier {
        match (self.hot.contains_key(&coord), self.cold.contains_key(&coord)) {
            (false, false) => Tier::Unloaded,
            (false, true) => Tier::Cold,
            (true, false) => Tier::Hot,
            (true, true) => invariant_violation(format!("{coord} is both hot and cold")),
        }
    }

    fn lookup(&self, coord: ChunkCoordinate) -> Option<&Chunk> {
        self.hot.get(&coord).or_else(|| self.cold.get(&coord))
    }

    /// Unloaded -> Cold. Returns whether a chunk was generated.
    fn cold_load(&mut self, coord: ChunkCoordinate, generator: &dyn Generator) -> Result<bool> {
        if self.tier(coord) != Tier::Unloaded {
            return Ok(false);
        }

        let mut chunk = Chunk::new(coord);
        generator.populate(coord, chunk.tiles_mut())?;
        chunk.mark_generated();

        self.cold.insert(coord, chunk);
        log::trace!("Cold loaded chunk {}", coord);
        Ok(true)
    }

    /// Unloaded/Cold -> Hot, firing `ChunkLoaded`.
    fn hot_load(
        &mut self,
        coord: ChunkCoordinate,
        generator: &dyn Generator,
        events: &dyn EventPort,
    ) -> Result<bool> {
        if self.tier(coord) == Tier::Hot {
            return Ok(false);
        }
        self.cold_load(coord, generator)?;

        let chunk = self
            .cold
            .remove(&coord)
            .unwrap_or_else(|| {
                invariant_violation(format!("{coord} missing from cold tier during promotion"))
            });
        self.hot.insert(coord, chunk);
        log::trace!("Promoted chunk {} to hot", coord);

        events.notify(&ChunkEvent::Loaded { coord });
        Ok(true)
    }

    /// Hot -> Cold, firing `ChunkUnloaded`.
    fn cold_unload(&mut self, coord: ChunkCoordinate, events: &dyn EventPort) -> bool {
        let Some(chunk) = self.hot.remove(&coord) else {
            return false;
        };
        let snapshot = Box::new(chunk.clone());
        if self.cold.insert(coord, chunk).is_some() {
            invariant_violation(format!("{coord} was resident in both tiers"));
        }
        log::trace!("Demoted chunk {} to cold", coord);

        events.notify(&ChunkEvent::Unloaded { coord, snapshot });
        true
    }

    /// Any -> Unloaded, demoting first so hot chunks still announce their unload.
    fn full_unload(&mut self, coord: ChunkCoordinate, events: &dyn EventPort) -> bool {
        if self.tier(coord) == Tier::Unloaded {
            return false;
        }
        self.cold_unload(coord, events);

        match self.cold.remove(&coord) {
            Some(chunk) => {
                log::trace!("Evicted chunk {}", chunk.coord());
                true
            }
            None => invariant_violation(format!("{coord} missing from cold tier during eviction")),
        }
    }

    fn sorted(map: &HashMap<ChunkCoordinate, Chunk>) -> Vec<ChunkCoordinate> {
        let mut coords: Vec<_> = map.keys().copied().collect();
        coords.sort_unstable();
        coords
    }
}

/// Borrow of a resident chunk.
///
/// Holds the cache lock until dropped: drop it before calling into the cache
/// again from the same thread.
pub struct ChunkRef<'a> {
    tiers: MutexGuard<'a, Tiers>,
    coord: ChunkCoordinate,
}

impl ChunkRef<'_> {
    /// Tier the chunk was found in
    pub fn tier(&self) -> Tier {
        self.tiers.tier(self.coord)
    }
}

impl Deref for ChunkRef<'_> {
    type Target = Chunk;

    fn deref(&self) -> &Chunk {
        self.tiers.lookup(self.coord).unwrap_or_else(|| {
            invariant_violation(format!("{} vanished while borrowed", self.coord))
        })
    }
}

/// Thread-safe hot/cold chunk cache.
pub struct TieredChunkCache {
    config: CacheConfig,
    planner: RecenterPlanner,
    generator: Box<dyn Generator>,
    events: Arc<dyn EventPort>,
    tiers: Mutex<Tiers>,
}

impl TieredChunkCache {
    /// Create an empty cache with no center.
    ///
    /// Fails if `config.cold_radius < config.hot_radius`.
    pub fn new(
        config: CacheConfig,
        generator: impl Generator + 'static,
        events: Arc<dyn EventPort>,
    ) -> Result<Self> {
        config.validate()?;
        let capacity = config.resident_capacity().min(MAX_PREALLOCATED);

        Ok(Self {
            config,
            planner: RecenterPlanner::new(config.hot_radius, config.cold_radius),
            generator: Box::new(generator),
            events,
            tiers: Mutex::new(Tiers {
                hot: HashMap::with_capacity(capacity),
                cold: HashMap::with_capacity(capacity),
                center: None,
            }),
        })
    }

    /// Create a cache and fill both windows around `center`.
    pub fn with_center(
        config: CacheConfig,
        generator: impl Generator + 'static,
        events: Arc<dyn EventPort>,
        center: ChunkCoordinate,
    ) -> Result<Self> {
        let cache = Self::new(config, generator, events)?;
        cache.recenter(center)?;
        Ok(cache)
    }

    // Both maps are consistent whenever a callback runs, so a lock poisoned
    // by a panicking generator or handler is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Tiers> {
        self.tiers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Current reference coordinate, `None` before the first recenter
    pub fn center(&self) -> Option<ChunkCoordinate> {
        self.lock().center
    }

    // --- Queries ---

    /// Chunk at `coord`, hot-loading it on demand when it is not resident.
    ///
    /// A cold chunk is returned as-is without promotion.
    pub fn get(&self, coord: ChunkCoordinate) -> Result<ChunkRef<'_>> {
        let mut tiers = self.lock();
        if tiers.tier(coord) == Tier::Unloaded {
            tiers.hot_load(coord, self.generator.as_ref(), self.events.as_ref())?;
        }
        Ok(ChunkRef { tiers, coord })
    }

    /// Run `f` against the chunk at `coord`, loading it like [`get`](Self::get).
    ///
    /// `f` runs under the cache lock and must not call back into the cache.
    pub fn with_chunk<R>(&self, coord: ChunkCoordinate, f: impl FnOnce(&Chunk) -> R) -> Result<R> {
        let chunk = self.get(coord)?;
        Ok(f(&chunk))
    }

    /// Copy of a resident chunk; never loads.
    pub fn snapshot(&self, coord: ChunkCoordinate) -> Option<Chunk> {
        self.lock().lookup(coord).cloned()
    }

    pub fn is_hot(&self, coord: ChunkCoordinate) -> bool {
        self.lock().hot.contains_key(&coord)
    }

    pub fn is_cold(&self, coord: ChunkCoordinate) -> bool {
        self.lock().cold.contains_key(&coord)
    }

    pub fn tier(&self, coord: ChunkCoordinate) -> Tier {
        self.lock().tier(coord)
    }

    /// Hot coordinates in ascending order
    pub fn hot_coords(&self) -> Vec<ChunkCoordinate> {
        Tiers::sorted(&self.lock().hot)
    }

    /// Cold coordinates in ascending order
    pub fn cold_coords(&self) -> Vec<ChunkCoordinate> {
        Tiers::sorted(&self.lock().cold)
    }

    pub fn stats(&self) -> CacheStats {
        let tiers = self.lock();
        CacheStats {
            hot: tiers.hot.len(),
            cold: tiers.cold.len(),
        }
    }

    // --- Tier transitions ---

    /// Generate `coord` into the cold tier. No-op if already resident.
    pub fn cold_load(&self, coord: ChunkCoordinate) -> Result<()> {
        self.lock().cold_load(coord, self.generator.as_ref())?;
        Ok(())
    }

    /// Make `coord` hot, generating it first if needed. No-op if already hot.
    pub fn hot_load(&self, coord: ChunkCoordinate) -> Result<()> {
        self.lock()
            .hot_load(coord, self.generator.as_ref(), self.events.as_ref())?;
        Ok(())
    }

    /// Demote `coord` from hot to cold. No-op unless hot.
    pub fn cold_unload(&self, coord: ChunkCoordinate) {
        self.lock().cold_unload(coord, self.events.as_ref());
    }

    /// Drop `coord` entirely, demoting it first if hot. No-op if unloaded.
    pub fn full_unload(&self, coord: ChunkCoordinate) {
        self.lock().full_unload(coord, self.events.as_ref());
    }

    // --- Window movement ---

    /// Move both windows to `new_center` and migrate chunks accordingly.
    ///
    /// Returns the plan that was applied. Moving to the current center is a
    /// no-op with an empty plan. Chunks loaded ad hoc outside the previous
    /// windows are demoted or evicted as part of the move and show up in the
    /// plan's unload sets, and window coordinates missing from their tier are
    /// reloaded as part of the load sets.
    ///
    /// If the generator fails for some coordinates the rest of the plan is
    /// still applied and the center still moves; the failed coordinates stay
    /// unloaded and are reported through [`Error::IncompleteRecenter`].
    pub fn recenter(&self, new_center: ChunkCoordinate) -> Result<RecenterPlan> {
        let mut tiers = self.lock();
        self.recenter_locked(&mut tiers, new_center)
    }

    /// Recenter on the chunk containing `pos` if it differs from the current center.
    ///
    /// Returns `None` while the reference point stays inside the same chunk.
    pub fn track(&self, pos: Vec3) -> Result<Option<RecenterPlan>> {
        let target = ChunkCoordinate::from_world_pos(pos);
        let mut tiers = self.lock();
        if tiers.center == Some(target) {
            return Ok(None);
        }
        self.recenter_locked(&mut tiers, target).map(Some)
    }

    fn recenter_locked(
        &self,
        tiers: &mut Tiers,
        new_center: ChunkCoordinate,
    ) -> Result<RecenterPlan> {
        if tiers.center == Some(new_center) {
            return Ok(RecenterPlan::default());
        }

        let mut plan = self.planner.plan(tiers.center, new_center);

        let new_hot = self.planner.hot_window(new_center);
        let new_cold = self.planner.cold_window(new_center);
        let demote: Vec<_> = tiers
            .hot
            .keys()
            .copied()
            .filter(|c| !new_hot.contains(*c) && new_cold.contains(*c))
            .collect();
        let evict: Vec<_> = tiers
            .hot
            .keys()
            .chain(tiers.cold.keys())
            .copied()
            .filter(|c| !new_cold.contains(*c))
            .collect();
        plan.absorb_strays(demote, evict);

        // Window coordinates left behind by a failed generation or a manual unload
        let promote: Vec<_> = new_hot.iter().filter(|c| !tiers.hot.contains_key(c)).collect();
        let fill: Vec<_> = new_cold
            .iter()
            .filter(|c| !new_hot.contains(*c) && tiers.lookup(*c).is_none())
            .collect();
        plan.absorb_holes(promote, fill);

        let generator = self.generator.as_ref();
        let events = self.events.as_ref();
        let mut failed = Vec::new();

        for &coord in &plan.full_load {
            if let Err(e) = tiers.hot_load(coord, generator, events) {
                log::warn!("Hot load of {} failed: {}", coord, e);
                failed.push(coord);
            }
        }
        for &coord in &plan.partial_load {
            if let Err(e) = tiers.cold_load(coord, generator) {
                log::warn!("Cold load of {} failed: {}", coord, e);
                failed.push(coord);
            }
        }
        for &coord in &plan.partial_unload {
            tiers.cold_unload(coord, events);
        }
        for &coord in &plan.full_unload {
            tiers.full_unload(coord, events);
        }

        let old_center = tiers.center.replace(new_center);
        log::debug!(
            "Recentered {:?} -> {}: +hot {}, +cold {}, hot->cold {}, evicted {} (hot {}, cold {})",
            old_center,
            new_center,
            plan.full_load.len(),
            plan.partial_load.len(),
            plan.partial_unload.len(),
            plan.full_unload.len(),
            tiers.hot.len(),
            tiers.cold.len(),
        );

        if failed.is_empty() {
            Ok(plan)
        } else {
            Err(Error::IncompleteRecenter { failed })
        }
    }

    /// Check the tier invariants, reporting the first violation found.
    ///
    /// Checks that no coordinate is in both tiers, that every chunk is
    /// generated and stored under its own coordinate, and, once a center is
    /// set, that the hot window is fully hot and the cold band fully resident.
    pub fn verify_invariants(&self) -> Result<()> {
        let tiers = self.lock();

        for (tier, map) in [("hot", &tiers.hot), ("cold", &tiers.cold)] {
            for (coord, chunk) in map {
                if chunk.coord() != *coord {
                    return Err(Error::InvariantViolation(format!(
                        "{tier} chunk stored under {coord} reports {}",
                        chunk.coord()
                    )));
                }
                if !chunk.is_generated() {
                    return Err(Error::InvariantViolation(format!(
                        "{tier} chunk {coord} was never generated"
                    )));
                }
            }
        }
        if let Some(coord) = tiers.hot.keys().find(|c| tiers.cold.contains_key(*c)) {
            return Err(Error::InvariantViolation(format!("{coord} is both hot and cold")));
        }

        if let Some(center) = tiers.center {
            if let Some(coord) = self
                .planner
                .hot_window(center)
                .iter()
                .find(|c| !tiers.hot.contains_key(c))
            {
                return Err(Error::InvariantViolation(format!(
                    "{coord} inside hot window is not hot"
                )));
            }
            if let Some(coord) = self
                .planner
                .cold_window(center)
                .iter()
                .find(|c| tiers.lookup(*c).is_none())
            {
                return Err(Error::InvariantViolation(format!(
                    "{coord} inside cold window is not resident"
                )));
            }
        }
        Ok(())
    }
}
