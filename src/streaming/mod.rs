//! Windowed chunk streaming: planning, tiers and notifications

pub mod window;
pub mod planner;
pub mod events;
pub mod config;
pub mod cache;

pub use window::{RegionWindow, window};
pub use planner::{RecenterPlan, RecenterPlanner, plan_recenter};
pub use events::{
    ChunkEvent, EventBus, EventPort, NullEvents, QueuedEvents,
    CHUNK_LOADED, CHUNK_UNLOADED,
};
pub use config::CacheConfig;
pub use cache::{CacheStats, ChunkRef, Tier, TieredChunkCache};
