//! Load/unload notifications for dependent subsystems
//!
//! The cache announces every hot⇄cold transition through an [`EventPort`].
//! [`EventBus`] is the stock implementation: handlers are registered per
//! event-type name and run synchronously, or later through the queue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::world::chunk::Chunk;
use crate::world::coord::ChunkCoordinate;

/// Event-type name of [`ChunkEvent::Loaded`]
pub const CHUNK_LOADED: &str = "ChunkLoaded";
/// Event-type name of [`ChunkEvent::Unloaded`]
pub const CHUNK_UNLOADED: &str = "ChunkUnloaded";

/// Tier transition announced by the cache
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkEvent {
    /// Promoted cold -> hot; the chunk is now active
    Loaded { coord: ChunkCoordinate },
    /// Demoted hot -> cold, with the chunk as it was at demotion
    Unloaded { coord: ChunkCoordinate, snapshot: Box<Chunk> },
}

impl ChunkEvent {
    pub fn coord(&self) -> ChunkCoordinate {
        match self {
            ChunkEvent::Loaded { coord } | ChunkEvent::Unloaded { coord, .. } => *coord,
        }
    }

    /// Event-type name handlers are keyed by
    pub fn name(&self) -> &'static str {
        match self {
            ChunkEvent::Loaded { .. } => CHUNK_LOADED,
            ChunkEvent::Unloaded { .. } => CHUNK_UNLOADED,
        }
    }
}

/// Sink for tier transition events.
///
/// Called while the cache lock is held, so implementations must not call
/// back into the cache.
pub trait EventPort: Send + Sync {
    fn notify(&self, event: &ChunkEvent);
}

/// Discards every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEvents;

impl EventPort for NullEvents {
    fn notify(&self, _event: &ChunkEvent) {}
}

type Handler = Box<dyn Fn(&ChunkEvent) + Send + Sync>;

/// Handler registry keyed by event-type name
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<&'static str, Vec<Handler>>>,
    queued: Mutex<Vec<ChunkEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event-type name ([`CHUNK_LOADED`] or [`CHUNK_UNLOADED`]).
    pub fn register_handler<F>(&self, name: &'static str, handler: F)
    where
        F: Fn(&ChunkEvent) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name)
            .or_default()
            .push(Box::new(handler));
    }

    /// Number of handlers registered for `name`
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Deliver an event to its handlers now, in registration order.
    pub fn fire(&self, event: &ChunkEvent) {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = handlers.get(event.name()) else {
            log::trace!("No handlers for {}", event.name());
            return;
        };
        for handler in list {
            handler(event);
        }
    }

    /// Hold an event until the next [`dispatch_queued`](Self::dispatch_queued).
    pub fn queue(&self, event: ChunkEvent) {
        self.queued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn queued_len(&self) -> usize {
        self.queued.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Fire every queued event in arrival order. Returns how many were dispatched.
    pub fn dispatch_queued(&self) -> usize {
        let events =
            std::mem::take(&mut *self.queued.lock().unwrap_or_else(PoisonError::into_inner));
        for event in &events {
            self.fire(event);
        }
        events.len()
    }
}

impl EventPort for EventBus {
    fn notify(&self, event: &ChunkEvent) {
        self.fire(event);
    }
}

/// Defers delivery: events are queued on the bus instead of fired.
///
/// Lets handlers that need the cache run after the cache call returns.
pub struct QueuedEvents(pub Arc<EventBus>);

impl EventPort for QueuedEvents {
    fn notify(&self, event: &ChunkEvent) {
        self.0.queue(event.clone());
    }
}
