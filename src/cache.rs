//! # TTL Cache
//! Single-value cache with an injected clock and explicit invalidation.
//!
//! Owned by whoever needs it (the service keeps one for categories); there is
//! no process-wide state. Expiry is absolute from the moment of the last load,
//! reads do not extend it.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

/// Whether a read was served from the cache or had to call the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug)]
struct Slot<V> {
    value: V,
    loaded_at: DateTime<Utc>,
}

pub struct TtlCache<V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<Slot<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if present and younger than the TTL.
    pub fn get(&self) -> Option<V> {
        let now = self.clock.now();
        let guard = self.slot.read().ok()?;
        guard
            .as_ref()
            .filter(|s| now - s.loaded_at < self.ttl)
            .map(|s| s.value.clone())
    }

    pub fn put(&self, value: V) {
        let loaded_at = self.clock.now();
        match self.slot.write() {
            Ok(mut g) => *g = Some(Slot { value, loaded_at }),
            Err(poison) => *poison.into_inner() = Some(Slot { value, loaded_at }),
        }
    }

    /// Return the cached value or load, store and return a fresh one.
    /// A failing loader leaves the cache untouched.
    pub fn get_or_refresh<E, F>(&self, load: F) -> Result<(V, CacheStatus), E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(v) = self.get() {
            return Ok((v, CacheStatus::Hit));
        }
        let fresh = load()?;
        self.put(fresh.clone());
        Ok((fresh, CacheStatus::Miss))
    }

    pub fn invalidate(&self) {
        match self.slot.write() {
            Ok(mut g) => *g = None,
            Err(poison) => *poison.into_inner() = None,
        }
    }
}
