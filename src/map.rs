use std::fmt;

use ahash::AHashMap;
use tracing::{debug, trace};

use crate::builder::TtlMapBuilder;
use crate::error::{Result, TtlMapError};
use crate::expiry::ring::Ring;
use crate::hasher::KeyHasher;
use crate::listener::{ExpiryCause, ExpiryListener};
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::store::arena::Arena;
use crate::store::bucket::Bucket;
use crate::Tick;

/// A tick-driven TTL map.
///
/// Keys are byte strings, values are opaque. Every entry is scheduled on a
/// ring of `max_tick + 1` time frames when it is inserted and handed back by
/// the [`prune`](TtlMap::prune) call that advances past its tick.
///
/// The map is single-threaded; wrap it in a [`SharedTtlMap`] (or your own
/// mutex) to drive it from several threads.
///
/// # Example
/// ```
/// let mut map = tickmap::TtlMap::new(10);
/// map.set("k1", "hoge", 5).unwrap();
/// assert_eq!(map.get("k1"), Some(&"hoge"));
///
/// assert!(map.prune(5).is_empty());
/// assert_eq!(map.prune(1), vec!["hoge"]);
/// assert_eq!(map.get("k1"), None);
/// ```
///
/// [`SharedTtlMap`]: crate::SharedTtlMap
pub struct TtlMap<V> {
    /// Hash value → collision list. Buckets are never dropped once created.
    table: AHashMap<u64, Bucket>,
    ring: Ring,
    arena: Arena<V>,
    /// Oldest tick not yet pruned. Saturates; only reported, never used for
    /// frame arithmetic.
    current: Tick,
    /// Frame of the oldest tick not yet pruned.
    cursor: usize,
    hasher: Box<dyn KeyHasher>,
    listener: Option<Box<dyn ExpiryListener<V>>>,
    stats: StatsCounter,
    /// Reused between prunes to collect purged node indices.
    scratch: Vec<usize>,
}

impl<V: 'static> TtlMap<V> {
    /// Creates a map accepting TTLs in `0..=max_tick`.
    ///
    /// # Panics
    /// If `max_tick` is 0.
    pub fn new(max_tick: Tick) -> Self {
        TtlMapBuilder::new(max_tick).build()
    }

    /// Returns a [`TtlMapBuilder`] for configuring a new map.
    pub fn builder(max_tick: Tick) -> TtlMapBuilder<V> {
        TtlMapBuilder::new(max_tick)
    }
}

impl<V> TtlMap<V> {
    pub(crate) fn from_parts(
        ring_len: usize,
        initial_capacity: usize,
        hasher: Box<dyn KeyHasher>,
        listener: Option<Box<dyn ExpiryListener<V>>>,
    ) -> Self {
        let mut arena = Arena::with_capacity(ring_len + initial_capacity);
        let ring = Ring::new(&mut arena, ring_len);
        TtlMap {
            table: AHashMap::with_capacity(initial_capacity),
            ring,
            arena,
            current: 0,
            cursor: 0,
            hasher,
            listener,
            stats: StatsCounter::new(),
            scratch: Vec::new(),
        }
    }

    /// Arena index of the live element stored under `key`.
    fn find(&self, key: &[u8]) -> Option<usize> {
        let hv = self.hasher.hash(key);
        self.table.get(&hv)?.search(&self.arena, key)
    }

    fn notify(&self, key: &[u8], value: &V, cause: ExpiryCause) {
        if let Some(listener) = &self.listener {
            listener.on_expire(key, value, cause);
        }
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    /// Stores `value` under `key`, expiring `ttl` ticks after the current
    /// tick.
    ///
    /// Fails with [`TtlMapError::TtlOutOfRange`] if `ttl > max_tick` and with
    /// [`TtlMapError::DuplicateKey`] if the key is already present. On error
    /// the map is unchanged and `value` is dropped.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: V, ttl: Tick) -> Result<()> {
        let key = key.as_ref();
        let max = self.ring.len() as Tick;
        if ttl >= max {
            trace!(ttl, max, "rejected set: ttl out of range");
            return Err(TtlMapError::TtlOutOfRange { ttl, max });
        }

        let hv = self.hasher.hash(key);
        let arena = &mut self.arena;
        let bucket = *self.table.entry(hv).or_insert_with(|| Bucket::new(arena));

        if bucket.search(&self.arena, key).is_some() {
            trace!(hash = hv, "rejected set: duplicate key");
            return Err(TtlMapError::DuplicateKey { key: key.to_vec() });
        }

        let idx = self.arena.alloc(key.into(), value, ttl);
        bucket.insert(&mut self.arena, idx);
        let slot = self.ring.advance(self.cursor, ttl);
        self.ring.insert(&mut self.arena, slot, idx);

        self.stats.record_insert();
        Ok(())
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        let Some(idx) = self.find(key.as_ref()) else {
            self.stats.record_miss();
            return None;
        };
        self.stats.record_hit();
        self.arena.node(idx).value.as_ref()
    }

    /// Advances the current tick by `ticks` and returns the values of every
    /// entry scheduled in the ticks passed over, oldest tick first.
    ///
    /// `prune(0)` does nothing.
    pub fn prune(&mut self, ticks: Tick) -> Vec<V> {
        if ticks == 0 {
            return Vec::new();
        }

        // Frames are empty after one revolution, so never walk more than that.
        let walk = ticks.min(self.ring.len() as Tick);
        let mut purged = std::mem::take(&mut self.scratch);
        for offset in 0..walk {
            let slot = self.ring.advance(self.cursor, offset);
            self.ring.purge(&mut self.arena, slot, &mut purged);
        }

        // Release everything before the listener runs, so a panicking
        // listener cannot leave purged nodes behind.
        let mut expired = Vec::with_capacity(purged.len());
        for idx in purged.drain(..) {
            let Some(entry) = self.arena.release(idx) else {
                unreachable!("purged node {idx} holds no entry");
            };
            expired.push(entry);
        }
        self.scratch = purged;

        let from = self.current;
        self.current = self.current.saturating_add(ticks);
        self.cursor = self.ring.advance(self.cursor, ticks);
        if !expired.is_empty() {
            self.stats.record_expirations(expired.len() as u64);
            debug!(
                expired = expired.len(),
                from,
                to = self.current,
                remaining = self.arena.live(),
                "pruned expired entries"
            );
        }

        let mut values = Vec::with_capacity(expired.len());
        for (key, value) in expired {
            self.notify(&key, &value, ExpiryCause::Expired);
            values.push(value);
        }
        values
    }

    /// Takes the entry stored under `key` out of the map before its tick.
    ///
    /// Fails with [`TtlMapError::NotFound`] if no entry matches.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Result<V> {
        let key = key.as_ref();
        let not_found = || TtlMapError::NotFound { key: key.to_vec() };
        let idx = self.find(key).ok_or_else(not_found)?;

        self.arena.detach_from_bucket(idx);
        let unscheduled = self.ring.unlink(&mut self.arena, idx);
        debug_assert!(unscheduled, "live node {idx} missing from its frame");

        let (key, value) = self.arena.release(idx).ok_or_else(not_found)?;
        trace!(remaining = self.arena.live(), "removed entry");
        self.notify(&key, &value, ExpiryCause::Removed);
        self.stats.record_removal();
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.find(key.as_ref()).is_some()
    }

    /// TTL the entry under `key` was inserted with.
    pub fn ttl_of(&self, key: impl AsRef<[u8]>) -> Option<Tick> {
        self.find(key.as_ref()).map(|idx| self.arena.node(idx).ttl)
    }

    /// Absolute tick whose pruning hands back the entry under `key`.
    ///
    /// The entry is visible until a `prune` advances the current tick past
    /// this value.
    pub fn expires_at(&self, key: impl AsRef<[u8]>) -> Option<Tick> {
        let idx = self.find(key.as_ref())?;
        let len = self.ring.len();
        let frame = self.arena.node(idx).frame;
        let ahead = (frame + len - self.cursor) % len;
        Some(self.current.saturating_add(ahead as Tick))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.arena.live()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.live() == 0
    }

    /// Oldest tick not yet pruned.
    pub fn current_tick(&self) -> Tick {
        self.current
    }

    /// Largest accepted TTL.
    pub fn max_tick(&self) -> Tick {
        self.ring.len() as Tick - 1
    }

    /// Number of time frames in the ring (`max_tick + 1`).
    pub fn ring_len(&self) -> usize {
        self.ring.len()
    }

    pub fn stats(&self) -> Metrics {
        self.stats.snapshot()
    }
}

impl<V> fmt::Debug for TtlMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlMap")
            .field("len", &self.arena.live())
            .field("buckets", &self.table.len())
            .field("ring_len", &self.ring.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
