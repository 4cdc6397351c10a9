//! Externally-synchronized handle for hosts that drive one map from several
//! threads.
//!
//! Every operation takes the same lock. A reader/writer split would not be
//! sound here: `get` walks bucket links that `prune` rewrites.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::map::TtlMap;
use crate::metrics::stats::Metrics;
use crate::Tick;

/// A cloneable, thread-safe handle around a [`TtlMap`].
///
/// # Example
/// ```
/// use tickmap::TtlMapBuilder;
///
/// let map: tickmap::SharedTtlMap<u64> = TtlMapBuilder::new(16).build_shared();
/// let writer = map.clone();
/// std::thread::spawn(move || writer.set("k", 7, 3).unwrap())
///     .join()
///     .unwrap();
/// assert_eq!(map.get("k"), Some(7));
/// ```
pub struct SharedTtlMap<V> {
    inner: Arc<Mutex<TtlMap<V>>>,
}

impl<V> Clone for SharedTtlMap<V> {
    fn clone(&self) -> Self {
        SharedTtlMap {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> SharedTtlMap<V> {
    pub fn new(map: TtlMap<V>) -> Self {
        SharedTtlMap {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    pub fn set(&self, key: impl AsRef<[u8]>, value: V, ttl: Tick) -> Result<()> {
        self.inner.lock().set(key, value, ttl)
    }

    /// Returns a clone of the value stored under `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Runs `f` on the value stored under `key` while holding the lock.
    pub fn with<R>(&self, key: impl AsRef<[u8]>, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.lock().get(key).map(f)
    }

    pub fn prune(&self, ticks: Tick) -> Vec<V> {
        self.inner.lock().prune(ticks)
    }

    pub fn remove(&self, key: impl AsRef<[u8]>) -> Result<V> {
        self.inner.lock().remove(key)
    }

    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn current_tick(&self) -> Tick {
        self.inner.lock().current_tick()
    }

    pub fn stats(&self) -> Metrics {
        self.inner.lock().stats()
    }
}

impl<V> fmt::Debug for SharedTtlMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedTtlMap").field(&*self.inner.lock()).finish()
    }
}
