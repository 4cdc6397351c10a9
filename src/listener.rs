//! Expiry listener — a callback invoked whenever an entry leaves the map.
//!
//! # Example
//! ```
//! use std::sync::{Arc, Mutex};
//! use tickmap::listener::ExpiryCause;
//! use tickmap::TtlMapBuilder;
//!
//! let log: Arc<Mutex<Vec<(Vec<u8>, ExpiryCause)>>> = Arc::new(Mutex::new(Vec::new()));
//! let log2 = Arc::clone(&log);
//!
//! let mut map: tickmap::TtlMap<u64> = TtlMapBuilder::new(4)
//!     .expiry_listener(move |key: &[u8], _val: &u64, cause| {
//!         log2.lock().unwrap().push((key.to_vec(), cause));
//!     })
//!     .build();
//!
//! map.set("a", 1, 0).unwrap();
//! map.set("b", 2, 3).unwrap();
//! map.prune(1); // "a" expires
//! map.remove("b").unwrap(); // explicit removal
//! assert_eq!(log.lock().unwrap().len(), 2);
//! ```

/// The reason an entry left the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryCause {
    /// Its scheduled tick was pruned.
    Expired,
    /// Removed explicitly via [`TtlMap::remove`](crate::TtlMap::remove).
    Removed,
}

/// A callback invoked each time an entry expires or is removed.
///
/// The callback runs synchronously inside [`TtlMap::prune`] or
/// [`TtlMap::remove`], before the value is handed back to the caller. It
/// cannot reach the map itself; with a [`SharedTtlMap`] it runs under the
/// map's lock, so **do not call back into the shared handle** from it.
///
/// [`TtlMap::prune`]: crate::TtlMap::prune
/// [`TtlMap::remove`]: crate::TtlMap::remove
/// [`SharedTtlMap`]: crate::SharedTtlMap
pub trait ExpiryListener<V>: Send {
    fn on_expire(&self, key: &[u8], value: &V, cause: ExpiryCause);
}

/// An [`ExpiryListener`] backed by a closure.
///
/// Created via [`TtlMapBuilder::expiry_listener`](crate::TtlMapBuilder::expiry_listener).
pub struct FnListener<F>(pub F);

impl<V, F> ExpiryListener<V> for FnListener<F>
where
    F: Fn(&[u8], &V, ExpiryCause) + Send + 'static,
{
    fn on_expire(&self, key: &[u8], value: &V, cause: ExpiryCause) {
        (self.0)(key, value, cause)
    }
}
