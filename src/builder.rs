use crate::hasher::{FnHasher, Fnv64, KeyHasher};
use crate::listener::{ExpiryCause, ExpiryListener, FnListener};
use crate::map::TtlMap;
use crate::shared::SharedTtlMap;
use crate::Tick;

/// Builder for configuring and constructing a [`TtlMap`].
///
/// # Example
/// ```
/// use tickmap::TtlMapBuilder;
///
/// let mut map: tickmap::TtlMap<String> = TtlMapBuilder::new(60)
///     .initial_capacity(1_024)
///     .build();
/// map.set("session", "alice".to_string(), 30).unwrap();
/// ```
pub struct TtlMapBuilder<V> {
    max_tick: Tick,
    initial_capacity: usize,
    hasher: Box<dyn KeyHasher>,
    listener: Option<Box<dyn ExpiryListener<V>>>,
}

impl<V: 'static> TtlMapBuilder<V> {
    /// Starts a builder for a map accepting TTLs in `0..=max_tick`.
    pub fn new(max_tick: Tick) -> Self {
        assert!(max_tick > 0, "max_tick must be greater than 0");
        assert!(
            max_tick < usize::MAX as Tick,
            "max_tick must leave room for max_tick + 1 ring frames"
        );
        TtlMapBuilder {
            max_tick,
            initial_capacity: 0,
            hasher: Box::new(Fnv64),
            listener: None,
        }
    }

    /// Pre-size the element arena and hash table for `n` entries.
    pub fn initial_capacity(mut self, n: usize) -> Self {
        self.initial_capacity = n;
        self
    }

    /// Set a custom key hasher via closure (default: FNV-1a 64).
    pub fn hasher<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> u64 + Send + 'static,
    {
        self.hasher = Box::new(FnHasher(f));
        self
    }

    /// Set a key hasher using any type that implements [`KeyHasher`].
    pub fn hasher_impl<H: KeyHasher>(mut self, h: H) -> Self {
        self.hasher = Box::new(h);
        self
    }

    /// Register an expiry listener closure.
    ///
    /// The closure is called synchronously for every entry that expires in
    /// [`TtlMap::prune`] or is taken out by [`TtlMap::remove`].
    pub fn expiry_listener<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], &V, ExpiryCause) + Send + 'static,
    {
        self.listener = Some(Box::new(FnListener(f)));
        self
    }

    /// Register an expiry listener via the [`ExpiryListener`] trait.
    pub fn expiry_listener_impl<L: ExpiryListener<V> + 'static>(mut self, l: L) -> Self {
        self.listener = Some(Box::new(l));
        self
    }

    pub fn build(self) -> TtlMap<V> {
        // `new` asserted max_tick fits, so the addition cannot overflow.
        TtlMap::from_parts(
            self.max_tick as usize + 1,
            self.initial_capacity,
            self.hasher,
            self.listener,
        )
    }

    /// Builds the map behind a mutex for use from several threads.
    pub fn build_shared(self) -> SharedTtlMap<V> {
        SharedTtlMap::new(self.build())
    }
}
