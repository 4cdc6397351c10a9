use std::cell::Cell;

/// Counters updated on every map operation.
///
/// The map is single-threaded, so plain `Cell`s suffice; `get` takes `&self`
/// and still records hits and misses.
#[derive(Default)]
pub struct StatsCounter {
    hits: Cell<u64>,
    misses: Cell<u64>,
    inserts: Cell<u64>,
    expirations: Cell<u64>,
    removals: Cell<u64>,
}

#[inline]
fn bump(cell: &Cell<u64>, count: u64) {
    cell.set(cell.get() + count);
}

impl StatsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        bump(&self.hits, 1);
    }

    #[inline]
    pub fn record_miss(&self) {
        bump(&self.misses, 1);
    }

    #[inline]
    pub fn record_insert(&self) {
        bump(&self.inserts, 1);
    }

    #[inline]
    pub fn record_expirations(&self, count: u64) {
        bump(&self.expirations, count);
    }

    #[inline]
    pub fn record_removal(&self) {
        bump(&self.removals, 1);
    }

    /// Returns a point-in-time snapshot of the statistics.
    pub fn snapshot(&self) -> Metrics {
        let hits = self.hits.get();
        let misses = self.misses.get();
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0_f64
        } else {
            hits as f64 / total as f64
        };
        Metrics {
            hits,
            misses,
            inserts: self.inserts.get(),
            expirations: self.expirations.get(),
            removals: self.removals.get(),
            hit_rate,
        }
    }
}

/// A point-in-time snapshot of map statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Number of `get` calls that found a value.
    pub hits: u64,
    /// Number of `get` calls that found nothing.
    pub misses: u64,
    /// Number of successful `set` calls.
    pub inserts: u64,
    /// Number of entries handed back by `prune`.
    pub expirations: u64,
    /// Number of entries taken out by `remove`.
    pub removals: u64,
    /// `hits / (hits + misses)`, or `0.0` if no lookups have been made.
    pub hit_rate: f64,
}

impl Metrics {
    pub fn request_count(&self) -> u64 {
        self.hits + self.misses
    }
}
