mod builder;
mod error;
mod expiry;
mod map;
mod shared;
mod store;
pub mod hasher;
pub mod listener;
mod metrics;

/// Discrete logical time unit. TTLs and the current time are both in ticks.
pub type Tick = u64;

pub use builder::TtlMapBuilder;
pub use error::{Result, TtlMapError};
pub use hasher::{Fnv64, KeyHasher, RandomStateHasher};
pub use map::TtlMap;
pub use metrics::stats::Metrics;
pub use shared::SharedTtlMap;
