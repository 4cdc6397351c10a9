//! Key hasher — selects the hash bucket for a byte key.
//!
//! The map only needs the hash to be deterministic for the lifetime of one
//! map instance and reasonably well distributed. Collisions are resolved by
//! the bucket's linear search, so any function works; a poor one only costs
//! lookup time.
//!
//! # Example
//! ```
//! use tickmap::TtlMapBuilder;
//!
//! // Bucket by key length only (terrible distribution, still correct).
//! let mut map: tickmap::TtlMap<u32> = TtlMapBuilder::new(8)
//!     .hasher(|key: &[u8]| key.len() as u64)
//!     .build();
//! map.set("ab", 1, 3).unwrap();
//! map.set("cd", 2, 3).unwrap();
//! assert_eq!(map.get("cd"), Some(&2));
//! ```

use std::fmt;

use ahash::RandomState;

/// Maps a byte key to a 64-bit bucket selector.
pub trait KeyHasher: Send + 'static {
    fn hash(&self, key: &[u8]) -> u64;
}

// ---------------------------------------------------------------------------
// Built-in implementations
// ---------------------------------------------------------------------------

const FNV_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// 64-bit FNV-1a. This is the default hasher.
///
/// See <http://isthe.com/chongo/tech/comp/fnv/>.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv64;

impl KeyHasher for Fnv64 {
    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        key.iter().fold(FNV_BASIS, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
    }
}

/// Seeded hashing through `ahash`.
///
/// Each instance draws its own random seed, so bucket placement differs
/// between maps but stays fixed within one.
#[derive(Clone, Default)]
pub struct RandomStateHasher(RandomState);

impl RandomStateHasher {
    pub fn new() -> Self {
        RandomStateHasher(RandomState::new())
    }

    /// Uses a caller-provided state, e.g. one built from fixed seeds.
    pub fn with_state(state: RandomState) -> Self {
        RandomStateHasher(state)
    }
}

impl fmt::Debug for RandomStateHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomStateHasher").finish_non_exhaustive()
    }
}

impl KeyHasher for RandomStateHasher {
    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        self.0.hash_one(key)
    }
}

/// A hasher backed by a closure.
///
/// Created via [`TtlMapBuilder::hasher`](crate::TtlMapBuilder::hasher).
pub struct FnHasher<F>(pub F);

impl<F> KeyHasher for FnHasher<F>
where
    F: Fn(&[u8]) -> u64 + Send + 'static,
{
    #[inline]
    fn hash(&self, key: &[u8]) -> u64 {
        (self.0)(key)
    }
}
