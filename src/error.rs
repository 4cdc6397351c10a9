use std::fmt;

use crate::Tick;

pub type Result<T, E = TtlMapError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TtlMapError {
    /// `ttl` does not fit in one revolution of the ring.
    #[error("ttl {ttl} is out of range, must be < {max}")]
    TtlOutOfRange { ttl: Tick, max: Tick },

    /// The key is already stored; the map never overwrites.
    #[error("key is duplicated: {}", HexKey(.key))]
    DuplicateKey { key: Vec<u8> },

    /// No live element matches the key.
    #[error("no such key: {}", HexKey(.key))]
    NotFound { key: Vec<u8> },
}

struct HexKey<'a>(&'a [u8]);

impl fmt::Display for HexKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
