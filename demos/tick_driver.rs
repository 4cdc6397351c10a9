//! Host loop driving a `TtlMap` from a wall clock.
//!
//! A tick lasts `TICK`. Each round the driver works out how many ticks
//! elapsed since the last prune, advances the map by exactly that many, and
//! then inserts a batch of sessions with pseudo-random TTLs.
//!
//! Run with:
//!     RUST_LOG=tickmap=debug cargo run --example tick_driver

use std::time::{Duration, Instant};

use tickmap::listener::ExpiryCause;
use tickmap::{TtlMapBuilder, TtlMapError};
use tracing_subscriber::EnvFilter;

/// Wall-clock length of one tick.
const TICK: Duration = Duration::from_millis(10);
/// Largest TTL, in ticks.
const MAX_TICK: u64 = 50;
/// Sessions inserted per round.
const BATCH: u64 = 40;
/// Number of rounds to run.
const ROUNDS: u64 = 120;

struct Xorshift64(u64);

impl Xorshift64 {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut map = TtlMapBuilder::new(MAX_TICK)
        .expiry_listener(|key: &[u8], _session: &u64, cause| {
            if cause == ExpiryCause::Removed {
                tracing::info!(key = %String::from_utf8_lossy(key), "session logged out");
            }
        })
        .build();

    let mut rng = Xorshift64(0xDEAD_BEEF_1234_5678);
    let start = Instant::now();
    let mut next_id = 0u64;
    let mut expired_total = 0usize;

    for _ in 0..ROUNDS {
        std::thread::sleep(TICK / 2);

        // Never skip a tick: advance by everything that elapsed.
        let now = (start.elapsed().as_nanos() / TICK.as_nanos()) as u64;
        let elapsed = now - map.current_tick();
        expired_total += map.prune(elapsed).len();

        for _ in 0..BATCH {
            let ttl = rng.next() % (MAX_TICK + 1);
            let key = format!("session-{next_id}");
            match map.set(&key, next_id, ttl) {
                Ok(()) => {}
                Err(TtlMapError::DuplicateKey { .. }) => unreachable!("ids are unique"),
                Err(err) => panic!("{err}"),
            }
            next_id += 1;
        }

        // Occasionally log a random session out early.
        let victim = format!("session-{}", rng.next() % next_id);
        let _ = map.remove(&victim);
    }

    let stats = map.stats();
    println!("tick          : {}", map.current_tick());
    println!("live sessions : {}", map.len());
    println!("inserted      : {}", stats.inserts);
    println!("expired       : {expired_total}");
    println!("logged out    : {}", stats.removals);
    assert_eq!(
        stats.inserts as usize,
        map.len() + expired_total + stats.removals as usize
    );
}
