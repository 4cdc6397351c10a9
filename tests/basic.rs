use assert_matches::assert_matches;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tickmap::listener::ExpiryCause;
use tickmap::{TtlMap, TtlMapBuilder, TtlMapError};

fn make_map(max_tick: u64) -> TtlMap<String> {
    TtlMapBuilder::new(max_tick).build()
}

// ---------------------------------------------------------------------------
// Fundamental API correctness
// ---------------------------------------------------------------------------

#[test]
fn get_returns_none_on_miss() {
    let map = make_map(10);
    assert_eq!(map.get("missing"), None);
}

#[test]
fn set_then_get_for_every_ttl() {
    let mut map = make_map(10);
    for ttl in 0..=10u64 {
        let key = format!("k{ttl}");
        map.set(&key, format!("v{ttl}"), ttl).unwrap();
        assert_eq!(map.get(&key), Some(&format!("v{ttl}")));
    }
    assert_eq!(map.len(), 11);
}

#[test]
fn set_never_overwrites() {
    let mut map = make_map(10);
    map.set("k", "v1".to_string(), 3).unwrap();
    assert_matches!(
        map.set("k", "v2".to_string(), 7),
        Err(TtlMapError::DuplicateKey { key }) if key == b"k"
    );
    assert_eq!(map.get("k").map(String::as_str), Some("v1"));
    assert_eq!(map.expires_at("k"), Some(3), "ttl must not change either");
}

#[test]
fn out_of_range_ttl_is_rejected_without_side_effects() {
    let mut map = make_map(10);
    for ttl in [11, 12, u64::MAX] {
        assert_matches!(
            map.set("k", "v".to_string(), ttl),
            Err(TtlMapError::TtlOutOfRange { ttl: t, max: 11 }) if t == ttl
        );
    }
    assert!(map.is_empty());
    assert!(!map.contains_key("k"));
    assert_eq!(map.stats().inserts, 0);
}

#[test]
fn binary_keys_are_compared_exactly() {
    let mut map: TtlMap<u8> = TtlMap::new(4);
    map.set([0u8, 1, 2], 1, 1).unwrap();
    map.set([0u8, 1], 2, 1).unwrap();
    map.set(Vec::<u8>::new(), 3, 1).unwrap();
    assert_eq!(map.get([0u8, 1, 2]), Some(&1));
    assert_eq!(map.get([0u8, 1]), Some(&2));
    assert_eq!(map.get(b""), Some(&3));
    assert_eq!(map.get([0u8]), None);
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn reference_scenario() {
    let mut map = make_map(10);
    map.set(b"k1", "hoge".to_string(), 5).unwrap();
    assert_eq!(map.get(b"k1").map(String::as_str), Some("hoge"));

    assert!(map.prune(5).is_empty());
    assert_eq!(map.get(b"k1").map(String::as_str), Some("hoge"));

    assert_eq!(map.prune(1), vec!["hoge".to_string()]);
    assert_eq!(map.get(b"k1"), None);
}

#[test]
fn value_is_returned_by_exactly_the_crossing_prune() {
    for ttl in 0..=7u64 {
        let mut map: TtlMap<u64> = TtlMap::new(7);
        map.set("k", ttl, ttl).unwrap();

        let mut seen = 0;
        for step in 0..=ttl + 2 {
            // Cumulative advance after this prune is `step + 1`.
            let out = map.prune(1);
            if step < ttl {
                assert!(out.is_empty(), "ttl {ttl}: expired early at step {step}");
                assert_eq!(map.get("k"), Some(&ttl));
            } else if step == ttl {
                assert_eq!(out, vec![ttl]);
                seen += 1;
            } else {
                assert!(out.is_empty());
            }
            if step >= ttl {
                assert_eq!(map.get("k"), None);
            }
        }
        assert_eq!(seen, 1);
    }
}

#[test]
fn bulk_expiry_returns_every_value_once() {
    let mut map: TtlMap<u32> = TtlMap::new(16);
    for i in 0..500u32 {
        map.set(i.to_be_bytes(), i, 9).unwrap();
    }

    assert!(map.prune(9).is_empty());
    let expired = map.prune(1);
    assert_eq!(expired.len(), 500);
    let unique: HashSet<u32> = expired.into_iter().collect();
    assert_eq!(unique, (0..500).collect());

    for i in 0..500u32 {
        assert_eq!(map.get(i.to_be_bytes()), None);
    }
    assert!(map.is_empty());
}

#[test]
fn prune_orders_values_by_tick() {
    let mut map: TtlMap<u64> = TtlMap::new(8);
    map.set("c", 3, 3).unwrap();
    map.set("a", 1, 1).unwrap();
    map.set("b", 2, 2).unwrap();
    map.set("z", 0, 0).unwrap();
    assert_eq!(map.prune(4), vec![0, 1, 2, 3]);
}

#[test]
fn prune_zero_is_a_no_op() {
    let mut map = make_map(4);
    map.set("k", "v".to_string(), 0).unwrap();
    assert!(map.prune(0).is_empty());
    assert_eq!(map.current_tick(), 0);
    assert!(map.contains_key("k"));
    assert_eq!(map.prune(1).len(), 1);
}

#[test]
fn ttl_is_relative_to_current_tick() {
    let mut map: TtlMap<&str> = TtlMap::new(5);
    map.prune(4);
    map.set("late", "x", 5).unwrap();
    assert_eq!(map.expires_at("late"), Some(9));
    assert!(map.prune(5).is_empty());
    assert_eq!(map.prune(1), vec!["x"]);
}

#[test]
fn huge_prune_does_not_break_later_ttls() {
    let mut map: TtlMap<u64> = TtlMap::new(10);
    map.prune(u64::MAX);

    map.set("k", 1, 5).unwrap();
    assert!(map.prune(1).is_empty(), "ttl 5 entry must survive one tick");
    assert_eq!(map.get("k"), Some(&1));
    assert!(map.prune(4).is_empty());
    assert_eq!(map.prune(1), vec![1]);
}

#[test]
fn expired_key_can_be_set_again() {
    let mut map = make_map(3);
    map.set("k", "first".to_string(), 0).unwrap();
    map.prune(1);
    map.set("k", "second".to_string(), 2).unwrap();
    assert_eq!(map.get("k").map(String::as_str), Some("second"));
}

#[test]
fn colliding_hashes_keep_both_lists_consistent() {
    let mut map: TtlMap<u32> = TtlMapBuilder::new(6).hasher(|_: &[u8]| 42).build();
    for i in 0..30u32 {
        map.set(format!("key-{i}"), i, (i % 7) as u64).unwrap();
    }
    for tick in 0..7u32 {
        let mut expired = map.prune(1);
        expired.sort();
        let expected: Vec<u32> = (0..30).filter(|i| i % 7 == tick).collect();
        assert_eq!(expired, expected);
        for i in 0..30u32 {
            assert_eq!(map.contains_key(format!("key-{i}")), i % 7 > tick);
        }
    }
    assert!(map.is_empty());
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

#[test]
fn remove_takes_entry_out_before_its_tick() {
    let mut map = make_map(5);
    map.set("a", "1".to_string(), 2).unwrap();
    map.set("b", "2".to_string(), 2).unwrap();

    assert_eq!(map.remove("a").as_deref(), Ok("1"));
    assert_eq!(map.get("a"), None);
    assert_matches!(map.remove("a"), Err(TtlMapError::NotFound { key }) if key == b"a");

    assert_eq!(map.prune(3), vec!["2".to_string()]);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[test]
fn stats_tracks_hits_and_misses() {
    let mut map = make_map(10);
    map.set("k", "v".to_string(), 1).unwrap();
    map.get("k"); // hit
    map.get("k"); // hit
    map.get("nope"); // miss

    let stats = map.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert!(
        (stats.hit_rate - 2.0 / 3.0).abs() < 1e-9,
        "hit_rate = {}",
        stats.hit_rate
    );
}

// ---------------------------------------------------------------------------
// ExpiryListener
// ---------------------------------------------------------------------------

#[test]
fn listener_fires_on_expiry_and_removal() {
    let log: Arc<Mutex<Vec<(Vec<u8>, u64, ExpiryCause)>>> = Arc::new(Mutex::new(Vec::new()));
    let log2 = Arc::clone(&log);

    let mut map: TtlMap<u64> = TtlMapBuilder::new(4)
        .expiry_listener(move |key: &[u8], val: &u64, cause| {
            log2.lock().unwrap().push((key.to_vec(), *val, cause));
        })
        .build();

    map.set("a", 1, 0).unwrap();
    map.set("b", 2, 1).unwrap();
    map.set("c", 3, 2).unwrap();
    map.remove("c").unwrap();
    map.prune(3);

    let events = log.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (b"c".to_vec(), 3, ExpiryCause::Removed),
            (b"a".to_vec(), 1, ExpiryCause::Expired),
            (b"b".to_vec(), 2, ExpiryCause::Expired),
        ]
    );
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn shared_map_serializes_writers_and_pruner() {
    let map: tickmap::SharedTtlMap<String> = TtlMapBuilder::new(64).build_shared();
    let mut handles = Vec::new();

    for t in 0..8 {
        let m = map.clone();
        handles.push(std::thread::spawn(move || {
            for j in 0..200 {
                let key = format!("t{t}-k{j}");
                m.set(&key, key.clone(), 63).unwrap();
                assert_eq!(m.get(&key), Some(key.clone()));
            }
        }));
    }
    let pruner = map.clone();
    handles.push(std::thread::spawn(move || {
        for _ in 0..10 {
            pruner.prune(0);
        }
    }));
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(map.len(), 1_600);
    let expired = map.prune(64);
    assert_eq!(expired.len(), 1_600);
    assert!(map.is_empty());
}
