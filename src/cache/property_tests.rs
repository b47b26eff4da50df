//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store invariants under random operation
//! sequences, plus the capacity, overwrite and cleanup guarantees.

use proptest::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::cache::{CacheStore, ENTRY_OVERHEAD};

// == Strategies ==
/// Generates keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h][0-3]?"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

/// TTLs long enough never to elapse during a test run
fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (60u64..3_600).prop_map(Duration::from_secs)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    SetWithTtl { key: String, value: String, ttl: Duration },
    SetZeroTtl { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Cleanup,
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => (key_strategy(), value_strategy(), ttl_strategy())
            .prop_map(|(key, value, ttl)| CacheOp::SetWithTtl { key, value, ttl }),
        1 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::SetZeroTtl { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Cleanup),
        1 => Just(CacheOp::Clear),
    ]
}

fn apply(store: &mut CacheStore<String, String>, op: CacheOp) {
    match op {
        CacheOp::Set { key, value } => store.set(key, value),
        CacheOp::SetWithTtl { key, value, ttl } => store.set_with_ttl(key, value, ttl),
        CacheOp::SetZeroTtl { key, value } => {
            store.set_with_ttl(key.clone(), value, Duration::ZERO);
            assert!(store.get(&key).is_none());
        }
        CacheOp::Get { key } => {
            store.get(&key);
        }
        CacheOp::Delete { key } => {
            store.delete(&key);
        }
        CacheOp::Cleanup => {
            store.cleanup_expired();
        }
        CacheOp::Clear => {
            store.clear();
            assert_eq!(store.len(), 0);
            assert_eq!(store.current_size(), 0);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Map, recency list, expiration queue and size counter stay consistent
    // after every operation, whatever the bounds.
    #[test]
    fn prop_invariants_hold(
        max_items in prop::option::of(0usize..6),
        max_size in prop::option::of(0u64..400),
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let mut store = CacheStore::with_limits(max_items, max_size);

        for op in ops {
            apply(&mut store, op);
            store.validate();
        }
    }

    // A stored value is returned unchanged until overwritten or deleted.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::with_limits(None, None);

        store.set(key.clone(), value.clone());

        prop_assert_eq!(store.get(&key), Some(&value));
    }

    #[test]
    fn prop_delete_removes_entry(key in key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::with_limits(None, None);

        store.set(key.clone(), value);
        prop_assert!(store.delete(&key));

        prop_assert!(store.get(&key).is_none());
        prop_assert!(!store.delete(&key), "Second delete should be a no-op");
        prop_assert_eq!(store.current_size(), 0);
    }

    // Overwriting replaces the value, TTL and size without adding an entry.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy(),
        ttl in ttl_strategy()
    ) {
        let mut store = CacheStore::with_limits(None, None);

        store.set_with_ttl(key.clone(), value1, ttl);
        store.set(key.clone(), value2.clone());

        prop_assert_eq!(store.get(&key), Some(&value2));
        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.ttl_remaining(&key), Some(None));
        prop_assert_eq!(
            store.current_size(),
            (key.len() + value2.len()) as u64 + ENTRY_OVERHEAD
        );
        store.validate();
    }

    #[test]
    fn prop_capacity_enforcement(
        max_items in 1usize..20,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..100)
    ) {
        let mut store = CacheStore::with_limits(Some(max_items), None);

        for (key, value) in entries {
            store.set(key, value);
            prop_assert!(
                store.len() <= max_items,
                "Cache size {} exceeds max {}",
                store.len(),
                max_items
            );
        }
    }

    // The byte bound holds unless a single entry is larger than the bound.
    #[test]
    fn prop_size_bound(
        max_size in 50u64..600,
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..60)
    ) {
        let mut store = CacheStore::with_limits(None, Some(max_size));

        for (key, value) in entries {
            store.set(key, value);
            prop_assert!(
                store.current_size() <= max_size || store.len() == 1,
                "Size {} exceeds max {} with {} entries",
                store.current_size(),
                max_size,
                store.len()
            );
        }
    }

    // With maxItems = N, N + 1 distinct sequential inserts evict the first.
    #[test]
    fn prop_eviction_order(
        keys in prop::collection::hash_set(key_strategy(), 2..12),
        new_value in value_strategy()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let (new_key, initial) = keys.split_last().unwrap();
        let capacity = initial.len();
        let mut store = CacheStore::with_limits(Some(capacity), None);

        for key in initial {
            store.set(key.clone(), format!("value_{}", key));
        }
        // Reads must not protect the oldest entry
        store.get(&initial[0]);
        store.set(new_key.clone(), new_value);

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.get(&initial[0]).is_none());
        prop_assert!(store.get(new_key).is_some());
        for key in &initial[1..] {
            prop_assert!(store.get(key).is_some(), "Key '{}' should still exist", key);
        }
    }

    // Updating a key of a full store evicts the oldest other entry: the
    // second-oldest when the updated key is itself the oldest.
    #[test]
    fn prop_update_on_full_store(
        keys in prop::collection::hash_set(key_strategy(), 2..12),
        pick in any::<prop::sample::Index>(),
        new_value in value_strategy()
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let mut store = CacheStore::with_limits(Some(capacity), None);

        for key in &keys {
            store.set(key.clone(), format!("value_{}", key));
        }
        let updated = pick.get(&keys).clone();
        let victim = if updated == keys[0] { &keys[1] } else { &keys[0] };

        store.set(updated.clone(), new_value.clone());

        prop_assert_eq!(store.len(), capacity - 1);
        prop_assert_eq!(store.get(&updated), Some(&new_value));
        prop_assert!(store.get(victim).is_none());
        prop_assert_eq!(store.keys().last(), Some(&updated));
        prop_assert_eq!(store.stats().evictions, 1);
        store.validate();
    }

    // Cleanup at an instant removes exactly the entries due by then.
    #[test]
    fn prop_cleanup_counts_exactly(
        entries in prop::collection::vec(
            (key_strategy(), prop::option::of(ttl_strategy())),
            1..40
        ),
        offset_secs in 0u64..4_000
    ) {
        let mut store = CacheStore::with_limits(None, None);

        for (key, ttl) in entries {
            match ttl {
                Some(ttl) => store.set_with_ttl(key, "v".to_string(), ttl),
                None => store.set(key, "v".to_string()),
            }
        }

        let at = Instant::now() + Duration::from_secs(offset_secs);
        let keys: HashSet<String> = store.keys().cloned().collect();
        let expected = keys
            .iter()
            .filter(|key| {
                store
                    .get_entry(key.as_str())
                    .and_then(|entry| entry.expires_at())
                    .is_some_and(|expires| expires <= at)
            })
            .count();
        let before = store.len();

        prop_assert_eq!(store.cleanup_expired_at(at), expected);
        prop_assert_eq!(store.len(), before - expected);
        store.validate();
    }
}
