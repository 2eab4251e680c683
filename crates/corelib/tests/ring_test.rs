//! Tests for the hash ring and the weighted controller.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, register/lookup, deregister
//! 2. **Multiple destinations**: Distribution, consistency
//! 3. **Edge cases**: Wraparound, single destination, duplicate registration
//! 4. **Thread safety**: Lookups racing with mutations

use std::sync::Arc;

use corelib::partitioner::{Crc32Partitioner, Partitioner};
use corelib::{Destination, Error, Token, WeightedRingController};

/// Places virtual node `X*-i` at `base(X) + i` and hashes any other key
/// through a fixed table, so tests can aim keys at exact ring positions.
struct PinnedPartitioner;

impl Partitioner for PinnedPartitioner {
    fn position(&self, key: &[u8]) -> Token {
        let key = std::str::from_utf8(key).unwrap();
        if let Some((id, index)) = key.split_once("*-") {
            let base = match id {
                "A" => 1_000,
                "B" => 2_000,
                _ => 3_000,
            };
            return Token(base + index.parse::<u32>().unwrap());
        }
        match key {
            "low" => Token(5),
            "between" => Token(1_500),
            "top" => Token(u32::MAX),
            _ => Token(0),
        }
    }

    fn name(&self) -> &'static str {
        "PinnedPartitioner"
    }
}

fn crc_controller() -> WeightedRingController {
    WeightedRingController::new(Arc::new(Crc32Partitioner), 1)
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let controller = crc_controller();
    assert_eq!(controller.route(b"key1"), Err(Error::EmptyRing));
    assert_eq!(controller.lookup(Token::MAX), Err(Error::EmptyRing));
    assert_eq!(controller.len(), 0);
    assert!(controller.registered().is_empty());
}

#[test]
fn test_register_and_lookup() {
    let controller = crc_controller();
    assert!(controller.register_full(&Destination::new("sh", 4)));

    assert_eq!(controller.len(), 4);
    assert!(controller.is_registered("sh"));
    assert_eq!(controller.route(b"test-key").unwrap(), "sh");
    assert_eq!(controller.lookup(Token(0)).unwrap(), Destination::new("sh", 4));
}

#[test]
fn test_deregister_full() {
    let controller = crc_controller();
    controller.register_full(&Destination::new("sh", 4));
    controller.register_full(&Destination::new("bj", 4));
    assert_eq!(controller.len(), 8);

    assert!(controller.deregister_full(&Destination::new("sh", 4)));
    assert_eq!(controller.len(), 4);
    assert_eq!(controller.route(b"some-key").unwrap(), "bj");
    assert!(!controller.is_registered("sh"));

    // Removing an unknown destination reports failure.
    assert!(!controller.deregister_full(&Destination::new("xx", 4)));
}

// ============================================================================
// Multiple Destination Tests
// ============================================================================

#[test]
fn test_consistent_lookup() {
    let controller = crc_controller();
    controller.register_full(&Destination::new("sh", 70));
    controller.register_full(&Destination::new("bj", 30));

    let key = b"consistent-key";
    let first = controller.route(key).unwrap();
    for _ in 0..100 {
        assert_eq!(controller.route(key).unwrap(), first);
    }
}

#[test]
fn test_vnode_counts_follow_weight() {
    let controller = WeightedRingController::new(Arc::new(Crc32Partitioner), 3);
    controller.register_full(&Destination::new("sh", 70));
    controller.register_full(&Destination::new("bj", 30));

    let counts = controller.vnode_counts();
    assert_eq!(counts.get("sh"), Some(&210));
    assert_eq!(counts.get("bj"), Some(&90));
    assert_eq!(controller.topology().total_vnodes(), 300);
}

#[test]
fn test_shrinking_one_destination_keeps_other_keys() {
    let controller = crc_controller();
    controller.register_full(&Destination::new("A", 70));
    controller.register_full(&Destination::new("B", 30));

    let keys: Vec<String> = (0..5_000).map(|i| format!("user-{i}")).collect();
    let before: Vec<String> = keys.iter().map(|k| controller.route(k.as_bytes()).unwrap()).collect();

    assert!(controller.deregister_range(&Destination::new("A", 60), 60, 70));
    assert_eq!(controller.vnode_counts().get("A"), Some(&60));

    for (key, old) in keys.iter().zip(&before) {
        let new = controller.route(key.as_bytes()).unwrap();
        if old == "B" {
            assert_eq!(new, "B", "key {key} left B");
        }
    }
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_wraparound_to_smallest_position() {
    let controller = WeightedRingController::new(Arc::new(PinnedPartitioner), 1);
    controller.register_full(&Destination::new("A", 1));
    controller.register_full(&Destination::new("B", 1));
    assert_eq!(controller.positions(), vec![Token(1_000), Token(2_000)]);

    // Above every position: wraps to A at 1000.
    assert_eq!(controller.route(b"top").unwrap(), "A");
    assert_eq!(controller.lookup(Token(2_001)).unwrap().id, "A");
    // Below the first position and in between.
    assert_eq!(controller.route(b"low").unwrap(), "A");
    assert_eq!(controller.route(b"between").unwrap(), "B");
    // Exactly on a position belongs to that position.
    assert_eq!(controller.lookup(Token(2_000)).unwrap().id, "B");
}

#[test]
fn test_single_destination() {
    let controller = crc_controller();
    controller.register_full(&Destination::new("sh", 4));
    for key in [&b"key1"[..], b"key2", b"key3", b"very-long-key-name"] {
        assert_eq!(controller.route(key).unwrap(), "sh");
    }
}

#[test]
fn test_register_deregister_register() {
    let controller = crc_controller();
    let dest = Destination::new("sh", 4);

    assert!(controller.register_full(&dest));
    assert!(controller.deregister_full(&dest));
    assert!(controller.is_empty());

    assert!(controller.register_full(&dest));
    assert_eq!(controller.len(), 4);
    assert!(controller.route(b"key").is_ok());
}

#[test]
fn test_idempotent_full_registration() {
    let controller = crc_controller();
    let dest = Destination::new("sh", 4);
    assert!(controller.register_full(&dest));
    let positions = controller.positions();

    assert!(!controller.register_full(&dest));
    assert_eq!(controller.positions(), positions);
    assert_eq!(controller.len(), 4);
}

#[test]
fn test_collision_removal_keeps_new_owner() {
    // Both destinations' replica 0 land on 3000 + 0 under the pinned hash.
    let controller = WeightedRingController::new(Arc::new(PinnedPartitioner), 1);
    controller.register_full(&Destination::new("C", 2));
    controller.register_full(&Destination::new("D", 1));
    assert_eq!(controller.len(), 2);
    assert_eq!(controller.lookup(Token(3_000)).unwrap().id, "D");
    assert!(controller.is_registered("C"));

    // C keeps only 3001; removing it leaves D's slot in place.
    assert!(controller.deregister_full(&Destination::new("C", 2)));
    assert_eq!(controller.positions(), vec![Token(3_000)]);
    assert_eq!(controller.lookup(Token(0)).unwrap().id, "D");
}

#[test]
fn test_collision_overwriting_last_slot_deregisters() {
    let controller = WeightedRingController::new(Arc::new(PinnedPartitioner), 1);
    controller.register_full(&Destination::new("C", 1));
    controller.register_full(&Destination::new("D", 1));
    assert_eq!(controller.len(), 1);
    assert_eq!(controller.registered(), vec!["D".to_string()]);
    assert!(!controller.is_registered("C"));

    // C owns nothing, so removing it is refused and D is untouched.
    assert!(!controller.deregister_full(&Destination::new("C", 1)));
    assert_eq!(controller.lookup(Token(0)).unwrap().id, "D");

    // C can register again and takes the slot back.
    assert!(controller.register_full(&Destination::new("C", 1)));
    assert!(!controller.is_registered("D"));
    assert_eq!(controller.lookup(Token(0)).unwrap().id, "C");
}

// ============================================================================
// Thread Safety
// ============================================================================

#[test]
fn test_concurrent_lookups_during_mutation() {
    let controller = Arc::new(crc_controller());
    controller.register_full(&Destination::new("sh", 50));

    std::thread::scope(|s| {
        for t in 0..4 {
            let controller = Arc::clone(&controller);
            s.spawn(move || {
                for i in 0..2_000 {
                    let key = format!("t{t}-{i}");
                    let id = controller.route(key.as_bytes()).unwrap();
                    assert!(id == "sh" || id == "bj");
                }
            });
        }

        for _ in 0..50 {
            controller.register_full(&Destination::new("bj", 20));
            controller.deregister_full(&Destination::new("bj", 20));
        }
    });

    assert_eq!(controller.registered(), vec!["sh".to_string()]);
}
