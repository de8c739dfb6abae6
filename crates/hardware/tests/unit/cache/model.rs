//! Cache Model Tests.
//!
//! Drives whole caches through reference sequences and checks hit/miss
//! outcomes, LRU victim choice, and the reported evictions.

use std::collections::VecDeque;

use cachesim_core::cache::AccessOutcome::{Hit, Miss};
use cachesim_core::cache::{AccessOutcome, AccessRecord, CacheModel};
use cachesim_core::common::{Address, AddressWidthError, ConfigError};
use cachesim_core::config::CacheConfig;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use crate::common::harness::{block, cache, same_set, warm};

#[test]
fn new_rejects_invalid_config() {
    let config = CacheConfig {
        size_bytes: 1024,
        line_bytes: 4,
        ways: 3,
    };
    assert_eq!(
        CacheModel::new(&config).err(),
        Some(ConfigError::WaysDoNotDivideBlocks { ways: 3, blocks: 256 })
    );
}

#[test]
fn cold_cache_misses_everything_once() {
    let mut c = cache(1024, 16, 2);
    assert_eq!(c.num_sets(), 32);
    for set in 0..c.num_sets() {
        assert_eq!(c.set(set).map(|s| s.occupancy()), Some(0));
    }

    let a = Address(0x1230);
    assert!(!c.contains(a));
    assert_eq!(c.access(a), Miss);
    assert!(c.contains(a));
    assert_eq!(c.access(a), Hit);
    // Same block, different offset.
    assert_eq!(c.access(Address(0x123f)), Hit);
}

#[test]
fn default_cache_scenario() {
    // 1024 KiB, 4-byte blocks, 4-way: consecutive words land in distinct sets.
    let mut c = CacheModel::new(&CacheConfig::default()).unwrap();
    for raw in [0x0, 0x4, 0x8, 0xc, 0x10] {
        assert_eq!(c.access(Address(raw)), Miss, "first touch of {raw:#x}");
    }
    assert_eq!(c.access(Address(0x0)), Hit);
}

#[rstest]
#[case(2)]
#[case(4)]
#[case(8)]
#[case(16)]
fn evicts_least_recently_used(#[case] ways: usize) {
    let mut c = cache(4 * 4 * ways, 4, ways);
    let blocks = same_set(&c, 1, ways as u32 + 1);

    for &a in &blocks[..ways] {
        assert_eq!(c.access(a), Miss);
    }
    // Re-referencing a0 leaves a1 as the LRU block.
    assert_eq!(c.access(blocks[0]), Hit);

    let record = c.access_detailed(blocks[ways]);
    assert_eq!(record.outcome, Miss);
    assert_eq!(record.set, 1);
    assert_eq!(record.evicted, Some(blocks[1]));

    assert!(c.contains(blocks[0]));
    assert!(!c.contains(blocks[1]));
    for &a in &blocks[2..] {
        assert!(c.contains(a));
    }
}

#[test]
fn fills_ways_in_order_before_evicting() {
    let mut c = cache(64, 4, 4);
    let blocks = same_set(&c, 0, 5);

    for (way, &a) in blocks[..4].iter().enumerate() {
        assert_eq!(
            c.access_detailed(a),
            AccessRecord {
                outcome: Miss,
                set: 0,
                way,
                evicted: None,
            }
        );
    }
    assert_eq!(
        c.access_detailed(blocks[4]),
        AccessRecord {
            outcome: Miss,
            set: 0,
            way: 0,
            evicted: Some(blocks[0]),
        }
    );
}

#[test]
fn hit_reports_resident_way() {
    let mut c = cache(64, 4, 4);
    let blocks = same_set(&c, 2, 3);
    warm(&mut c, &blocks);
    let record = c.access_detailed(blocks[1]);
    assert_eq!(record.outcome, Hit);
    assert_eq!(record.way, 1);
    assert_eq!(record.evicted, None);
}

#[test]
fn direct_mapped_conflicts() {
    // 1 KiB direct-mapped with 4-byte blocks: 0x000 and 0x400 share set 0.
    let mut c = cache(1024, 4, 1);
    let outcomes: Vec<_> = [0x000, 0x400, 0x000, 0x400]
        .into_iter()
        .map(|raw| c.access(Address(raw)))
        .collect();
    assert_eq!(outcomes, vec![Miss, Miss, Miss, Miss]);

    let record = c.access_detailed(Address(0x000));
    assert_eq!(record.evicted, Some(Address(0x400)));
}

#[test]
fn sets_are_independent() {
    let mut c = cache(64, 4, 2);
    let set0 = same_set(&c, 0, 3);
    let other = block(&c, 1, 0);

    let _ = c.access(other);
    warm(&mut c, &set0);
    assert!(c.contains(other));
    assert_eq!(c.set(1).map(|s| s.occupancy()), Some(1));
    assert_eq!(c.set(0).map(|s| s.occupancy()), Some(2));
}

#[test]
fn fully_associative_uses_one_set() {
    let mut c = cache(64, 16, 4);
    assert_eq!(c.num_sets(), 1);
    for raw in [0x00, 0x10, 0x20, 0x30] {
        assert_eq!(c.access(Address(raw)), Miss);
    }
    for raw in [0x00, 0x10, 0x20, 0x30] {
        assert_eq!(c.access(Address(raw)), Hit);
    }
    assert_eq!(c.access_detailed(Address(0x40)).evicted, Some(Address(0x00)));
}

#[test]
fn contains_does_not_change_recency() {
    let mut c = cache(64, 4, 2);
    let blocks = same_set(&c, 0, 3);
    warm(&mut c, &blocks[..2]);

    // Peeking at the LRU block must not save it from eviction.
    assert!(c.contains(blocks[0]));
    assert_eq!(c.access_detailed(blocks[2]).evicted, Some(blocks[0]));
}

#[test]
fn access_raw_rejects_wide_addresses() {
    let mut c = cache(64, 4, 2);
    assert_eq!(
        c.access_raw(0x1_0000_0000),
        Err(AddressWidthError {
            value: 0x1_0000_0000,
            width: 32,
        })
    );
    assert_eq!(c.set(0).map(|s| s.occupancy()), Some(0));

    assert_eq!(c.access_raw(0xffff_fffc), Ok(Miss));
    assert_eq!(c.access_raw(0xffff_fffc), Ok(Hit));
}

#[test]
fn reset_returns_to_cold_state() {
    let mut c = cache(64, 4, 2);
    let blocks = same_set(&c, 3, 2);
    warm(&mut c, &blocks);
    c.reset();
    for set in 0..c.num_sets() {
        assert_eq!(c.set(set).map(|s| s.occupancy()), Some(0));
    }
    assert_eq!(c.access(blocks[0]), Miss);
}

#[test]
fn geometry_is_exposed() {
    let c = cache(1024, 16, 2);
    let geometry = c.geometry();
    assert_eq!(geometry.num_sets, 32);
    assert_eq!(geometry.tag_bits, 23);
    assert_eq!(c.decoder().index_bits(), 5);
    assert!(c.set(32).is_none());
}

#[test]
fn set_views_cover_their_own_ways() {
    let mut c = cache(64, 4, 4);
    let target = block(&c, 2, 5);
    let _ = c.access(target);

    for index in 0..c.num_sets() {
        let set = c.set(index).unwrap();
        assert_eq!(set.ways(), 4);
        assert_eq!(set.occupancy(), usize::from(index == 2));
    }
    assert_eq!(c.set(2).and_then(|s| s.line(0).and_then(|l| l.tag())), Some(5));
    assert!(c.set(c.num_sets()).is_none());
    assert!(c.set(usize::MAX).is_none());
}

#[test]
fn one_byte_blocks_give_each_address_its_own_line() {
    // 256 one-byte blocks, direct-mapped: every address below 256 has its own
    // line and a tag of 0.
    let mut c = cache(256, 1, 1);
    assert_eq!(c.num_sets(), 256);
    assert_eq!(c.geometry().tag_bits, 24);
    for raw in 0..256 {
        assert_eq!(c.access(Address(raw)), Miss);
    }
    for raw in 0..256 {
        assert_eq!(c.access(Address(raw)), Hit);
    }
}

/// Per-set usage lists, most recent at the back.
struct ReferenceLru {
    sets: Vec<VecDeque<u32>>,
    ways: usize,
    line_bytes: u32,
}

impl ReferenceLru {
    fn new(num_sets: usize, ways: usize, line_bytes: u32) -> Self {
        Self {
            sets: vec![VecDeque::new(); num_sets],
            ways,
            line_bytes,
        }
    }

    /// Returns the outcome and the evicted block number.
    fn access(&mut self, raw: u32) -> (AccessOutcome, Option<u32>) {
        let block = raw / self.line_bytes;
        let num_sets = self.sets.len() as u32;
        let set = &mut self.sets[(block % num_sets) as usize];

        if let Some(pos) = set.iter().position(|&b| b == block) {
            let _ = set.remove(pos);
            set.push_back(block);
            return (Hit, None);
        }
        let evicted = if set.len() == self.ways {
            set.pop_front()
        } else {
            None
        };
        set.push_back(block);
        (Miss, evicted)
    }
}

proptest! {
    /// The model agrees with a textbook LRU list on every reference,
    /// including which block it evicts.
    #[test]
    fn prop_matches_reference_lru(
        addresses in prop::collection::vec(0u32..2048, 1..400),
    ) {
        // 256 bytes, 4-byte blocks, 4-way: 16 sets.
        let mut c = cache(256, 4, 4);
        let mut model = ReferenceLru::new(16, 4, 4);

        for raw in addresses {
            let record = c.access_detailed(Address(raw));
            let (outcome, evicted) = model.access(raw);
            prop_assert_eq!(record.outcome, outcome);
            prop_assert_eq!(record.evicted, evicted.map(|b| Address(b * 4)));
        }
    }

    /// A block just referenced is always resident.
    #[test]
    fn prop_last_reference_is_resident(
        addresses in prop::collection::vec(any::<u32>(), 1..200),
        ways_log in 0u32..4,
    ) {
        let ways = 1usize << ways_log;
        let mut c = cache(64 * ways * 8, 8, ways);
        for raw in addresses {
            let _ = c.access(Address(raw));
            prop_assert!(c.contains(Address(raw)));
            prop_assert_eq!(c.access(Address(raw)), Hit);
        }
    }
}
