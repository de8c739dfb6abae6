//! Statistics Tests.
//!
//! Verifies counter bookkeeping, rate derivation and the report formatting.

use cachesim_core::cache::AccessOutcome::{Hit, Miss};
use cachesim_core::stats::{AccessStats, RateSummary};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn empty_tally_has_zero_hit_rate() {
    let stats = AccessStats::default();
    assert_eq!(stats.accesses, 0);
    assert_eq!(stats.hit_rate(), 0.0);
    assert_eq!(stats.miss_rate(), 1.0);
}

#[test]
fn record_counts_outcomes() {
    let mut stats = AccessStats::default();
    for outcome in [Miss, Hit, Hit, Miss, Hit] {
        stats.record(outcome);
    }
    assert_eq!(
        stats,
        AccessStats {
            accesses: 5,
            hits: 3,
            misses: 2,
        }
    );
    assert_eq!(stats.hit_rate(), 0.6);
}

#[test]
fn collects_from_outcomes() {
    let stats: AccessStats = [Hit, Miss, Miss, Miss].into_iter().collect();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.hit_rate(), 0.25);
    assert_eq!(stats.miss_rate(), 0.75);
}

#[test]
fn merge_adds_counters() {
    let mut a: AccessStats = [Hit, Miss].into_iter().collect();
    let b: AccessStats = [Hit, Hit, Hit].into_iter().collect();
    a.merge(&b);
    assert_eq!(
        a,
        AccessStats {
            accesses: 5,
            hits: 4,
            misses: 1,
        }
    );
}

#[test]
fn display_uses_four_decimals() {
    let stats: AccessStats = [Hit, Hit, Miss].into_iter().collect();
    assert_eq!(stats.to_string(), "Hit Rate 0.6667, Miss Rate: 0.3333");
}

#[test]
fn rate_summary_serializes_flat() {
    let stats: AccessStats = [Hit, Miss].into_iter().collect();
    let summary = RateSummary::from(stats);
    let json = serde_json::to_value(summary).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "accesses": 2,
            "hits": 1,
            "misses": 1,
            "hit_rate": 0.5,
            "miss_rate": 0.5,
        })
    );
}

proptest! {
    /// Counters always balance and the two rates sum to exactly one.
    #[test]
    fn prop_rates_are_complementary(hits in proptest::collection::vec(any::<bool>(), 1..500)) {
        let stats: AccessStats = hits
            .iter()
            .map(|&hit| if hit { Hit } else { Miss })
            .collect();

        prop_assert_eq!(stats.accesses, stats.hits + stats.misses);
        prop_assert_eq!(stats.accesses, hits.len() as u64);
        prop_assert!((0.0..=1.0).contains(&stats.hit_rate()));
        prop_assert_eq!(stats.hit_rate() + stats.miss_rate(), 1.0);
    }
}
