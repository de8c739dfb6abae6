//! Trace Runner Tests.
//!
//! Replays small traces end to end and checks the reported tallies and the
//! failure modes of a run.

use std::io::Cursor;

use cachesim_core::common::{Address, ConfigError, SimError};
use cachesim_core::config::CacheConfig;
use cachesim_core::sim::{TraceRunner, simulate, simulate_file};
use cachesim_core::stats::AccessStats;
use cachesim_core::trace::Trace;
use pretty_assertions::assert_eq;

use crate::common::harness::{init_tracing, trace_file};

fn small() -> CacheConfig {
    CacheConfig::from_kib(1, 4, 4).unwrap()
}

fn trace(raw: &[u32]) -> Trace {
    Trace::new("t", raw.iter().copied().map(Address).collect())
}

#[test]
fn simulate_counts_hits_and_misses() {
    init_tracing();
    let report = simulate(&small(), &trace(&[0x0, 0x4, 0x0, 0x100, 0x0])).unwrap();
    assert_eq!(report.trace, "t");
    assert_eq!(
        *report.stats(),
        AccessStats {
            accesses: 5,
            hits: 2,
            misses: 3,
        }
    );
    assert_eq!(report.rates.hit_rate, 0.4);
    assert_eq!(report.geometry.num_sets, 64);
}

#[test]
fn simulate_rejects_empty_trace() {
    assert!(matches!(
        simulate(&small(), &trace(&[])),
        Err(SimError::EmptyTrace(name)) if name == "t"
    ));
}

#[test]
fn simulate_rejects_invalid_config() {
    let config = CacheConfig {
        line_bytes: 3,
        ..small()
    };
    assert!(matches!(
        simulate(&config, &trace(&[0x0])),
        Err(SimError::Config(ConfigError::BlockSizeNotPowerOfTwo(3)))
    ));
}

#[test]
fn simulate_file_streams_records() {
    init_tracing();
    let file = trace_file(&["l 0", "l 4", "", "l 0", "l 100", "l 0"]);
    let report = simulate_file(&small(), file.path()).unwrap();
    assert_eq!(report.stats().accesses, 5);
    assert_eq!(report.stats().hits, 2);
    assert!(!report.trace.contains('/'));
}

#[test]
fn simulate_file_matches_in_memory_run() {
    let lines = ["l 0", "l 400", "l 800", "l c00", "l 1000", "l 0", "l 400"];
    let file = trace_file(&lines);
    let from_file = simulate_file(&small(), file.path()).unwrap();
    let loaded = Trace::load(file.path()).unwrap();
    let in_memory = simulate(&small(), &loaded).unwrap();
    assert_eq!(from_file, in_memory);
}

#[test]
fn simulate_file_stops_at_bad_record() {
    let file = trace_file(&["l 0", "x"]);
    assert!(matches!(
        simulate_file(&small(), file.path()),
        Err(SimError::Trace(err)) if err.line == 2
    ));
}

#[test]
fn simulate_file_rejects_blank_file() {
    let file = trace_file(&["", "  "]);
    assert!(matches!(
        simulate_file(&small(), file.path()),
        Err(SimError::EmptyTrace(_))
    ));
}

#[test]
fn runner_steps_and_resets() {
    let mut runner = TraceRunner::new(&small()).unwrap();
    runner.step(Address(0x40));
    runner.step(Address(0x40));
    assert_eq!(runner.stats().hits, 1);
    assert!(runner.cache().contains(Address(0x40)));

    runner.reset();
    assert_eq!(*runner.stats(), AccessStats::default());
    assert!(!runner.cache().contains(Address(0x40)));
}

#[test]
fn runner_replays_reader() {
    let mut runner = TraceRunner::new(&small()).unwrap();
    runner
        .replay_reader(Cursor::new("l 8\nl 8\nl 8\n"), "mem")
        .unwrap();
    let report = runner.finish("mem").unwrap();
    assert_eq!(report.stats().misses, 1);
    assert_eq!(report.stats().hits, 2);
}

#[test]
fn runner_counts_records_before_a_bad_one() {
    let mut runner = TraceRunner::new(&small()).unwrap();
    let result = runner.replay_reader(Cursor::new("l 8\nl 10\nbad\nl 8\n"), "mem");
    assert!(matches!(result, Err(SimError::Trace(_))));
    assert_eq!(runner.stats().accesses, 2);
}

#[test]
fn run_report_serializes_rates_inline() {
    let report = simulate(&small(), &trace(&[0x0, 0x0])).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["trace"], "t");
    assert_eq!(json["hits"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["geometry"]["num_sets"], 64);
}
