//! Text rendering of run and sweep results.

use std::fmt::Write;

use cachesim_core::config::CacheGeometry;
use cachesim_core::sim::{Metric, RunReport, SweepSeries};

const RULE: &str = "----------------------------------------------------------";

/// Cache layout summary with the address bit split.
pub fn geometry_info(geometry: &CacheGeometry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Set-Associative LRU Cache:");
    let _ = writeln!(out, "\tTotal Size: {}B", geometry.size_bytes);
    let _ = writeln!(out, "\tSets: {}", geometry.num_sets);
    let _ = writeln!(out, "\tWays: {}", geometry.ways);
    let _ = writeln!(out, "\tBlock Size: {}B", geometry.line_bytes);
    let _ = write!(
        out,
        "\t| {} tag bits | {} index bits | {} offset bits |",
        geometry.tag_bits, geometry.index_bits, geometry.offset_bits
    );
    out
}

/// One line per trace for a single-configuration run.
pub fn run_line(report: &RunReport) -> String {
    format!("Trace File: {}, {}", report.trace, report.stats())
}

/// One line per swept value for a single trace.
pub fn sweep_lines(series: &SweepSeries) -> Vec<String> {
    series
        .points
        .iter()
        .map(|point| {
            format!(
                "Trace File: {}, {}, {}",
                series.trace,
                series.axis.format_value(point.value),
                point.rates.stats
            )
        })
        .collect()
}

/// All traces side by side: one row per swept value, one column per trace,
/// holding the rate the axis is charted by.
pub fn sweep_table(series: &[SweepSeries]) -> String {
    let Some(first) = series.first() else {
        return String::new();
    };
    let metric = match first.metric {
        Metric::HitRate => "Hit Rate",
        Metric::MissRate => "Miss Rate",
    };

    let mut out = String::new();
    let _ = writeln!(out, "{metric} vs {}", first.axis.label());
    let _ = writeln!(out, "{RULE}");
    let _ = write!(out, "{:>22}", first.axis.label());
    for s in series {
        let _ = write!(out, " {:>12}", s.trace);
    }
    let _ = writeln!(out);

    for point in &first.points {
        let _ = write!(out, "{:>22}", point.value);
        for s in series {
            match s.plotted().iter().find(|(value, _)| *value == point.value) {
                Some((_, rate)) => {
                    let _ = write!(out, " {rate:>12.4}");
                }
                None => {
                    let _ = write!(out, " {:>12}", "-");
                }
            }
        }
        let _ = writeln!(out);
    }
    let _ = write!(out, "{RULE}");
    out
}
