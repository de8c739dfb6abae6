//! Trace-driven cache simulator CLI.
//!
//! This binary provides a single entry point for all experiments. It performs:
//! 1. **Run:** Replay one or more traces through a single cache configuration.
//! 2. **Sweep:** Vary cache size, block size or associativity and tabulate the rates.
//! 3. **Info:** Print the geometry (sets, tag/index/offset bits) of a configuration.

mod report;

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cachesim_core::common::SimError;
use cachesim_core::config::{CacheConfig, kib_to_bytes};
use cachesim_core::sim::{Sweep, SweepAxis, simulate_file};
use cachesim_core::trace::Trace;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Set-associative cache simulator",
    long_about = "Replay memory-access traces through a set-associative LRU cache.\n\nTrace lines are whitespace-delimited; the second field is the hexadecimal address.\n\nExamples:\n  cachesim run gcc.trace gzip.trace\n  cachesim run --size-kb 256 --block 16 --ways 8 mcf.trace\n  cachesim sweep associativity gcc.trace swim.trace\n  cachesim sweep block-size --values 4,8,16 --json twolf.trace"
)]
struct Cli {
    /// Emit results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Cache configuration sources. Flags override fields read from `--config`.
#[derive(Args, Debug, Clone, Default)]
struct CacheArgs {
    /// JSON cache configuration (`size_bytes`, `line_bytes`, `ways`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Total cache size in KiB.
    #[arg(long = "size-kb")]
    size_kb: Option<usize>,

    /// Block (line) size in bytes.
    #[arg(long)]
    block: Option<usize>,

    /// Associativity (ways per set).
    #[arg(long)]
    ways: Option<usize>,
}

impl CacheArgs {
    fn resolve(&self) -> Result<CacheConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => CacheConfig::from_json_file(path)?,
            None => CacheConfig::default(),
        };
        if let Some(size_kb) = self.size_kb {
            config.size_bytes = kib_to_bytes(size_kb)?;
        }
        if let Some(block) = self.block {
            config.line_bytes = block;
        }
        if let Some(ways) = self.ways {
            config.ways = ways;
        }
        debug!(?config, "resolved cache configuration");
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay traces through one cache configuration.
    Run {
        #[command(flatten)]
        cache: CacheArgs,

        /// Trace files to replay.
        #[arg(required = true)]
        traces: Vec<PathBuf>,
    },

    /// Vary one cache parameter and report the rate at each value.
    Sweep {
        /// Parameter to vary.
        #[arg(value_enum)]
        axis: Axis,

        /// Comma-separated values to try (defaults depend on the axis).
        #[arg(long, value_delimiter = ',')]
        values: Vec<usize>,

        #[command(flatten)]
        cache: CacheArgs,

        /// Trace files to replay.
        #[arg(required = true)]
        traces: Vec<PathBuf>,
    },

    /// Print the geometry of a cache configuration.
    Info {
        #[command(flatten)]
        cache: CacheArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Axis {
    /// Total capacity in KiB.
    CacheSize,
    /// Block size in bytes.
    BlockSize,
    /// Ways per set.
    Associativity,
}

impl From<Axis> for SweepAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::CacheSize => Self::CacheSize,
            Axis::BlockSize => Self::BlockSize,
            Axis::Associativity => Self::Associativity,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { cache, traces } => cmd_run(&cache, &traces, cli.json),
        Commands::Sweep {
            axis,
            values,
            cache,
            traces,
        } => cmd_sweep(axis.into(), values, &cache, &traces, cli.json),
        Commands::Info { cache } => cmd_info(&cache, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Replays each trace through a fresh cache and prints one result line per trace.
fn cmd_run(cache: &CacheArgs, traces: &[PathBuf], json: bool) -> Result<(), SimError> {
    let config = cache.resolve()?;
    // Reject a bad geometry before touching any trace file.
    let geometry = config.validate()?;

    let reports = traces
        .iter()
        .map(|path| simulate_file(&config, path))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        return print_json(&reports);
    }

    println!("{}", report::geometry_info(&geometry));
    for run in &reports {
        println!("{}", report::run_line(run));
    }
    Ok(())
}

/// Sweeps one axis over every trace, printing per-trace lines and a combined table.
fn cmd_sweep(
    axis: SweepAxis,
    values: Vec<usize>,
    cache: &CacheArgs,
    traces: &[PathBuf],
    json: bool,
) -> Result<(), SimError> {
    let base = cache.resolve()?;
    let sweep = if values.is_empty() {
        Sweep::new(base, axis)
    } else {
        Sweep::with_values(base, axis, values)
    };
    for point in sweep.configs() {
        let (_, config) = point?;
        let _ = config.validate()?;
    }

    let traces = traces
        .iter()
        .map(Trace::load)
        .collect::<Result<Vec<_>, _>>()?;
    let series = sweep.run_all(&traces)?;

    if json {
        return print_json(&series);
    }

    for s in &series {
        for line in report::sweep_lines(s) {
            println!("{line}");
        }
        println!();
    }
    println!("{}", report::sweep_table(&series));
    Ok(())
}

fn cmd_info(cache: &CacheArgs, json: bool) -> Result<(), SimError> {
    let geometry = cache.resolve()?.validate()?;
    if json {
        return print_json(&geometry);
    }
    println!("{}", report::geometry_info(&geometry));
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<(), SimError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)
        .map_err(std::io::Error::from)
        .and_then(|()| writeln!(stdout))
        .map_err(|source| SimError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        })
}
