//! Cache hierarchy simulator CLI.
//!
//! Replays a trace of read/write requests through a two-level cache
//! hierarchy and prints the final contents and measurements. Geometry
//! comes either from eight positional arguments (the classic invocation)
//! or from a JSON config file.

use std::fs::{self, File};
use std::io::BufReader;
use std::process;

use clap::Parser;

use cachesim_core::config::LevelConfig;
use cachesim_core::sim::trace::TraceReader;
use cachesim_core::stats::render_report;
use cachesim_core::{Hierarchy, SimConfig};

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven two-level cache hierarchy simulator",
    long_about = "Replay a memory trace through an L1/L2 cache hierarchy with \
optional stream-buffer prefetching.\n\nThe eight positional arguments mirror the \
classic invocation; a zero L2_SIZE disables L2, and PREF_N/PREF_M attach the \
prefetcher to the lowest configured level. Alternatively pass --config with a \
JSON file.\n\nExamples:\n  cachesim 16 1024 2 8192 4 3 4 traces/gcc.txt\n  \
cachesim --config sweep.json --trace traces/gcc.txt"
)]
struct Cli {
    /// Block size in bytes, shared by both levels. Power of two.
    #[arg(required_unless_present = "config")]
    blocksize: Option<u32>,

    /// L1 total size in bytes.
    #[arg(required_unless_present = "config")]
    l1_size: Option<u32>,

    /// L1 associativity.
    #[arg(required_unless_present = "config")]
    l1_assoc: Option<u32>,

    /// L2 total size in bytes. Zero disables L2.
    #[arg(required_unless_present = "config")]
    l2_size: Option<u32>,

    /// L2 associativity.
    #[arg(required_unless_present = "config")]
    l2_assoc: Option<u32>,

    /// Number of prefetch streams (N). Zero disables prefetching.
    #[arg(required_unless_present = "config")]
    pref_n: Option<u32>,

    /// Blocks per prefetch stream (M).
    #[arg(required_unless_present = "config")]
    pref_m: Option<u32>,

    /// Trace file: one `r <hex addr>` or `w <hex addr>` per line.
    #[arg(required_unless_present = "trace")]
    trace_file: Option<String>,

    /// JSON config file; replaces the positional geometry arguments.
    #[arg(long)]
    config: Option<String>,

    /// Trace file when using --config.
    #[arg(long)]
    trace: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli);
    let trace_file = cli.trace_file.or(cli.trace).unwrap_or_else(|| {
        eprintln!("Error: no trace file given");
        process::exit(1);
    });

    let mut sim = Hierarchy::new(config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let file = File::open(&trace_file).unwrap_or_else(|e| {
        eprintln!("Error opening trace {trace_file}: {e}");
        process::exit(1);
    });
    for req in TraceReader::new(BufReader::new(file)) {
        match req {
            Ok(r) => sim.request(r.addr, r.access),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }

    print!("{}", render_report(&sim, &trace_file));
}

/// Assembles the simulator configuration from either the JSON file or the
/// positional geometry arguments. The prefetcher binds to L2 when L2 is
/// configured, to L1 otherwise.
fn build_config(cli: &Cli) -> SimConfig {
    if let Some(path) = &cli.config {
        let text = fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Error reading config {path}: {e}");
            process::exit(1);
        });
        return SimConfig::from_json(&text).unwrap_or_else(|e| {
            eprintln!("Error parsing config {path}: {e}");
            process::exit(1);
        });
    }
    // required_unless_present guarantees these when --config is absent.
    let (Some(block_bytes), Some(l1_size), Some(l1_assoc), Some(l2_size), Some(l2_assoc)) = (
        cli.blocksize,
        cli.l1_size,
        cli.l1_assoc,
        cli.l2_size,
        cli.l2_assoc,
    ) else {
        eprintln!("Error: missing geometry arguments");
        process::exit(1);
    };
    let (pref_n, pref_m) = (cli.pref_n.unwrap_or(0), cli.pref_m.unwrap_or(0));
    let mut config = SimConfig {
        block_bytes,
        l1: LevelConfig {
            size_bytes: l1_size,
            assoc: l1_assoc,
            stream_count: 0,
            stream_depth: 0,
        },
        l2: LevelConfig {
            size_bytes: l2_size,
            assoc: l2_assoc,
            stream_count: 0,
            stream_depth: 0,
        },
    };
    if l2_size == 0 {
        config.l1.stream_count = pref_n;
        config.l1.stream_depth = pref_m;
    } else {
        config.l2.stream_count = pref_n;
        config.l2.stream_depth = pref_m;
    }
    config
}
