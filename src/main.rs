//! Catalog storage-strategy benchmark runner.
//!
//! Usage:
//!   catalog-bench                          # all scales: 100, 1000, 10000, 100000
//!   catalog-bench --scales 100,1000        # selected scales
//!   catalog-bench --skip embedded          # skip a backend

use catalog_bench::adapters::{EmbeddedStore, ReferencedStore, RelationalStore};
use catalog_bench::harness::{Harness, DEFAULT_SCALES};
use catalog_bench::runner::RunnerConfig;
use catalog_bench::{BookStore, StoreError, StoreResult};
use clap::Parser;
use colored::Colorize;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "catalog-bench",
    about = "Compare relational, embedded-document and referenced-document storage strategies"
)]
struct Cli {
    /// Benchmark scales (books per pass), comma-separated.
    #[arg(long, value_delimiter = ',')]
    scales: Vec<usize>,

    /// Skip backends (comma-separated: relational, embedded, referenced).
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,

    /// Measured repetitions per point-read scenario.
    #[arg(long, default_value = "50")]
    reads: usize,

    /// Unmeasured warmup reads before each read scenario.
    #[arg(long, default_value = "10")]
    warmup: usize,
}

fn main() -> StoreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let scales = if cli.scales.is_empty() {
        DEFAULT_SCALES.to_vec()
    } else {
        cli.scales.clone()
    };
    let skip: Vec<String> = cli.skip.iter().map(|s| s.to_lowercase()).collect();

    println!(
        "\n{}",
        "╔══════════════════════════════════════════════════════╗".bold().blue()
    );
    println!(
        "{}",
        "║      Catalog Storage-Strategy Benchmark              ║".bold().blue()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════╝".bold().blue()
    );
    println!(
        "  Scales: {:?}  Reads: {} measured / {} warmup",
        scales, cli.reads, cli.warmup
    );

    let tmp = TempDir::new()?;
    let mut backends: Vec<Box<dyn BookStore>> = Vec::new();

    if !skip.iter().any(|s| s == "relational") {
        match RelationalStore::open(tmp.path()) {
            Ok(db) => backends.push(Box::new(db)),
            Err(e) => eprintln!("  {} Relational: {}", "SKIP".yellow(), e),
        }
    }
    if !skip.iter().any(|s| s == "embedded") {
        match EmbeddedStore::open(tmp.path()) {
            Ok(db) => backends.push(Box::new(db)),
            Err(e) => eprintln!("  {} Embedded: {}", "SKIP".yellow(), e),
        }
    }
    if !skip.iter().any(|s| s == "referenced") {
        match ReferencedStore::open(tmp.path()) {
            Ok(db) => backends.push(Box::new(db)),
            Err(e) => eprintln!("  {} Referenced: {}", "SKIP".yellow(), e),
        }
    }

    if backends.is_empty() {
        return Err(StoreError::Config(
            "no backends to benchmark; check --skip flags".into(),
        ));
    }
    println!(
        "  Backends: {}",
        backends.iter().map(|b| b.name()).collect::<Vec<_>>().join(", ")
    );

    let cfg = RunnerConfig {
        measured_reads: cli.reads,
        warmup_reads: cli.warmup,
        ..RunnerConfig::default()
    };
    let harness = Harness::new(scales, cfg);
    let report = harness.run_comparison_table(&mut backends);
    println!("\n{report}");

    Ok(())
}
