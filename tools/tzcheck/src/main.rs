//! Vector verification harness
//!
//! Loads a regime table and a set of vector files, runs every vector through
//! the oracle and exits with an error when any vector fails.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use clap::Parser;
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use color_eyre::{
    eyre::{bail, eyre, WrapErr},
    Result,
};
use log::{info, warn};
use rustc_hash::FxHashMap;
use tz_oracle::{
    runner::{LogReporter, Reporter},
    CaseRunner, RuleTable, RunOutcome, RunnerOptions, ZoneCases,
};

/// Counts verdicts and forwards them to the log.
#[derive(Debug, Default)]
struct ConsoleReporter {
    passed: AtomicUsize,
    failed: AtomicUsize,
}

impl Reporter for ConsoleReporter {
    fn report(&self, passed: bool, description: &str) {
        let counter = if passed { &self.passed } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
        LogReporter.report(passed, description);
    }
}

/// Verify test vector files against a table of offset regimes.
#[derive(Debug, Parser)]
#[command(name = "tzcheck", version)]
struct Args {
    /// Evaluate vectors on the current thread only.
    #[arg(long)]
    serial: bool,

    /// Regime file: JSON records (`.json`) or zoneinfo source.
    regimes: PathBuf,

    /// Vector files to verify.
    #[arg(required = true)]
    vectors: Vec<PathBuf>,
}

/// Program entry point.
fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let args = Args::parse();
    let table = load_table(&args.regimes)?;

    let cases = args
        .vectors
        .iter()
        .map(|path| {
            ZoneCases::from_filepath(path)
                .map_err(|err| eyre!("{err}"))
                .wrap_err_with(|| format!("could not read vector file `{}`", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let reporter = ConsoleReporter::default();
    let outcome = CaseRunner::new(&table, &reporter)
        .with_options(RunnerOptions {
            parallel: !args.serial,
            ..RunnerOptions::default()
        })
        .run(&cases);

    info!(
        "reported {} passed, {} failed",
        reporter.passed.load(Ordering::Relaxed),
        reporter.failed.load(Ordering::Relaxed)
    );
    summarize(&outcome)
}

fn load_table(path: &Path) -> Result<RuleTable> {
    info!("Loading regimes from `{}`...", path.display());
    let load = RuleTable::from_filepath(path)
        .map_err(|err| eyre!("{err}"))
        .wrap_err_with(|| format!("could not load regimes from `{}`", path.display()))?;
    for (zone, err) in &load.rejected {
        warn!("Rejected zone `{zone}`: {err}");
    }
    info!(
        "Loaded {} zones ({} rejected)",
        load.table.len(),
        load.rejected.len()
    );
    Ok(load.table)
}

fn summarize(outcome: &RunOutcome) -> Result<()> {
    let mut per_zone = FxHashMap::<&str, usize>::default();
    for failure in outcome.failures() {
        println!("{failure}");
        *per_zone.entry(failure.zone.as_str()).or_default() += 1;
    }

    let mut zones = per_zone.into_iter().collect::<Vec<_>>();
    zones.sort_unstable();
    for (zone, count) in zones {
        println!("  {zone}: {count} failed");
    }

    println!("{outcome}");
    if !outcome.is_success() {
        bail!("{} of {} vectors failed", outcome.failures().len(), outcome.total());
    }
    Ok(())
}
