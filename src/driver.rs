// src/driver.rs
//! End-to-end jobs: validate config, read input, run, order output.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::cooccur::{pairs, stripes, ScoredPair, Settings};
use crate::emit::{Emitter, OutputRecord};
use crate::error;
use crate::input;
use crate::mapreduce::JobReport;
use crate::rank::{BuildReport, RankEngine, RankOutcome, RankSettings};

/// Which co-occurrence strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Pairs,
    Stripes,
}

impl Strategy {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pairs => "pairs",
            Self::Stripes => "stripes",
        }
    }
}

/// Result of a co-occurrence job.
#[derive(Debug, Clone)]
pub struct CooccurrenceOutput {
    pub records: Vec<OutputRecord>,
    pub report: JobReport,
}

/// Result of a rank job.
#[derive(Debug, Clone)]
pub struct RankOutput {
    pub records: Vec<OutputRecord>,
    pub build: BuildReport,
    pub outcome: RankOutcome,
    pub total_rank: f64,
}

/// Runs the pairs strategy over `input`.
///
/// # Errors
/// Returns error on invalid config, unreadable input or a failed job.
pub fn run_pairs(config: &Config, input: &Path) -> Result<CooccurrenceOutput> {
    run_cooccurrence(config, input, Strategy::Pairs, true)
}

/// Runs the stripes strategy over `input`.
///
/// # Errors
/// Returns error on invalid config, unreadable input or a failed job.
pub fn run_stripes(config: &Config, input: &Path) -> Result<CooccurrenceOutput> {
    run_cooccurrence(config, input, Strategy::Stripes, true)
}

/// Runs a co-occurrence job, optionally with the combiner.
///
/// # Errors
/// Returns error on invalid config, unreadable input or a failed job.
pub fn run_cooccurrence(
    config: &Config,
    input: &Path,
    strategy: Strategy,
    combine: bool,
) -> Result<CooccurrenceOutput> {
    config.validate().context("Invalid configuration")?;

    let shards = input::read_text_shards(input, config.cooccurrence.input_mode)
        .with_context(|| format!("Failed to read input {}", input.display()))?;
    if shards.is_empty() {
        bail!("No input files found under {}", input.display());
    }

    let settings = Settings::from_config(config);
    let (pairs, report) = run_strategy(strategy, &shards, &settings, config.reducer_count, combine)
        .with_context(|| format!("{} job failed", strategy.name()))?;

    log_report(&report);
    Ok(CooccurrenceOutput {
        records: Emitter::order_pairs(pairs),
        report,
    })
}

fn run_strategy(
    strategy: Strategy,
    shards: &[input::Shard],
    settings: &Settings,
    partitions: usize,
    combine: bool,
) -> error::Result<(Vec<(ScoredPair, f64)>, JobReport)> {
    match strategy {
        Strategy::Pairs => pairs::run(shards, settings, partitions, combine),
        Strategy::Stripes => stripes::run(shards, settings, partitions, combine),
    }
}

fn log_report(report: &JobReport) {
    if report.groups_skipped > 0 {
        warn!(
            job = %report.name,
            skipped = report.groups_skipped,
            "Some groups were skipped due to data integrity errors"
        );
    }
    info!(
        job = %report.name,
        shards = report.shards,
        records = report.records_read,
        emitted = report.records_emitted,
        "Job finished"
    );
}

/// Ranks the graph described by the edge lists under `input`.
///
/// # Errors
/// Returns error on invalid config, unreadable input or a rejected edge.
pub fn run_rank(config: &Config, input: &Path) -> Result<RankOutput> {
    config.validate().context("Invalid configuration")?;

    let shards = input::read_edge_shards(input)
        .with_context(|| format!("Failed to read edges from {}", input.display()))?;

    let run = RankEngine::run(&shards, RankSettings::from_config(config)).context("rank job failed")?;
    if run.build.malformed > 0 {
        warn!(malformed = run.build.malformed, "Malformed edge lines were skipped");
    }

    Ok(RankOutput {
        records: Emitter::order_ranks(run.ranked()),
        total_rank: run.graph.total_rank(),
        build: run.build,
        outcome: run.outcome,
    })
}

/// Renders output records in the configured format.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn render(config: &Config, records: &[OutputRecord]) -> Result<String> {
    Emitter::new(config.format, config.precision)
        .render(records)
        .context("Failed to render output")
}
