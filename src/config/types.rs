// src/config/types.rs
use serde::{Deserialize, Serialize};

use crate::emit::OutputFormat;
use crate::numeric::DEFAULT_PRECISION;

/// How raw text is cut into map input records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// One record per line.
    Lines,
    /// One record per run of non-blank lines.
    #[default]
    Paragraphs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooccurrenceConfig {
    /// Offset between a term and the neighbour it is paired with.
    #[serde(default = "default_neighbour_distance", alias = "neighbourDistance")]
    pub neighbour_distance: usize,
    #[serde(default, alias = "inputMode")]
    pub input_mode: InputMode,
    /// Term whose emissions are logged at `info` instead of `debug`.
    #[serde(default)]
    pub keyword: Option<String>,
    /// Pairs seen fewer times than this are not emitted.
    #[serde(default = "default_min_pair_count", alias = "minPairCount")]
    pub min_pair_count: u64,
}

impl Default for CooccurrenceConfig {
    fn default() -> Self {
        Self {
            neighbour_distance: default_neighbour_distance(),
            input_mode: InputMode::default(),
            keyword: None,
            min_pair_count: default_min_pair_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    #[serde(default = "default_damping_factor", alias = "dampingFactor")]
    pub damping_factor: f64,
    /// Safety bound; hitting it is reported as "did not converge".
    #[serde(default = "default_max_iterations", alias = "maxIterations")]
    pub max_iterations: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping_factor: default_damping_factor(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Job configuration, usually read from `pairrank.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Decimal places kept by every probability and rank.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Number of reduce partitions.
    #[serde(default = "default_reducer_count", alias = "reducerCount")]
    pub reducer_count: usize,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub cooccurrence: CooccurrenceConfig,
    #[serde(default)]
    pub rank: RankConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            reducer_count: default_reducer_count(),
            format: OutputFormat::default(),
            cooccurrence: CooccurrenceConfig::default(),
            rank: RankConfig::default(),
        }
    }
}

const fn default_neighbour_distance() -> usize { 1 }
const fn default_min_pair_count() -> u64 { 1 }
const fn default_damping_factor() -> f64 { 0.85 }
const fn default_max_iterations() -> usize { 100 }
const fn default_precision() -> u32 { DEFAULT_PRECISION }
const fn default_reducer_count() -> usize { 1 }
