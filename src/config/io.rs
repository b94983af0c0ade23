// src/config/io.rs
//! Reading config files and applying `key=value` overrides.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use super::types::{Config, InputMode};
use crate::emit::OutputFormat;
use crate::error::{PairRankError, Result};

pub const CONFIG_FILE: &str = "pairrank.toml";

pub fn load_toml_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| PairRankError::io(e, path))?;
    parse_toml(&content)
}

pub fn parse_toml(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

pub fn save_to_file(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| PairRankError::Other(format!("Failed to serialize config: {e}")))?;
    fs::write(path, content).map_err(|e| PairRankError::io(e, path))
}

/// Applies one override. Keys accept both the snake_case field names and the
/// camelCase job option names (`neighbourDistance`, `dampingFactor`, ...).
pub fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let value = value.trim();
    match key.trim() {
        "precision" => config.precision = parse_number(key, value)?,
        "reducer_count" | "reducerCount" | "reducers" => {
            config.reducer_count = parse_number(key, value)?;
        }
        "format" => config.format = parse_format(key, value)?,
        "neighbour_distance" | "neighbourDistance" | "neighbours" => {
            config.cooccurrence.neighbour_distance = parse_number(key, value)?;
        }
        "input_mode" | "inputMode" => config.cooccurrence.input_mode = parse_mode(key, value)?,
        "keyword" => {
            config.cooccurrence.keyword = (!value.is_empty()).then(|| value.to_lowercase());
        }
        "min_pair_count" | "minPairCount" => {
            config.cooccurrence.min_pair_count = parse_number(key, value)?;
        }
        "damping_factor" | "dampingFactor" => config.rank.damping_factor = parse_number(key, value)?,
        "max_iterations" | "maxIterations" => config.rank.max_iterations = parse_number(key, value)?,
        other => return Err(PairRankError::config(other, "unknown option")),
    }
    Ok(())
}

/// Splits `key=value` and applies it.
pub fn apply_assignment(config: &mut Config, assignment: &str) -> Result<()> {
    let Some((key, value)) = assignment.split_once('=') else {
        return Err(PairRankError::config(assignment, "expected `key=value`"));
    };
    apply_override(config, key, value)
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| PairRankError::config(key, format!("`{value}` is not a valid number ({e})")))
}

fn parse_mode(key: &str, value: &str) -> Result<InputMode> {
    match value.to_ascii_lowercase().as_str() {
        "lines" | "line" => Ok(InputMode::Lines),
        "paragraphs" | "paragraph" => Ok(InputMode::Paragraphs),
        _ => Err(PairRankError::config(key, format!("`{value}` is not `lines` or `paragraphs`"))),
    }
}

fn parse_format(key: &str, value: &str) -> Result<OutputFormat> {
    match value.to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(PairRankError::config(key, format!("`{value}` is not `text` or `json`"))),
    }
}
