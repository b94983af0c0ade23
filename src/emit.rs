// src/emit.rs
//! Final output: orders aggregated or ranked results and renders them as
//! `key<TAB>value` lines or as JSON.

use std::fmt::Write as _;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::cooccur::ScoredPair;
use crate::error::Result;
use crate::numeric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub key: String,
    pub value: f64,
}

impl OutputRecord {
    #[must_use]
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    format: OutputFormat,
    precision: u32,
}

impl Emitter {
    #[must_use]
    pub fn new(format: OutputFormat, precision: u32) -> Self {
        Self { format, precision }
    }

    /// Pair output: terms ascending, then each term's pairs best first.
    /// Partition outputs arrive in partition order, so they are re-sorted here.
    #[must_use]
    pub fn order_pairs(pairs: Vec<(ScoredPair, f64)>) -> Vec<OutputRecord> {
        let mut pairs = pairs;
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
            .into_iter()
            .map(|(pair, probability)| OutputRecord::new(pair.to_string(), probability))
            .collect()
    }

    /// Rank output, already ordered by descending rank then name.
    #[must_use]
    pub fn order_ranks(ranked: Vec<(String, f64)>) -> Vec<OutputRecord> {
        ranked
            .into_iter()
            .map(|(name, rank)| OutputRecord::new(name, rank))
            .collect()
    }

    /// Renders records in the configured format.
    ///
    /// # Errors
    /// Returns error if JSON serialization fails.
    pub fn render(&self, records: &[OutputRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.render_text(records)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        }
    }

    fn render_text(&self, records: &[OutputRecord]) -> String {
        let mut out = String::new();
        for record in records {
            let value = numeric::format_fixed(record.value, self.precision);
            let _ = writeln!(out, "{}\t{value}", record.key);
        }
        out
    }

    /// Renders and writes records to `writer`.
    ///
    /// # Errors
    /// Returns error if rendering or the write fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, records: &[OutputRecord]) -> Result<()> {
        let rendered = self.render(records)?;
        writer.write_all(rendered.as_bytes())?;
        if self.format == OutputFormat::Json {
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
