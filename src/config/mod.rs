// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::io::CONFIG_FILE;
pub use self::types::{Config, CooccurrenceConfig, InputMode, RankConfig};

use std::path::Path;

use crate::error::{PairRankError, Result};
use crate::numeric::MAX_PRECISION;

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path`, or `pairrank.toml` in the working directory when `path` is
    /// `None`. A missing default file yields the default config.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => io::load_toml_config(p),
            None if Path::new(CONFIG_FILE).exists() => io::load_toml_config(Path::new(CONFIG_FILE)),
            None => Ok(Self::new()),
        }
    }

    /// Parses a config from TOML text.
    ///
    /// # Errors
    /// Returns error on malformed TOML or mistyped values.
    pub fn parse_toml(content: &str) -> Result<Self> {
        io::parse_toml(content)
    }

    /// Applies a single `key=value` override.
    ///
    /// # Errors
    /// Returns a configuration error for unknown keys or unparsable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        io::apply_override(self, key, value)
    }

    /// Applies a list of `key=value` assignments in order.
    ///
    /// # Errors
    /// Stops at the first assignment that fails.
    pub fn apply_assignments<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<()> {
        for assignment in assignments {
            io::apply_assignment(self, assignment.as_ref())?;
        }
        Ok(())
    }

    /// Saves the current configuration as TOML.
    ///
    /// # Errors
    /// Returns error if file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        io::save_to_file(self, path)
    }

    /// Validates ranges before any job starts.
    ///
    /// # Errors
    /// Returns a configuration error naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(PairRankError::config(
                "precision",
                format!("{} exceeds the maximum of {MAX_PRECISION}", self.precision),
            ));
        }
        if self.reducer_count == 0 {
            return Err(PairRankError::config("reducerCount", "must be at least 1"));
        }
        if self.cooccurrence.neighbour_distance == 0 {
            return Err(PairRankError::config("neighbourDistance", "must be at least 1"));
        }
        let d = self.rank.damping_factor;
        if !(0.0..=1.0).contains(&d) {
            return Err(PairRankError::config(
                "dampingFactor",
                format!("{d} is outside [0, 1]"),
            ));
        }
        if self.rank.max_iterations == 0 {
            return Err(PairRankError::config("maxIterations", "must be at least 1"));
        }
        Ok(())
    }
}
