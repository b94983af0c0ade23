// src/input/mod.rs
//! Input side of the jobs: file discovery, record readers and tokenization.

pub mod readers;
pub mod tokenize;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::InputMode;
use crate::error::{PairRankError, Result};

/// A map input record: an id (line number in its shard) and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub text: String,
}

impl Record {
    #[must_use]
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// The records of one input file. Each shard is mapped independently.
#[derive(Debug, Clone, Default)]
pub struct Shard {
    pub source: PathBuf,
    pub records: Vec<Record>,
}

/// Lists input files: the path itself if it is a file, or every regular file
/// below it (sorted) if it is a directory. Hidden files are ignored.
///
/// # Errors
/// Returns error if the path does not exist or the walk fails.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(PairRankError::io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "input not found"),
            path,
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry?;
        if entry.file_type().is_file() && !is_hidden(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Reads text shards using the configured record reader.
///
/// # Errors
/// Returns error if discovery or any file read fails.
pub fn read_text_shards(path: &Path, mode: InputMode) -> Result<Vec<Shard>> {
    read_shards(path, |text| match mode {
        InputMode::Lines => readers::lines(text),
        InputMode::Paragraphs => readers::paragraphs(text),
    })
}

/// Reads edge-list shards (`from TAB to` lines grouped by source).
///
/// # Errors
/// Returns error if discovery or any file read fails.
pub fn read_edge_shards(path: &Path) -> Result<Vec<Shard>> {
    read_shards(path, readers::edge_groups)
}

fn read_shards<F>(path: &Path, reader: F) -> Result<Vec<Shard>>
where
    F: Fn(&str) -> Vec<Record>,
{
    discover(path)?
        .into_iter()
        .map(|file| {
            let text = fs::read_to_string(&file).map_err(|e| PairRankError::io(e, &file))?;
            Ok(Shard {
                records: reader(&text),
                source: file,
            })
        })
        .collect()
}
