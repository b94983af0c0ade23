// src/input/readers.rs
//! Record readers: turn raw text into the `(id, text)` records fed to mappers.

use super::Record;

const COMMENT_PREFIX: char = '#';
const EDGE_SEPARATOR: char = '\t';
const GROUP_SEPARATOR: &str = ";";

/// One record per line; the id is the zero-based line number.
#[must_use]
pub fn lines(text: &str) -> Vec<Record> {
    text.lines()
        .enumerate()
        .map(|(i, line)| Record::new(i as u64, line))
        .collect()
}

/// One record per paragraph. Consecutive non-blank lines are joined with a
/// single space; blank lines end a paragraph. The id is the line number of
/// the paragraph's first line.
#[must_use]
pub fn paragraphs(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current: Option<(u64, String)> = None;

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if let Some((id, body)) = current.take() {
                records.push(Record::new(id, body));
            }
            continue;
        }
        match current.as_mut() {
            Some((_, body)) => {
                body.push(' ');
                body.push_str(line);
            }
            None => current = Some((i as u64, line.to_string())),
        }
    }

    if let Some((id, body)) = current {
        records.push(Record::new(id, body));
    }
    records
}

/// Groups `from TAB to` lines into one record per run of lines sharing the
/// same source node, joined by `;`. Blank lines and `#` comments are skipped.
#[must_use]
pub fn edge_groups(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut current: Option<(u64, String, Vec<&str>)> = None;

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let source = edge_source(trimmed);

        match current.as_mut() {
            Some((_, key, group)) if key.as_str() == source => group.push(trimmed),
            _ => {
                if let Some((id, _, group)) = current.take() {
                    records.push(Record::new(id, group.join(GROUP_SEPARATOR)));
                }
                current = Some((i as u64, source.to_string(), vec![trimmed]));
            }
        }
    }

    if let Some((id, _, group)) = current {
        records.push(Record::new(id, group.join(GROUP_SEPARATOR)));
    }
    records
}

fn edge_source(line: &str) -> &str {
    line.split(EDGE_SEPARATOR).next().unwrap_or(line).trim()
}
