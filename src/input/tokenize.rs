// src/input/tokenize.rs
use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not an ASCII letter, digit, whitespace or hyphen.
const NOISE_PATTERN: &str = r"[^a-z0-9\s-]";

static NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(NOISE_PATTERN).unwrap_or_else(|_| panic!("Invalid Regex")));

/// Splits a record into lowercase words.
///
/// Punctuation is dropped (so `don't` becomes `dont`) and hyphens separate
/// words (`well-known` becomes `well`, `known`).
#[must_use]
pub fn words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NOISE_RE.replace_all(&lowered, "");
    cleaned
        .split(|c: char| c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
