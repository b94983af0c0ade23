// tests/integration_pipeline.rs
//! End-to-end runs through the driver with files on disk.

use std::fs;
use std::path::Path;

use pairrank_core::config::{Config, InputMode};
use pairrank_core::driver::{self, Strategy};
use pairrank_core::emit::{OutputFormat, OutputRecord};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn corpus() -> TempDir {
    let d = tempfile::tempdir().unwrap();
    write(d.path(), "a.txt", "The cat sat on the cat mat.\n\nA dog sat on the mat.\n");
    write(d.path(), "b.txt", "the cat\nsat\n");
    write(d.path(), ".hidden", "ignored ignored ignored\n");
    d
}

#[test]
fn test_pairs_and_stripes_render_identically() {
    let d = corpus();
    let config = Config::default();
    let pairs = driver::run_pairs(&config, d.path()).unwrap();
    let stripes = driver::run_stripes(&config, d.path()).unwrap();

    assert_eq!(pairs.records, stripes.records);
    assert_eq!(pairs.report.shards, 2);
    assert_eq!(
        driver::render(&config, &pairs.records).unwrap(),
        driver::render(&config, &stripes.records).unwrap()
    );
    assert!(!pairs.records.iter().any(|r| r.key.starts_with("ignored")));
}

#[test]
fn test_text_output_lines() {
    let d = tempfile::tempdir().unwrap();
    let input = d.path().join("in.txt");
    fs::write(&input, "the cat sat on the cat mat").unwrap();

    let config = Config::default();
    let out = driver::run_pairs(&config, &input).unwrap();
    let text = driver::render(&config, &out.records).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "cat mat (1/2)\t0.50000",
            "cat sat (1/2)\t0.50000",
            "on the (1/1)\t1.00000",
            "sat on (1/1)\t1.00000",
            "the cat (2/2)\t1.00000",
        ]
    );
}

#[test]
fn test_line_mode_breaks_pairs_at_line_ends() {
    let d = tempfile::tempdir().unwrap();
    let input = d.path().join("in.txt");
    fs::write(&input, "the cat\nsat\n").unwrap();

    let mut config = Config::default();
    let paragraphs = driver::run_pairs(&config, &input).unwrap();
    config.cooccurrence.input_mode = InputMode::Lines;
    let lines = driver::run_pairs(&config, &input).unwrap();

    assert!(paragraphs.records.iter().any(|r| r.key == "cat sat (1/1)"));
    assert_eq!(lines.records, vec![OutputRecord::new("the cat (1/1)", 1.0)]);
}

#[test]
fn test_combiner_toggle_is_transparent() {
    let d = corpus();
    let mut config = Config::default();
    config.reducer_count = 3;
    for strategy in [Strategy::Pairs, Strategy::Stripes] {
        let with = driver::run_cooccurrence(&config, d.path(), strategy, true).unwrap();
        let without = driver::run_cooccurrence(&config, d.path(), strategy, false).unwrap();
        assert_eq!(with.records, without.records);
    }
}

#[test]
fn test_rank_pipeline_json() {
    let d = tempfile::tempdir().unwrap();
    write(d.path(), "edges.tsv", "# web\nA\tB\nB\tA\nB\tC\nC\tA\n");

    let mut config = Config::default();
    config.format = OutputFormat::Json;
    let out = driver::run_rank(&config, d.path()).unwrap();
    assert!(out.outcome.converged);
    assert_eq!(out.build.edges, 4);
    assert!((out.total_rank - 1.0).abs() < 1e-3);

    let json = driver::render(&config, &out.records).unwrap();
    let parsed: Vec<OutputRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, out.records);
    assert_eq!(parsed[0].key, "A");
}

#[test]
fn test_invalid_config_fails_before_reading() {
    let mut config = Config::default();
    config.rank.damping_factor = 2.0;
    let err = driver::run_rank(&config, Path::new("/definitely/not/here")).unwrap_err();
    assert!(format!("{err:#}").contains("dampingFactor"));
}

#[test]
fn test_missing_input_is_reported() {
    let err = driver::run_pairs(&Config::default(), Path::new("/definitely/not/here")).unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here"));
}

#[test]
fn test_empty_directory_is_an_error() {
    let d = tempfile::tempdir().unwrap();
    assert!(driver::run_stripes(&Config::default(), d.path()).is_err());
}
