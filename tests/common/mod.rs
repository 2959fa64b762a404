// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Helper to run blastmux with the given arguments
pub fn run_blastmux(args: &[&str]) -> (String, String, i32) {
    // Use the built binary directly instead of cargo run to avoid compilation output
    let binary_path = if cfg!(debug_assertions) {
        "./target/debug/blastmux"
    } else {
        "./target/release/blastmux"
    };

    let output = Command::new(binary_path)
        .args(args)
        .output()
        .expect("Failed to start blastmux");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// A query file plus an output path inside one temp directory.
pub struct Workspace {
    pub dir: TempDir,
    pub query: PathBuf,
    pub out: PathBuf,
}

impl Workspace {
    pub fn with_queries(content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let query = dir.path().join("queries.fa");
        let out = dir.path().join("results.txt");
        fs::write(&query, content).expect("Failed to write query file");
        Self { dir, query, out }
    }

    /// Run blastmux over this workspace with `tool` as the search command.
    pub fn run(&self, options: &[&str], tool: &[&str]) -> (String, String, i32) {
        let query = path_str(&self.query);
        let out = path_str(&self.out);
        let mut args: Vec<&str> = options.to_vec();
        args.extend_from_slice(tool);
        args.extend_from_slice(&["-query", &query, "-out", &out]);
        let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
        run_blastmux(&refs)
    }

    pub fn output(&self) -> String {
        fs::read_to_string(&self.out).expect("Failed to read output file")
    }
}

fn path_str(path: &Path) -> String {
    path.to_str().expect("temp path is not UTF-8").to_string()
}

/// One FASTA record of roughly `size` bytes including terminators, payload
/// wrapped at 60 columns.
pub fn fasta_record(id: usize, size: usize) -> String {
    let header = format!(">query_{}\n", id);
    let mut record = header;
    let mut remaining = size.saturating_sub(record.len());
    while remaining > 0 {
        let width = remaining.saturating_sub(1).min(60).max(1);
        for i in 0..width {
            record.push(b"acgt"[i % 4] as char);
        }
        record.push('\n');
        remaining = remaining.saturating_sub(width + 1);
    }
    record
}

/// Split concatenated FASTA text back into whole records.
pub fn split_records(text: &str) -> Vec<String> {
    let mut records: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.starts_with('>') || records.is_empty() {
            records.push(String::new());
        }
        let current = records.last_mut().expect("at least one record");
        current.push_str(line);
        current.push('\n');
    }
    records
}
