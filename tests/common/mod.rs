//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod mocks;

use std::path::PathBuf;
use tempfile::TempDir;

/// Write `files` (name, contents) into a fresh temporary directory.
pub fn fixture_dir(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let paths = files
        .iter()
        .map(|(name, contents)| {
            let path = dir.path().join(name);
            std::fs::write(&path, contents).expect("Failed to write fixture");
            path
        })
        .collect();
    (dir, paths)
}
