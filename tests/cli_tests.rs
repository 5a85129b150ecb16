//! CLI integration tests for docqa
//!
//! Runs the built binary for the commands that do not need an LLM server:
//! help, version, init, config and retrieve.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run docqa with arguments inside `dir`, with colors and env logging disabled.
fn run_docqa(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docqa"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute docqa")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = run_docqa(&["--help"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage"));
    for command in ["init", "ask", "retrieve", "config"] {
        assert!(text.contains(command), "missing {}", command);
    }
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = run_docqa(&["--version"], dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("docqa"));
}

#[test]
fn test_ask_requires_files() {
    let dir = TempDir::new().unwrap();
    let output = run_docqa(&["ask"], dir.path());

    assert!(!output.status.success());
}

#[test]
fn test_zero_top_k_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run_docqa(&["retrieve", "a.txt", "-q", "x", "-k", "0"], dir.path());

    assert!(!output.status.success());
}

// =============================================================================
// Init Command Tests
// =============================================================================

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();
    let output = run_docqa(&["--no-color", "init"], dir.path());

    assert!(output.status.success());
    let config = fs::read_to_string(dir.path().join("docqa.toml")).unwrap();
    assert!(config.contains("[rag]"));
    assert!(config.contains("chunk_size = 500"));
}

#[test]
fn test_init_keeps_existing_config_without_force() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("docqa.toml");
    fs::write(&path, "# custom\n").unwrap();

    let output = run_docqa(&["--no-color", "init"], dir.path());
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&path).unwrap(), "# custom\n");

    let output = run_docqa(&["--no-color", "init", "--force"], dir.path());
    assert!(output.status.success());
    assert!(fs::read_to_string(&path).unwrap().contains("[llm]"));
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_validate_defaults() {
    let dir = TempDir::new().unwrap();
    let output = run_docqa(&["--no-color", "config", "--validate"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("not found, using defaults"));
    if cfg!(feature = "ollama") {
        assert!(text.contains("Configuration is valid"));
    } else {
        assert!(text.contains("requires the 'ollama' feature"));
    }
}

#[test]
fn test_config_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("docqa.toml"),
        "[rag]\nchunk_size = 10\nchunk_overlap = 10\n",
    )
    .unwrap();

    let output = run_docqa(&["--no-color", "config"], dir.path());

    assert!(!output.status.success());
}

// =============================================================================
// Retrieve Command Tests
// =============================================================================

#[test]
fn test_retrieve_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("notes.txt"),
        "Invoices are due within thirty days. Late invoices incur a fee.",
    )
    .unwrap();

    let output = run_docqa(
        &[
            "--no-color",
            "retrieve",
            "notes.txt",
            "--query",
            "When are invoices due?",
            "--top-k",
            "1",
            "--json",
        ],
        dir.path(),
    );

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["query"], "When are invoices due?");
    assert_eq!(value["top_chunks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_retrieve_with_only_unsupported_files_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("deck.pptx"), "binary").unwrap();

    let output = run_docqa(
        &["--no-color", "retrieve", "deck.pptx", "--query", "anything"],
        dir.path(),
    );

    assert!(!output.status.success());
}
