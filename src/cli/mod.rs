//! CLI module for docqa
//!
//! Provides command-line interface parsing for the docqa binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docqa - question answering over your documents
///
/// Ingests text, Markdown and CSV files, indexes them for similarity
/// search and answers questions with a local LLM.
#[derive(Parser, Debug)]
#[command(
    name = "docqa",
    version,
    about = "docqa - question answering over your documents",
    long_about = "Ingests documents, builds an in-memory vector index over their chunks\n\
                  and answers questions from the most relevant chunks using an LLM.",
    after_help = "EXAMPLES:\n    \
                  docqa init                               # Write a default docqa.toml\n    \
                  docqa ask notes.md -q \"What is X?\"       # Answer one question\n    \
                  docqa ask docs/*.txt                     # Interactive session\n    \
                  docqa retrieve data.csv -q \"revenue\" -k 3 # Show matching chunks only\n    \
                  docqa config --validate                  # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default docqa.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing docqa.toml
        #[arg(short, long)]
        force: bool,
    },

    /// Index documents and answer questions about them
    ///
    /// Without --query, questions are read from standard input, one per line.
    Ask {
        /// Documents to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Question to answer (repeatable)
        #[arg(short, long)]
        query: Vec<String>,

        /// Number of chunks to use as context
        #[arg(short = 'k', long, value_parser = clap::value_parser!(u64).range(1..))]
        top_k: Option<u64>,

        /// Print the chunks used to answer
        #[arg(long)]
        show_chunks: bool,
    },

    /// Index documents and print the chunks most similar to a query
    Retrieve {
        /// Documents to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Query to search for
        #[arg(short, long)]
        query: String,

        /// Number of chunks to return
        #[arg(short = 'k', long, value_parser = clap::value_parser!(u64).range(1..))]
        top_k: Option<u64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration information
    Config {
        /// Show the full effective configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Convert a parsed `--top-k` value.
pub fn top_k(value: Option<u64>) -> Option<usize> {
    value.map(|k| usize::try_from(k).unwrap_or(usize::MAX))
}
