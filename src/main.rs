use anyhow::{Context, Result};
use docqa::cli::{self, init, output::Output, Cli, Commands};
use docqa::pipeline::{IngestReport, Pipeline};
use docqa::utils::toml_config::{DocqaConfig, LogFormat};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Commands::Init { path, force } = &cli.command {
        return match init::run(path, *force, &output) {
            init::InitResult::Error(e) => Err(anyhow::anyhow!(e)),
            _ => Ok(()),
        };
    }

    let config = DocqaConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config, cli.verbose);

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config { full, validate } => {
            show_config(&cli.config, &config, full, validate, &output)
        }
        Commands::Retrieve {
            files,
            query,
            top_k,
            json,
        } => {
            let pipeline = Pipeline::retrieval_only(&config)?;
            ingest(&pipeline, &files, &output, json).await?;

            let chunks = pipeline.retrieve(&query, cli::top_k(top_k)).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "query": query,
                        "top_chunks": chunks,
                    }))?
                );
            } else {
                output.header(&format!("Top {} chunks", chunks.len()));
                for (i, chunk) in chunks.iter().enumerate() {
                    output.chunk(i + 1, chunk);
                }
            }
            Ok(())
        }
        Commands::Ask {
            files,
            query,
            top_k,
            show_chunks,
        } => {
            let pipeline = Pipeline::from_config(&config).await?;
            ingest(&pipeline, &files, &output, false).await?;
            let top_k = cli::top_k(top_k);

            if !query.is_empty() {
                for question in &query {
                    answer(&pipeline, question, top_k, show_chunks, &output).await;
                }
                return Ok(());
            }

            output.hint("Ask a question, or press Ctrl-D to quit");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                output.prompt();
                let Some(line) = lines.next_line().await? else {
                    break;
                };
                let question = line.trim();
                if !question.is_empty() {
                    answer(&pipeline, question, top_k, show_chunks, &output).await;
                }
            }
            output.newline();
            Ok(())
        }
    }
}

fn init_tracing(config: &DocqaConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docqa={level},docqa_vector={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn ingest(
    pipeline: &Pipeline,
    files: &[PathBuf],
    output: &Output,
    quiet: bool,
) -> Result<IngestReport> {
    let report = pipeline.ingest_files(files).await?;
    if quiet {
        return Ok(report);
    }

    for failure in &report.failures {
        output.warning(&format!(
            "Skipped {}: {}",
            failure.path.display(),
            failure.error
        ));
    }
    output.success(&format!(
        "Indexed {} chunks from {} file(s)",
        report.num_chunks,
        report.parsed.len()
    ));
    Ok(report)
}

async fn answer(
    pipeline: &Pipeline,
    question: &str,
    top_k: Option<usize>,
    show_chunks: bool,
    output: &Output,
) {
    match pipeline.ask(question, top_k).await {
        Ok(answer) => {
            if show_chunks {
                output.subheader("Context");
                for (i, chunk) in answer.used_chunks.iter().enumerate() {
                    output.chunk(i + 1, chunk);
                }
            }
            output.answer(&answer.answer);
        }
        // One failed question does not end the session.
        Err(e) => output.error(&e.to_string()),
    }
}

fn show_config(
    path: &Path,
    config: &DocqaConfig,
    full: bool,
    validate: bool,
    output: &Output,
) -> Result<()> {
    output.header("Configuration");
    output.kv(
        "File",
        &if path.exists() {
            path.display().to_string()
        } else {
            format!("{} (not found, using defaults)", path.display())
        },
    );
    output.kv(
        "Chunking",
        &format!(
            "{} chars, {} overlap",
            config.rag.chunk_size, config.rag.chunk_overlap
        ),
    );
    output.kv("Default top-k", &config.rag.default_top_k.to_string());
    output.kv(
        "Embedding",
        &format!("{:?}", config.embedding.provider).to_lowercase(),
    );
    let provider = config.llm.provider();
    output.kv("LLM", &format!("{} ({})", provider.name(), provider.model()));

    if validate {
        output.subheader("Validation");
        let warnings = config.validate_with_warnings()?;
        if warnings.is_empty() {
            output.success("Configuration is valid");
        } else {
            for warning in &warnings {
                output.warning(&warning.to_string());
            }
        }
    }

    if full {
        output.subheader("Effective configuration");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}
