//! Init command implementation
//!
//! Writes a commented `docqa.toml` holding the default settings.

use super::output::Output;
use crate::utils::toml_config::DEFAULT_CONFIG_FILE;
use std::fs;
use std::path::Path;

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// docqa.toml already exists
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Run the init command
pub fn run(path: &Path, force: bool, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing docqa");

    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !force {
        output.warning(&format!("{} already exists!", DEFAULT_CONFIG_FILE));
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists;
    }

    if !path.exists() {
        if let Err(e) = fs::create_dir_all(path) {
            output.error(&format!("Failed to create {}: {}", path.display(), e));
            return InitResult::Error(e.to_string());
        }
        output.created_dir(&path.display().to_string());
    }

    if let Err(e) = fs::write(&config_path, generate_docqa_toml()) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", &config_path.display().to_string());

    output.complete("Ready to go");
    output.hint("Start an interactive session with:");
    output.command("docqa ask <FILES>...");

    InitResult::Success
}

fn generate_docqa_toml() -> String {
    r#"# docqa configuration

[logging]
# trace, debug, info, warn, error or off. RUST_LOG overrides this.
level = "info"
# "pretty" or "json"
format = "pretty"

[rag]
# Chunk window length and overlap, in characters
chunk_size = 500
chunk_overlap = 100
# Chunks retrieved per question when --top-k is not given
default_top_k = 8

[embedding]
# "hash" (built in) or "fastembed" (needs the local-embeddings feature)
provider = "hash"
dimensions = 384
model = "sentence-transformers/all-MiniLM-L6-v2"

[llm]
provider = "ollama"
base_url = "http://localhost:11434"
model = "llama3.2"
temperature = 0.3
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::DocqaConfig;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_is_default() {
        let config = DocqaConfig::parse(&generate_docqa_toml()).unwrap();
        assert_eq!(config, DocqaConfig::default());
    }

    #[test]
    fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        let result = run(dir.path(), false, &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(dir.path().join(DEFAULT_CONFIG_FILE).exists());
    }

    #[test]
    fn test_init_respects_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "# mine").unwrap();

        assert_eq!(
            run(dir.path(), false, &Output::no_color()),
            InitResult::AlreadyExists
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        assert_eq!(run(dir.path(), true, &Output::no_color()), InitResult::Success);
        assert_ne!(fs::read_to_string(&path).unwrap(), "# mine");
    }
}
