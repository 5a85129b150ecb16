//! Colored output helpers for CLI
//!
//! Status lines, section headers and the answer/chunk views of the docqa
//! CLI. Every method has a plain fallback used with `--no-color`.

use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the docqa banner
    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n   {} {}\n", "docqa".bright_cyan().bold(), version.dimmed());
        } else {
            println!("\n   docqa {}\n", version);
        }
    }

    /// One status line: a colored symbol, or a bracketed tag without colors.
    fn status(&self, symbol: &str, tag: &str, style: Style, message: &str) {
        if self.colored {
            println!("  {} {}", symbol.style(style.bold()), message.style(style));
        } else {
            println!("  [{}] {}", tag, message);
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        self.status("✓", "OK", Style::new().green(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.status("⚠", "WARN", Style::new().yellow(), message);
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, what: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                what.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", what, path);
        }
    }

    /// Print a directory creation message
    pub fn created_dir(&self, path: &str) {
        self.created("directory", path);
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a subheader
    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        let line = format!("$ {}", cmd);
        if self.colored {
            println!("     {}", line.bright_cyan());
        } else {
            println!("     {}", line);
        }
    }

    /// Print a closing message
    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print a generated answer, indented
    pub fn answer(&self, answer: &str) {
        if self.colored {
            println!("\n  {}", "Answer".bright_green().bold());
        } else {
            println!("\n  [ANSWER]");
        }
        for line in answer.trim().lines() {
            println!("    {}", line);
        }
    }

    /// Print a retrieved chunk on one line with its rank (1-based)
    pub fn chunk(&self, rank: usize, text: &str) {
        let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let rank = format!("{}.", rank);
        if self.colored {
            println!("    {} {}", rank.cyan().bold(), flattened);
        } else {
            println!("    {} {}", rank, flattened);
        }
    }

    /// Print the interactive question prompt (no newline)
    pub fn prompt(&self) {
        if self.colored {
            print!("\n  {} ", "?".bright_yellow().bold());
        } else {
            print!("\n  > ");
        }
        io::stdout().flush().ok();
    }

    /// Print newline
    pub fn newline(&self) {
        println!();
    }
}
