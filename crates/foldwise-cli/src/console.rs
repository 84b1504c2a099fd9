//! CLI console utilities

use colored::*;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
    progress_bar: Option<ProgressBar>,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress_bar: None,
        }
    }

    /// Print an info message (verbose only)
    pub fn info(&self, message: &str) {
        if self.verbose {
            println!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message.green());
    }

    pub fn warn(&self, message: &str) {
        println!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.len()).dimmed());
    }

    /// Print a `label: value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("{:>14}: {}", label.cyan(), value);
    }

    /// Start a spinner; only shown on an interactive terminal
    pub fn start_progress(&mut self, message: &str) {
        if !Term::stdout().is_term() {
            return;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.progress_bar = Some(pb);
    }

    pub fn finish_progress(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    pub fn print_table_header(&self, headers: &[&str]) {
        let header_line = headers
            .iter()
            .map(|h| format!("{:>10}", h))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{}", header_line.bold());
        println!("{}", "-".repeat(header_line.len()).dimmed());
    }

    pub fn print_table_row(&self, cells: &[String]) {
        let row_line = cells
            .iter()
            .map(|c| format!("{:>10}", c))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{row_line}");
    }

    /// Print JSON in a formatted way
    pub fn print_json(&self, json: &serde_json::Value) {
        match serde_json::to_string_pretty(json) {
            Ok(formatted) => println!("{formatted}"),
            Err(_) => println!("{json}"),
        }
    }
}

impl Default for CliConsole {
    fn default() -> Self {
        Self::new(false)
    }
}
