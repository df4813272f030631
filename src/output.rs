//! Rendering helpers shared by the admin subcommands.
//!
//! Every subcommand that produces records renders them either as a
//! `tabled` table for interactive use or as pretty JSON for piping into
//! other tooling; the `--format` flag picks which.

use serde::Serialize;
use tabled::{Table, Tabled};

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for terminals.
    #[default]
    Table,
    /// Pretty-printed JSON for scripts.
    Json,
}

/// Renders a collection of records in the selected format.
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("(no matching records)"),
        OutputFormat::Table => println!("{}", Table::new(items)),
        OutputFormat::Json => match serde_json::to_string_pretty(items) {
            Ok(json) => println!("{json}"),
            Err(e) => print_error(&format!("failed to render output: {e}")),
        },
    }
}

/// Renders a single record in the selected format.
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{item:#?}"),
        OutputFormat::Json => match serde_json::to_string_pretty(item) {
            Ok(json) => println!("{json}"),
            Err(e) => print_error(&format!("failed to render output: {e}")),
        },
    }
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// One aligned `key: value` line for detail views.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {value}", format!("{key}:"));
}
