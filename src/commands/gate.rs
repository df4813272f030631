//! Login-attempt gate CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};

use shipdesk_core::SecurityResult;
use shipdesk_service::SecurityStore;

use crate::output::{self, OutputFormat};

/// Arguments for gate commands
#[derive(Debug, Args)]
pub struct GateArgs {
    /// Gate subcommand
    #[command(subcommand)]
    pub command: GateCommand,
}

/// Gate subcommands
#[derive(Debug, Subcommand)]
pub enum GateCommand {
    /// Show lockout status for an identity
    Status {
        /// Identity (email)
        identity: String,
    },
    /// Drop stale, unlocked attempt records
    Prune,
}

/// Execute gate commands
pub fn execute(args: &GateArgs, store: &SecurityStore, format: OutputFormat) -> SecurityResult<()> {
    match &args.command {
        GateCommand::Status { identity } => match store.gate.locked_until(identity) {
            Some(until) => {
                output::print_kv("identity", identity);
                output::print_kv("locked", "true");
                output::print_kv("until", &until.to_rfc3339());
            }
            None => {
                let record = store
                    .gate
                    .snapshot()
                    .attempts
                    .into_iter()
                    .find(|r| &r.identity == identity);
                match (record, format) {
                    (Some(record), OutputFormat::Json) => output::print_item(&record, format),
                    (Some(record), OutputFormat::Table) => {
                        output::print_kv("identity", identity);
                        output::print_kv("locked", "false");
                        output::print_kv("failed attempts", &record.fail_count.to_string());
                        output::print_kv("last attempt", &record.last_attempt_at.to_rfc3339());
                    }
                    (None, _) => println!("No attempts recorded for '{identity}'."),
                }
            }
        },
        GateCommand::Prune => {
            let removed = store.gate.prune(Utc::now());
            output::print_success(&format!("Pruned {} stale attempt records", removed));
        }
    }

    Ok(())
}
