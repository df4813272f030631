//! Audit log CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use shipdesk_audit::{EventFilter, SecurityAction};
use shipdesk_core::{SecurityError, SecurityResult};
use shipdesk_service::SecurityStore;

use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Search the audit log
    Search {
        /// Filter by action (e.g. ACCOUNT_LOCKED)
        #[arg(short, long)]
        action: Option<String>,
        /// Filter by actor (user ID)
        #[arg(long)]
        actor: Option<String>,
        /// Only denials
        #[arg(long)]
        failures: bool,
        /// Number of results
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Export the full audit buffer to a JSON file
    Export {
        /// Output file path
        #[arg(short, long, default_value = "audit_export.json")]
        output: String,
    },
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    /// Time
    time: String,
    /// Identity
    identity: String,
    /// Action
    action: String,
    /// Origin
    origin: String,
    /// Outcome
    success: bool,
}

/// Execute audit commands
pub fn execute(args: &AuditArgs, store: &SecurityStore, format: OutputFormat) -> SecurityResult<()> {
    match &args.command {
        AuditCommand::Search {
            action,
            actor,
            failures,
            limit,
        } => {
            let action = action
                .as_deref()
                .map(|a| {
                    a.parse::<SecurityAction>()
                        .map_err(SecurityError::Configuration)
                })
                .transpose()?;
            let actor_id = actor
                .as_deref()
                .map(|a| {
                    uuid::Uuid::parse_str(a)
                        .map_err(|e| SecurityError::Configuration(format!("invalid UUID: {e}")))
                })
                .transpose()?;

            let filter = EventFilter {
                action,
                actor_id,
                success: failures.then_some(false),
                ..Default::default()
            };

            let rows: Vec<AuditRow> = store
                .audit
                .query(&filter)
                .into_iter()
                .take(*limit)
                .map(|e| AuditRow {
                    time: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    identity: e.actor_email.unwrap_or_default(),
                    action: e.action.to_string(),
                    origin: e.origin.map(|ip| ip.to_string()).unwrap_or_default(),
                    success: e.success,
                })
                .collect();

            output::print_list(&rows, format);
        }
        AuditCommand::Export { output: out_path } => {
            let export = store.audit.export()?;
            std::fs::write(out_path, serde_json::to_string_pretty(&export)?)?;
            output::print_success(&format!(
                "Exported {} audit events to '{}'",
                store.audit.len(),
                out_path
            ));
        }
    }

    Ok(())
}
