//! Backup CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use shipdesk_core::SecurityResult;
use shipdesk_core::config::BackupKind;
use shipdesk_service::SecurityStore;

use crate::output::{self, OutputFormat};

/// Arguments for backup commands
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Backup subcommand
    #[command(subcommand)]
    pub command: BackupCommand,
}

/// CLI-facing backup kind selector
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Users, config, and security together
    Full,
    /// Collaborator user state
    Users,
    /// Password policy and backup configuration
    Config,
    /// Audit log and gate state
    Security,
}

impl From<KindArg> for BackupKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Full => Self::Full,
            KindArg::Users => Self::Users,
            KindArg::Config => Self::Config,
            KindArg::Security => Self::Security,
        }
    }
}

/// Backup subcommands
#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Create a new backup
    Create {
        /// Which state subset to capture
        #[arg(value_enum, default_value = "full")]
        kind: KindArg,
    },
    /// List retained backups
    List,
    /// Restore a backup into live state
    Restore {
        /// Backup id
        id: Uuid,
    },
    /// Delete a backup
    Delete {
        /// Backup id
        id: Uuid,
    },
    /// Export a backup to a JSON file
    Export {
        /// Backup id
        id: Uuid,
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Import a backup from a JSON file
    Import {
        /// Input file path
        input: PathBuf,
    },
}

/// Backup display row
#[derive(Debug, Serialize, Tabled)]
struct BackupRow {
    /// Id
    id: String,
    /// Created
    created: String,
    /// Kind
    kind: String,
    /// Size (bytes)
    size: u64,
}

/// Execute backup commands
pub fn execute(
    args: &BackupArgs,
    store: &SecurityStore,
    format: OutputFormat,
) -> SecurityResult<()> {
    match &args.command {
        BackupCommand::Create { kind } => {
            let backup = store.vault.create_backup((*kind).into())?;
            output::print_success(&format!(
                "Created {} backup {} ({} bytes)",
                backup.kind, backup.id, backup.size
            ));
        }
        BackupCommand::List => {
            let rows: Vec<BackupRow> = store
                .vault
                .list_backups()
                .into_iter()
                .map(|b| BackupRow {
                    id: b.id.to_string(),
                    created: b.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    kind: b.kind.to_string(),
                    size: b.size,
                })
                .collect();
            output::print_list(&rows, format);
        }
        BackupCommand::Restore { id } => {
            store.vault.restore(*id)?;
            output::print_success(&format!("Restored backup {}", id));
        }
        BackupCommand::Delete { id } => {
            store.vault.delete_backup(*id)?;
            output::print_success(&format!("Deleted backup {}", id));
        }
        BackupCommand::Export { id, output: path } => {
            store.vault.export_to_file(*id, path)?;
            output::print_success(&format!("Exported backup {} to '{}'", id, path.display()));
        }
        BackupCommand::Import { input } => {
            let backup = store.vault.import_from_file(input)?;
            output::print_success(&format!("Imported {} backup {}", backup.kind, backup.id));
        }
    }

    Ok(())
}
