//! CLI command definitions and dispatch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use shipdesk_core::SecurityResult;
use shipdesk_core::config::SecurityConfig;
use shipdesk_service::SecurityStore;

use crate::output::OutputFormat;

pub mod audit;
pub mod backup;
pub mod gate;
pub mod password;

/// ShipDesk admin security CLI
#[derive(Debug, Parser)]
#[command(name = "shipdesk-admin", version, about = "Administer the ShipDesk security core")]
pub struct Cli {
    /// Configuration environment (selects config/<env>.toml)
    #[arg(long, global = true, default_value = "development")]
    pub env: String,

    /// Directory holding the durable security namespaces
    #[arg(long, global = true, default_value = "data/security")]
    pub data_dir: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Password policy operations
    Password(password::PasswordArgs),
    /// Audit log operations
    Audit(audit::AuditArgs),
    /// Backup operations
    Backup(backup::BackupArgs),
    /// Login-attempt gate operations
    Gate(gate::GateArgs),
}

impl Cli {
    /// Loads configuration, opens the store, and dispatches the command.
    pub fn execute(&self) -> SecurityResult<()> {
        let config = SecurityConfig::load(&self.env)?;
        let store = SecurityStore::open(&config, &self.data_dir)?;

        match &self.command {
            Command::Password(args) => password::execute(args, &store, self.format)?,
            Command::Audit(args) => audit::execute(args, &store, self.format)?,
            Command::Backup(args) => backup::execute(args, &store, self.format)?,
            Command::Gate(args) => gate::execute(args, &store, self.format)?,
        }

        store.persist()
    }
}
