//! Password policy CLI commands.

use clap::{Args, Subcommand};

use shipdesk_auth::UserInfo;
use shipdesk_core::SecurityResult;
use shipdesk_service::SecurityStore;

use crate::output::{self, OutputFormat};

/// Arguments for password commands
#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Password subcommand
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands
#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Generate a policy-compliant password
    Generate {
        /// Password length
        #[arg(short, long, default_value = "16")]
        length: usize,
    },
    /// Validate a password against the current policy
    Validate {
        /// The password to check
        password: String,
        /// User email, for the user-info check
        #[arg(long)]
        email: Option<String>,
        /// User first name, for the user-info check
        #[arg(long)]
        first_name: Option<String>,
        /// User last name, for the user-info check
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Show the current password policy
    Policy,
}

/// Execute password commands
pub fn execute(
    args: &PasswordArgs,
    store: &SecurityStore,
    format: OutputFormat,
) -> SecurityResult<()> {
    match &args.command {
        PasswordCommand::Generate { length } => {
            println!("{}", store.engine.generate_password(*length));
        }
        PasswordCommand::Validate {
            password,
            email,
            first_name,
            last_name,
        } => {
            let user_info = (email.is_some() || first_name.is_some() || last_name.is_some())
                .then(|| UserInfo {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    email: email.clone(),
                });
            let result = store.engine.validate(password, user_info.as_ref());

            match format {
                OutputFormat::Json => output::print_item(&result, format),
                OutputFormat::Table => {
                    output::print_kv("valid", &result.is_valid.to_string());
                    output::print_kv("score", &result.score.to_string());
                    output::print_kv("strength", &result.strength.to_string());
                    for error in &result.errors {
                        output::print_error(error);
                    }
                }
            }
        }
        PasswordCommand::Policy => {
            output::print_item(&store.engine.policy(), format);
        }
    }

    Ok(())
}
