//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(
    name = "declarr",
    version,
    about = "Configuration-as-code for Sonarr-style media servers",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sync declared configuration to the servers
    Sync(SyncArgs),
    /// Validate the configuration file
    Validate(ValidateArgs),
    /// Import a live server's configuration into YAML
    Import(ImportArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
pub struct SyncArgs {
    /// Path to the config file
    #[arg(short, long, default_value = "config/declarr.yaml")]
    pub config: String,

    /// Compute and show changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the pre-sync backup (not recommended)
    #[arg(long)]
    pub no_backup: bool,

    /// Directory for pre-sync backups
    #[arg(long, default_value = "backups")]
    pub backup_dir: String,

    /// Only sync the named instance
    #[arg(long)]
    pub instance: Option<String>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the config file
    #[arg(short, long, default_value = "config/declarr.yaml")]
    pub config: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Server URL (e.g. http://localhost:8989)
    #[arg(short, long)]
    pub url: String,

    /// API key for the server
    #[arg(short = 'k', long, env = "SONARR_API_KEY")]
    pub api_key: String,

    /// Output file path
    #[arg(short, long, default_value = "config/imported-sonarr.yaml")]
    pub output: String,

    /// Instance name in the generated config
    #[arg(short, long, default_value = "main-sonarr")]
    pub name: String,

    /// Include API keys and passwords in the output (not recommended)
    #[arg(long)]
    pub include_secrets: bool,
}
