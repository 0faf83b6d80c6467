mod cli;
mod commands;
mod config;
mod creds;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    match cli.command {
        Command::Sync(args) => commands::sync::run(&args),
        Command::Validate(args) => commands::validate::run(&args),
        Command::Import(args) => commands::import::run(&args),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "declarr", &mut io::stdout());
            Ok(())
        }
    }
}
