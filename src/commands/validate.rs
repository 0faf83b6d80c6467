//! `declarr validate` - check the config file without touching any server.

use crate::cli::ValidateArgs;
use crate::config;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub fn run(args: &ValidateArgs) -> Result<()> {
    let path = PathBuf::from(shellexpand::tilde(&args.config).into_owned());
    log::info!("Validating config file: {}", path.display());

    let config = config::load_config(&path)?;

    println!("{} Config validation successful", "✓".green());
    println!("  Found {} Sonarr instance(s)", config.sonarr.len());
    for instance in &config.sonarr {
        println!("    - {}", instance.name);
    }
    Ok(())
}
