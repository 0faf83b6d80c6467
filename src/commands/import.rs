//! `declarr import` - generate a config file from a live server.

use crate::cli::ImportArgs;
use crate::config::AppConfig;
use anyhow::{Context as _, Result};
use arrkit::ArrClient;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

pub fn run(args: &ImportArgs) -> Result<()> {
    let client = ArrClient::new(&args.url, &args.api_key);

    log::info!("Connecting to {}...", args.url);
    client
        .ping()
        .with_context(|| format!("failed to connect to {}", args.url))?;
    log::info!("✓ Connected successfully");

    let instance =
        arrkit::import_instance(&client, &args.name, &args.api_key, args.include_secrets)?;
    let config = AppConfig {
        sonarr: vec![instance],
    };

    let output = PathBuf::from(shellexpand::tilde(&args.output).into_owned());
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(&config).context("could not serialize config")?;
    fs::write(&output, yaml).with_context(|| format!("could not write {}", output.display()))?;

    println!("{} Configuration written to {}", "✓".green(), output.display());
    if !args.include_secrets {
        println!(
            "  Secrets were replaced with ${{VAR}} placeholders; fill in the\n  referenced environment variables before syncing."
        );
    }
    Ok(())
}
