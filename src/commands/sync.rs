//! `declarr sync` - converge every declared instance onto its config.

use crate::cli::SyncArgs;
use crate::config::{self, AppConfig};
use crate::creds;
use crate::ui;
use anyhow::{Context as _, Result, bail};
use arrkit::{ArrClient, InstanceConfig, backup};
use reconcile::{LogSink, Orchestrator, SyncReport};
use std::path::PathBuf;

/// Backups kept per directory after a sync.
const KEEP_BACKUPS: usize = 5;

pub fn run(args: &SyncArgs) -> Result<()> {
    let config_path = PathBuf::from(shellexpand::tilde(&args.config).into_owned());
    log::info!("Loading config: {}", config_path.display());
    let config = config::load_config(&config_path)?;

    let instances = select_instances(&config, args.instance.as_deref())?;

    if args.dry_run {
        ui::display_dry_run_banner();
    }

    let mut all_success = true;
    for instance in instances {
        match sync_instance(instance, args) {
            Ok(report) => {
                ui::display_report(&instance.name, &report, args.dry_run);
                if !report.is_success() {
                    log::warn!("⚠ Instance sync completed with errors: {}", instance.name);
                    all_success = false;
                }
            }
            Err(err) => {
                log::error!("✗ Failed to sync instance '{}': {err:#}", instance.name);
                all_success = false;
            }
        }
    }

    if !all_success {
        bail!("some instances completed with errors");
    }
    log::info!("✓ All instances synced successfully");
    Ok(())
}

fn select_instances<'a>(
    config: &'a AppConfig,
    only: Option<&str>,
) -> Result<Vec<&'a InstanceConfig>> {
    if config.sonarr.is_empty() {
        bail!("no instances declared in the config file");
    }
    match only {
        None => Ok(config.sonarr.iter().collect()),
        Some(name) => {
            let selected: Vec<&InstanceConfig> = config
                .sonarr
                .iter()
                .filter(|instance| instance.name == name)
                .collect();
            if selected.is_empty() {
                bail!("instance '{name}' not found in the config file");
            }
            Ok(selected)
        }
    }
}

fn sync_instance(instance: &InstanceConfig, args: &SyncArgs) -> Result<SyncReport> {
    log::info!("Syncing instance: {}", instance.name);

    let credentials = creds::resolve(instance)?;
    let client = ArrClient::new(&credentials.base_url, &credentials.api_key);

    // Connectivity or auth failure is fatal for the instance; nothing is
    // partially applied.
    log::info!("Testing connection to {}...", credentials.base_url);
    client
        .ping()
        .with_context(|| format!("connection test failed for instance '{}'", instance.name))?;
    log::info!("✓ Connection successful");

    if !args.dry_run && !args.no_backup {
        let backup_dir = PathBuf::from(shellexpand::tilde(&args.backup_dir).into_owned());
        match backup::create_backup(&client, &backup_dir, &instance.name) {
            Ok(_) => {
                if let Err(err) = backup::cleanup_old_backups(&backup_dir, KEEP_BACKUPS) {
                    log::warn!("Could not clean up old backups: {err}");
                }
            }
            Err(err) => {
                log::warn!("⚠ Failed to create backup, continuing with sync: {err}");
            }
        }
    }

    let mut context = arrkit::build_context(&client)?;
    let stages = arrkit::build_stages(&client, instance);
    let orchestrator = Orchestrator::new(stages);
    Ok(orchestrator.run(&mut context, args.dry_run, &mut LogSink))
}
