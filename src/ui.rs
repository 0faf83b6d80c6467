//! Console rendering for sync reports.

use colored::Colorize;
use reconcile::{StageReport, SyncReport};

pub fn display_dry_run_banner() {
    println!();
    println!(
        "{}",
        "[DRY RUN MODE] No changes will be applied".yellow().bold()
    );
}

/// Render one instance's sync report.
pub fn display_report(instance: &str, report: &SyncReport, dry_run: bool) {
    println!();
    println!(
        "┌─ {} ─ {} ─────────────────────────────────┐",
        "Sync Report".bold(),
        instance.bold()
    );
    println!("│");

    if report.stages.is_empty() && report.failures.is_empty() {
        println!("│   {}", "nothing declared for this instance".dimmed());
    }

    for stage in &report.stages {
        println!(
            "│   {} {:<25} {}{}",
            stage_marker(stage),
            stage.resource,
            stage.summary.dimmed(),
            failure_suffix(stage)
        );
    }

    for failure in &report.failures {
        println!("│   {} {}", "✗".red(), failure.red());
    }

    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    let verb = if dry_run { "planned" } else { "applied" };
    let failed: usize = report.stages.iter().map(|s| s.failed).sum();
    println!(
        "│ Summary: {} change(s) {verb}, {} failed, {} stage error(s)",
        report.total_changes().to_string().bold(),
        if failed > 0 {
            failed.to_string().red().to_string()
        } else {
            failed.to_string().green().to_string()
        },
        report.failures.len()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn stage_marker(stage: &StageReport) -> colored::ColoredString {
    if stage.failed > 0 {
        "✗".red()
    } else if stage.changes() > 0 {
        "~".yellow()
    } else {
        "✓".green()
    }
}

fn failure_suffix(stage: &StageReport) -> String {
    if stage.failed > 0 {
        format!(" [{} failed]", stage.failed).red().to_string()
    } else {
        String::new()
    }
}
