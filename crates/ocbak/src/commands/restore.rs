//! Restore command

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use dialoguer::Confirm;
use ocbak_backup::RestoreOptions;

use super::{load_config, read_passphrase, PASSPHRASE_ENV};
use crate::output;

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Archive to restore
    pub archive: Utf8PathBuf,

    /// Restore only these categories (repeatable)
    #[arg(long)]
    pub category: Vec<String>,

    /// Show what would be restored without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Environment variable holding the passphrase (prompted when unset)
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

pub async fn run(args: RestoreArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    output::header("Restore Backup");

    if !args.archive.exists() {
        anyhow::bail!("Backup file not found: {}", args.archive);
    }

    let config = load_config(config_path)?;
    let mut options = RestoreOptions::new().with_dry_run(args.dry_run);
    if !args.category.is_empty() {
        options = options.with_categories(args.category.clone());
    }
    // Reject unknown ids before asking for anything
    options.category_filter()?;

    output::kv("Archive", args.archive.as_str());
    output::kv("Target", config.base_dir()?.as_str());
    output::kv(
        "Categories",
        &if args.category.is_empty() {
            "all".to_string()
        } else {
            args.category.join(", ")
        },
    );
    if args.dry_run {
        output::warning("DRY RUN MODE - No files will be written");
    }
    println!();

    if !args.dry_run && !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Existing files will be overwritten. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Restore cancelled");
            return Ok(());
        }
    }

    let passphrase = read_passphrase(&args.passphrase_env, false)?;

    let spinner = output::spinner("Decrypting backup...");
    let result = ocbak_backup::restore(&args.archive, &passphrase, &config, options).await;
    spinner.finish_and_clear();
    let result = result?;

    if result.dry_run {
        output::success("Dry run complete");
    } else {
        output::success("Restore complete");
    }
    println!();
    output::kv("Created", &result.manifest.created_at);
    output::kv("Host", &result.manifest.hostname);
    output::kv(
        if result.dry_run { "Would restore" } else { "Restored" },
        &format!("{} files", result.file_count),
    );
    output::kv("Categories", &result.restored_categories.join(", "));
    output::kv("Duration", &format!("{:.1}s", result.duration_ms as f64 / 1000.0));

    if !result.failures.is_empty() {
        println!();
        output::warning(&format!("{} entries could not be restored:", result.failures.len()));
        for failure in &result.failures {
            println!("  {} {}", console::style(&failure.entry).yellow(), failure.reason);
        }
        anyhow::bail!("Restore finished with {} failures", result.failures.len());
    }

    Ok(())
}
