//! Create command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use ocbak_backup::registry;
use ocbak_core::format_bytes;

use super::{load_config, read_passphrase, PASSPHRASE_ENV};
use crate::output;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Environment variable holding the passphrase (prompted when unset)
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,

    /// Apply the retention policy after the backup is written
    #[arg(long)]
    pub prune: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CreateArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;

    if !args.json {
        output::header("Create Backup");
        let enabled: Vec<_> = registry::enabled_categories(&config)
            .iter()
            .map(|c| c.id())
            .collect();
        output::kv("Source", config.base_dir()?.as_str());
        output::kv("Destination", config.backup_dir()?.as_str());
        output::kv("Categories", &enabled.join(", "));
        println!();
    }

    let passphrase = read_passphrase(&args.passphrase_env, true)?;

    let spinner = (!args.json).then(|| output::spinner("Encrypting backup..."));
    let result = ocbak_backup::create(&passphrase, &config).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result?;

    let pruned = if args.prune {
        ocbak_backup::prune(&config).await?
    } else {
        Vec::new()
    };

    if args.json {
        let value = serde_json::json!({
            "path": result.path,
            "manifest": result.manifest,
            "sizeBytes": result.size_bytes,
            "durationMs": result.duration_ms,
            "skipped": result.skipped,
            "pruned": pruned,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    output::success("Backup created successfully");
    println!();
    output::kv("Location", result.path.as_str());
    output::kv("Files", &result.manifest.file_count.to_string());
    output::kv("Content", &format_bytes(result.manifest.total_bytes));
    output::kv("Archive", &format_bytes(result.size_bytes));
    output::kv("Duration", &format!("{:.1}s", result.duration_ms as f64 / 1000.0));
    if result.skipped > 0 {
        output::warning(&format!(
            "{} files could not be read and were skipped (run with -v for details)",
            result.skipped
        ));
    }
    for name in &pruned {
        output::info(&format!("Pruned {}", name));
    }
    println!();

    output::info("Restore with:");
    println!("  ocbak restore {}", result.path);
    Ok(())
}
