//! Prune command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use dialoguer::Confirm;

use super::load_config;
use crate::output;

#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(args: PruneArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let retention = config.retention;

    output::header("Prune Backups");
    output::kv("Directory", config.backup_dir()?.as_str());
    output::kv("Keep at most", &describe(retention.max_backups as u64, "backups"));
    output::kv("Maximum age", &describe(u64::from(retention.max_age_days), "days"));
    println!();

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete backups outside this policy?")
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Prune cancelled");
            return Ok(());
        }
    }

    let deleted = ocbak_backup::prune(&config).await?;
    if deleted.is_empty() {
        output::success("Nothing to prune");
    } else {
        for name in &deleted {
            println!("  {} {}", console::style("-").red(), name);
        }
        output::success(&format!("Pruned {} backups", deleted.len()));
    }
    Ok(())
}

fn describe(limit: u64, unit: &str) -> String {
    if limit == 0 {
        "unlimited".to_string()
    } else {
        format!("{} {}", limit, unit)
    }
}
