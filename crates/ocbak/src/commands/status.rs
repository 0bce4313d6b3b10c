//! Status command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use console::style;
use ocbak_core::format_bytes;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use super::load_config;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct StatusRow {
    category: String,
    enabled: String,
    files: String,
    size: String,
    location: String,
}

pub async fn run(args: StatusArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let status = ocbak_backup::category_status(&config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    output::header("Backup Status");
    output::kv("Base directory", config.base_dir()?.as_str());
    output::kv("Backup directory", config.backup_dir()?.as_str());
    println!();

    let rows: Vec<StatusRow> = status
        .iter()
        .map(|s| StatusRow {
            category: if s.sensitive {
                format!("{} {}", s.label, style("(sensitive)").yellow())
            } else {
                s.label.to_string()
            },
            enabled: if s.enabled { "yes" } else { "no" }.to_string(),
            files: if s.present {
                s.file_count.to_string()
            } else {
                "-".to_string()
            },
            size: if s.present {
                format_bytes(s.total_bytes)
            } else {
                "-".to_string()
            },
            location: s
                .roots
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();
    println!("{}", Table::new(&rows).with(TableStyle::rounded()));

    let archives = ocbak_backup::list_archives(&config.backup_dir()?).await?;
    match archives.first() {
        Some(latest) => output::kv(
            "Latest backup",
            &format!(
                "{} ({})",
                latest.filename,
                latest.created_at.format("%Y-%m-%d %H:%M UTC")
            ),
        ),
        None => output::warning("No backups yet; run `ocbak create`"),
    }
    Ok(())
}
