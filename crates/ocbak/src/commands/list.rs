//! List command

use anyhow::Result;
use camino::Utf8Path;
use clap::Args;
use ocbak_core::format_bytes;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use super::load_config;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ArchiveRow {
    #[tabled(rename = "archive")]
    filename: String,
    created: String,
    size: String,
    status: String,
}

pub async fn run(args: ListArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let dir = config.backup_dir()?;
    let archives = ocbak_backup::list_archives(&dir).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&archives)?);
        return Ok(());
    }

    if archives.is_empty() {
        output::info(&format!("No backups found in {}", dir));
        return Ok(());
    }

    let rows: Vec<ArchiveRow> = archives
        .iter()
        .map(|a| ArchiveRow {
            filename: a.filename.clone(),
            created: a.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            size: format_bytes(a.size_bytes),
            status: if a.valid { "ok" } else { "invalid" }.to_string(),
        })
        .collect();

    println!("{}", Table::new(&rows).with(TableStyle::rounded()));
    output::kv("Directory", dir.as_str());
    output::kv(
        "Total",
        &format_bytes(archives.iter().map(|a| a.size_bytes).sum()),
    );
    Ok(())
}
