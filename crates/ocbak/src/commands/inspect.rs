//! Inspect command

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Args;
use ocbak_core::format_bytes;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use super::{read_passphrase, PASSPHRASE_ENV};
use crate::output;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Archive to inspect
    pub archive: Utf8PathBuf,

    /// List every file
    #[arg(long)]
    pub files: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Environment variable holding the passphrase (prompted when unset)
    #[arg(long, default_value = PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

#[derive(Tabled)]
struct CategoryRow {
    category: String,
    files: usize,
    size: String,
}

pub async fn run(args: InspectArgs) -> Result<()> {
    let passphrase = read_passphrase(&args.passphrase_env, false)?;
    let summary = ocbak_backup::inspect(&args.archive, &passphrase).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::header("Backup Contents");
    output::kv("Archive", args.archive.as_str());
    output::kv("Created", &summary.manifest.created_at);
    output::kv("Host", &summary.manifest.hostname);
    output::kv("Files", &summary.manifest.file_count.to_string());
    output::kv("Content", &format_bytes(summary.manifest.total_bytes));
    output::kv("Archive size", &format_bytes(summary.size_bytes));
    println!();

    let rows: Vec<CategoryRow> = summary
        .category_totals()
        .into_iter()
        .map(|(id, files, bytes)| CategoryRow {
            category: id.to_string(),
            files,
            size: format_bytes(bytes),
        })
        .collect();
    println!("{}", Table::new(&rows).with(TableStyle::rounded()));

    if args.files {
        println!();
        for entry in &summary.entries {
            println!(
                "  {} {}",
                entry.name,
                console::style(format_bytes(entry.size)).dim()
            );
        }
    }
    Ok(())
}
