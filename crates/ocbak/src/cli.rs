//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

pub use crate::commands::create::CreateArgs;
pub use crate::commands::inspect::InspectArgs;
pub use crate::commands::list::ListArgs;
pub use crate::commands::prune::PruneArgs;
pub use crate::commands::restore::RestoreArgs;
pub use crate::commands::status::StatusArgs;

/// ocbak - Encrypted backups of OpenClaw installations
#[derive(Parser, Debug)]
#[command(name = "ocbak")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to ocbak.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an encrypted backup
    Create(CreateArgs),

    /// Restore a backup
    Restore(RestoreArgs),

    /// List backups in the backup directory
    List(ListArgs),

    /// Delete backups outside the retention policy
    Prune(PruneArgs),

    /// Show the contents of a backup
    Inspect(InspectArgs),

    /// Show what would be backed up
    Status(StatusArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_restore() {
        let cli = Cli::try_parse_from([
            "ocbak",
            "-v",
            "restore",
            "backup.ocbak",
            "--category",
            "config",
            "--category",
            "workspace",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Restore(args) => {
                assert_eq!(args.archive, "backup.ocbak");
                assert_eq!(args.category, vec!["config", "workspace"]);
                assert!(args.dry_run);
                assert!(!args.yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from(["ocbak", "list", "--json", "-c", "/tmp/ocbak.yaml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(camino::Utf8Path::new("/tmp/ocbak.yaml")));
        assert!(matches!(cli.command, Commands::List(ListArgs { json: true })));
    }

    #[test]
    fn test_restore_requires_archive() {
        assert!(Cli::try_parse_from(["ocbak", "restore"]).is_err());
    }
}
