use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

use stratus_core::backend::BackendKind;

#[derive(Parser)]
#[command(
    name = "stratus",
    version,
    about = "Compressed, optionally encrypted backups to S3, Glacier and Cloudfiles",
    after_help = "\
Configuration file lookup order:
  1. --config <path>             (explicit flag)
  2. $STRATUS_CONFIG             (environment variable)
  3. ./stratus.yaml              (project)
  4. Platform user config dir + /stratus/config.yaml (e.g. ~/.config)
  5. /etc/stratus/config.yaml    (system)

Environment variables:
  STRATUS_CONFIG     Path to configuration file (overrides default search)
  STRATUS_PASSWORD   Encryption password (skips interactive prompt, 'none' disables)"
)]
pub(crate) struct Cli {
    /// Path to configuration file (overrides STRATUS_CONFIG and default search)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create the bucket, vault or container for a backend
    Init {
        /// Backend to use (s3, glacier, cloudfiles)
        #[arg(short = 'd', long = "backend")]
        backend: Option<BackendKind>,
    },

    /// Compress, optionally encrypt, and upload a file or directory
    Backup {
        /// File or directory to back up
        #[arg(short = 'f', long = "file", default_value = ".")]
        path: String,

        /// Backend to use (s3, glacier, cloudfiles)
        #[arg(short = 'd', long = "backend")]
        backend: Option<BackendKind>,

        /// Encryption password ('none' disables encryption)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Download and extract the most recent archive matching a prefix
    Restore {
        /// Name prefix of the archive to restore
        #[arg(short = 'f', long = "file", value_parser = NonEmptyStringValueParser::new())]
        prefix: String,

        /// Backend to use (s3, glacier, cloudfiles)
        #[arg(short = 'd', long = "backend")]
        backend: Option<BackendKind>,

        /// Decryption password
        #[arg(short, long)]
        password: Option<String>,

        /// Directory to extract into
        #[arg(long, default_value = ".")]
        dest: String,
    },

    /// Delete the most recent archive matching a prefix
    Delete {
        /// Name prefix of the archive to delete
        #[arg(short = 'f', long = "file", value_parser = NonEmptyStringValueParser::new())]
        prefix: String,

        /// Backend to use (s3, glacier, cloudfiles)
        #[arg(short = 'd', long = "backend")]
        backend: Option<BackendKind>,
    },

    /// List stored archives
    List {
        /// Backend to use (s3, glacier, cloudfiles)
        #[arg(short = 'd', long = "backend")]
        backend: Option<BackendKind>,
    },

    /// Show the stored checksum of the most recent archive matching a prefix
    Checksum {
        /// Name prefix of the archive
        #[arg(short = 'f', long = "file", value_parser = NonEmptyStringValueParser::new())]
        prefix: String,

        /// Backend to use (s3 or cloudfiles)
        #[arg(short = 'd', long = "backend")]
        backend: Option<BackendKind>,
    },

    /// Copy the Glacier inventory to or from its S3 mirror
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },

    /// Retention manager for a spool directory
    Manage {
        #[command(subcommand)]
        action: ManageAction,
    },

    /// Generate a starter configuration file
    Config {
        /// Destination path (skips interactive prompt)
        #[arg(short, long)]
        dest: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum InventoryAction {
    /// Upload the local inventory to the mirror bucket
    Backup,
    /// Replace the local inventory with the mirrored copy
    Restore,
}

#[derive(Subcommand)]
pub(crate) enum ManageAction {
    /// Back up matching files, then move, delete or keep them and purge old ones
    Run,
}

impl Commands {
    pub(crate) fn backend(&self) -> Option<BackendKind> {
        match self {
            Commands::Init { backend }
            | Commands::Backup { backend, .. }
            | Commands::Restore { backend, .. }
            | Commands::Delete { backend, .. }
            | Commands::List { backend }
            | Commands::Checksum { backend, .. } => *backend,
            Commands::Inventory { .. } | Commands::Manage { .. } | Commands::Config { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};
    use stratus_core::backend::BackendKind;

    #[test]
    fn backup_defaults_to_current_directory() {
        let cli = Cli::parse_from(["stratus", "backup"]);
        match cli.command {
            Commands::Backup { path, backend, .. } => {
                assert_eq!(path, ".");
                assert!(backend.is_none());
            }
            _ => panic!("expected backup"),
        }
    }

    #[test]
    fn backend_flag_is_case_insensitive() {
        let cli = Cli::parse_from(["stratus", "list", "-d", "Glacier"]);
        assert_eq!(cli.command.backend(), Some(BackendKind::Glacier));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["stratus", "list", "-d", "ftp"]).is_err());
    }

    #[test]
    fn restore_requires_a_prefix() {
        assert!(Cli::try_parse_from(["stratus", "restore"]).is_err());
        assert!(Cli::try_parse_from(["stratus", "restore", "-f", ""]).is_err());
        assert!(Cli::try_parse_from(["stratus", "delete", "-f", ""]).is_err());
        assert!(Cli::try_parse_from(["stratus", "checksum", "--file="]).is_err());
        let cli = Cli::parse_from(["stratus", "-vv", "restore", "-f", "db", "--dest", "/tmp/x"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Restore { prefix, dest, .. } => {
                assert_eq!(prefix, "db");
                assert_eq!(dest, "/tmp/x");
            }
            _ => panic!("expected restore"),
        }
    }
}
