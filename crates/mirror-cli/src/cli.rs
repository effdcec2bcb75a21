//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use mirror_core::{CompareMode, SyncConfig};

use crate::error::{CliError, Result};

/// Folder Mirror - Keep a replica folder identical to a source folder
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "While running, type 's' + Enter to sync now or 'q' + Enter to quit.")]
pub struct Cli {
    /// Folder to mirror from
    #[arg(value_name = "SOURCE", env = "MIRROR_SOURCE")]
    pub source: Option<PathBuf>,

    /// Folder kept identical to the source
    #[arg(value_name = "REPLICA", env = "MIRROR_REPLICA")]
    pub replica: Option<PathBuf>,

    /// Seconds between synchronization cycles
    #[arg(value_name = "INTERVAL_SECONDS", env = "MIRROR_INTERVAL")]
    pub interval: Option<u64>,

    /// File to append logs to (rotated daily)
    #[arg(value_name = "LOG_FILE", env = "MIRROR_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Read settings from a TOML file; positional arguments override it
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compare files by size and timestamps only, skipping content digests
    #[arg(long)]
    pub metadata_only: bool,

    /// Run a single synchronization cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Assemble the unvalidated configuration from `--config` and the
    /// positional arguments.
    pub fn to_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::load(path)?,
            None => {
                let (Some(source), Some(replica), Some(interval)) =
                    (&self.source, &self.replica, self.interval)
                else {
                    return Err(CliError::user(
                        "the following arguments are required in order: \
                         <SOURCE> <REPLICA> <INTERVAL_SECONDS> [LOG_FILE]",
                    ));
                };
                SyncConfig::new(source, replica, interval)
            }
        };

        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(replica) = &self.replica {
            config.replica = replica.clone();
        }
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = Some(log_file.clone());
        }
        if self.metadata_only {
            config.compare_mode = CompareMode::Metadata;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_arguments() {
        let cli = Cli::try_parse_from(["mirror", "src", "dst", "30", "logs/mirror.log"]).unwrap();
        let config = cli.to_config().unwrap();

        assert_eq!(config.source, Path::new("src"));
        assert_eq!(config.replica, Path::new("dst"));
        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.log_file.as_deref(), Some(Path::new("logs/mirror.log")));
        assert_eq!(config.compare_mode, CompareMode::Content);
    }

    #[test]
    fn test_log_file_is_optional() {
        let cli = Cli::try_parse_from(["mirror", "src", "dst", "30"]).unwrap();
        assert!(cli.to_config().unwrap().log_file.is_none());
    }

    #[test]
    fn test_metadata_only_flag() {
        let cli = Cli::try_parse_from(["mirror", "src", "dst", "5", "--metadata-only"]).unwrap();
        assert_eq!(cli.to_config().unwrap().compare_mode, CompareMode::Metadata);
    }

    #[test]
    fn test_non_numeric_interval_is_rejected() {
        assert!(Cli::try_parse_from(["mirror", "src", "dst", "soon"]).is_err());
        assert!(Cli::try_parse_from(["mirror", "src", "dst", "-5"]).is_err());
    }

    #[test]
    fn test_missing_arguments_is_user_error() {
        let cli = Cli::try_parse_from(["mirror", "src"]).unwrap();
        let err = cli.to_config().unwrap_err();
        assert!(matches!(err, CliError::User { .. }));
        assert!(err.to_string().contains("<INTERVAL_SECONDS>"));
    }

    #[test]
    fn test_positional_arguments_override_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mirror.toml");
        fs::write(
            &path,
            "source = \"/from/file\"\nreplica = \"/to/file\"\ninterval_secs = 60\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "mirror",
            "--config",
            path.to_str().unwrap(),
            "/override/source",
        ])
        .unwrap();
        let config = cli.to_config().unwrap();

        assert_eq!(config.source, Path::new("/override/source"));
        assert_eq!(config.replica, Path::new("/to/file"));
        assert_eq!(config.interval_secs, 60);
    }
}
