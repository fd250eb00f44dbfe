//! CLI command definitions and execution
//!
//! This module contains all CLI commands and their implementations.

use clap::{Parser, Subcommand};
use xfer_core::{Config, ConfigManager};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod cp;
pub mod rm;
pub mod transfer;

/// xfer - copy and remove objects in S3-compatible storage
///
/// Uploads, downloads, copies and deletes objects, one at a time or
/// recursively under a prefix with include/exclude globs.
#[derive(Parser, Debug)]
#[command(name = "xfer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinner
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Custom S3 endpoint URL
    #[arg(long, global = true, env = "XFER_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Region to sign requests for
    #[arg(long, global = true, env = "XFER_REGION")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy objects (local -> S3, S3 -> local, S3 -> S3)
    #[command(after_help = transfer::BUCKET_ROOT_HELP)]
    Cp(cp::CpArgs),

    /// Remove objects
    #[command(after_help = transfer::BUCKET_ROOT_HELP)]
    Rm(rm::RmArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let flags = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => return Formatter::new(flags).fail(&e),
    };

    let formatter = Formatter::new(flags.merge_defaults(&config.defaults));
    let storage = config.storage.merge(cli.endpoint_url, cli.region);

    match cli.command {
        Commands::Cp(args) => cp::execute(args, &storage, &formatter).await,
        Commands::Rm(args) => rm::execute(args, &storage, &formatter).await,
    }
}

fn load_config() -> xfer_core::Result<Config> {
    let manager = ConfigManager::new()?;
    tracing::debug!(path = %manager.config_path().display(), "Loading config");
    manager.load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp_with_filters() {
        let cli = Cli::try_parse_from([
            "xfer", "cp", "foo/bar", "s3://bucket/cats", "-r", "-i", "**.zip", "-e", "cats*",
        ])
        .unwrap();

        let Commands::Cp(args) = cli.command else {
            panic!("expected cp");
        };
        assert_eq!(args.source, "foo/bar");
        assert_eq!(args.target, "s3://bucket/cats");
        assert!(args.transfer.recursive);
        assert_eq!(args.transfer.include.as_deref(), Some("**.zip"));
        assert_eq!(args.transfer.exclude.as_deref(), Some("cats*"));
        assert!(!args.transfer.dry_run);
    }

    #[test]
    fn test_parse_rm_long_flags() {
        let cli = Cli::try_parse_from([
            "xfer",
            "--json",
            "rm",
            "s3://bucket/cats",
            "--recursive",
            "--exclude",
            "*.txt",
            "--dry-run",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Rm(args) = cli.command else {
            panic!("expected rm");
        };
        assert_eq!(args.path, "s3://bucket/cats");
        assert!(args.transfer.recursive);
        assert!(args.transfer.include.is_none());
        assert!(args.transfer.dry_run);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "xfer",
            "cp",
            "s3://a/k",
            "s3://b/k",
            "--endpoint-url",
            "http://localhost:9000",
            "--region",
            "eu-west-1",
            "-q",
        ])
        .unwrap();

        assert!(cli.quiet);
        assert_eq!(cli.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_cp_requires_two_positionals() {
        assert!(Cli::try_parse_from(["xfer", "cp", "only-source"]).is_err());
        assert!(Cli::try_parse_from(["xfer", "rm"]).is_err());
    }

    #[test]
    fn test_help_mentions_bucket_root_usage_error() {
        use clap::CommandFactory;
        let mut cmd = Cli::command();
        for name in ["cp", "rm"] {
            let help = cmd
                .find_subcommand_mut(name)
                .unwrap()
                .render_help()
                .to_string();
            assert!(help.contains("exit code 2"), "{name} help: {help}");
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
