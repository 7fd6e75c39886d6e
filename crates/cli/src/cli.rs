//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Outreach - rate-limited bulk email / WhatsApp dispatch
#[derive(Parser, Debug)]
#[command(
    name = "outreach",
    author,
    version,
    about = "Rate-limited bulk message dispatch",
    long_about = "Sends one message template to many recipients in fixed-size batches.\n\n\
                  Recipients within a batch are sent concurrently; batches are separated \n\
                  by a fixed pause so provider rate limits are respected."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "OUTREACH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "OUTREACH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a campaign to its recipients
    Send(SendArgs),

    /// Validate a campaign file without sending
    Validate(ValidateArgs),

    /// Display campaign information
    Info(InfoArgs),

    /// List built-in message templates
    Templates(TemplatesArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to campaign file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "campaign.toml",
        env = "OUTREACH_CONFIG"
    )]
    pub config: PathBuf,

    /// Override recipients per batch
    #[arg(long, env = "OUTREACH_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Override pause between batches in milliseconds
    #[arg(long, env = "OUTREACH_DELAY_MS")]
    pub delay_ms: Option<u64>,

    /// Per-send timeout in milliseconds (a send exceeding it counts as failed)
    #[arg(long, env = "OUTREACH_SEND_TIMEOUT_MS")]
    pub send_timeout_ms: Option<u64>,

    /// Validate and preview the campaign, send nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "OUTREACH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to campaign file to validate
    #[arg(short, long, default_value = "campaign.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to campaign file
    #[arg(short, long, default_value = "campaign.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List every recipient
    #[arg(long)]
    pub recipients: bool,
}

/// Arguments for the `templates` command
#[derive(Parser, Debug)]
pub struct TemplatesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_overrides() {
        let cli = Cli::try_parse_from([
            "outreach",
            "send",
            "-c",
            "news.toml",
            "--batch-size",
            "10",
            "--delay-ms",
            "0",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.config, PathBuf::from("news.toml"));
                assert_eq!(args.batch_size, Some(10));
                assert_eq!(args.delay_ms, Some(0));
                assert_eq!(args.send_timeout_ms, None);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["outreach", "-q", "-v", "templates"]);
        assert!(result.is_err());
    }
}
