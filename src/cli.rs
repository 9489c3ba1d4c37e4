//! Command-line interface, built on clap.
//!
//! Defines the [`Cli`] struct with the [`Command`] subcommands (run,
//! check) and the global `--verbose` flag.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aibooth — turn a photo into a rendered video via remote generation
/// and a local post-processing render.
#[derive(Debug, Parser)]
#[command(name = "aibooth", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose (debug-level) logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process one image through the full pipeline.
    Run {
        /// Input image (jpg/jpeg/png).
        image: PathBuf,

        /// Recipient to deliver the finished video to, via the
        /// configured notify command.
        #[arg(long)]
        notify: Option<String>,
    },

    /// Verify API reachability and credentials without starting a job.
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_run_subcommand() {
        let cli = Cli::parse_from(["aibooth", "run", "photo.jpg"]);
        match cli.command {
            Command::Run { image, notify } => {
                assert_eq!(image, PathBuf::from("photo.jpg"));
                assert!(notify.is_none());
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_notify_flag() {
        let cli = Cli::parse_from(["aibooth", "run", "photo.jpg", "--notify", "user@example.com"]);
        match cli.command {
            Command::Run { notify, .. } => {
                assert_eq!(notify.as_deref(), Some("user@example.com"));
            }
            _ => panic!("expected Run command"),
        }
    }

    #[test]
    fn cli_parses_check_with_global_verbose() {
        let cli = Cli::parse_from(["aibooth", "--verbose", "check"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Check));
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
