//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// netchange: Network Change Watcher
///
/// Watches network interfaces and IP addresses and logs every change
/// reported by the operating system.
#[derive(Debug, Parser)]
#[command(name = "netchange")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Also watch IPv6 address changes (Linux)
    #[arg(long)]
    pub ipv6: bool,

    /// Receive buffer size in bytes for one notification datagram
    #[arg(long = "buffer-size", value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Consecutive receive errors tolerated before giving up
    #[arg(long = "retry-limit")]
    pub retry_limit: Option<u32>,

    /// Exit after this many changes have been observed
    #[arg(long = "max-events", value_name = "N")]
    pub max_events: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for netchange
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "netchange.toml")]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}
