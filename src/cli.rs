//! CLI argument definitions for cfgsync.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cfgsync - inspect and synchronize the overlay's settings files.
///
/// Start with `cfgsync show` to see the resolved values; `cfgsync sync`
/// repairs and rewrites the backing files.
#[derive(Parser, Debug)]
#[command(name = "cfgsync")]
#[command(author, version, about = "Inspect and synchronize typed settings files", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Use <path> as the configuration directory instead of the default.
    /// Can also be set via CFGSYNC_CONFIG_DIR.
    #[arg(
        short = 'C',
        long = "config-dir",
        global = true,
        env = "CFGSYNC_CONFIG_DIR"
    )]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resolved settings (default)
    Show,

    /// Run a full synchronization pass, writing repaired files back
    Sync,

    /// Reload the main settings file from disk and report whether any
    /// value changed
    Reload,

    /// Print the derived color-name table
    Colors,

    /// Print the backing file paths
    Paths,
}

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}
