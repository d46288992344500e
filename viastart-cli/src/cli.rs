//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// `viaStart` launcher for authenticated remote shell sessions
#[derive(Parser)]
#[command(name = "viastart")]
#[command(author, version, about = "viaStart remote session launcher")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "VIASTART_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress informational messages; errors are still shown
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directive, overriding -v (e.g. "viastart_core=trace")
    #[arg(long, global = true, env = "VIASTART_LOG", value_name = "FILTER")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Open a named remote session, prompting for anything missing
    #[command(about = "Open an authenticated remote session")]
    Connect(ConnectArgs),

    /// Attach the terminal to a running session
    #[command(about = "Attach the terminal to a running session")]
    Attach(SessionArgs),

    /// Tear a running session down
    #[command(about = "Close a running session")]
    Remove(SessionArgs),

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `connect`
#[derive(Args)]
pub struct ConnectArgs {
    /// Username in DOMAIN\user form
    #[arg(short = 'u', long = "session-username", value_name = "DOMAIN\\USER")]
    pub username: Option<String>,

    /// Fully qualified host name
    #[arg(short = 'H', long = "session-host", value_name = "FQDN")]
    pub host: Option<String>,

    /// Attach the terminal once the session is open
    #[arg(short, long)]
    pub attach: bool,

    /// Read sessionUsername / sessionHost from a JSON object on stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Arguments selecting an existing session
#[derive(Args)]
pub struct SessionArgs {
    /// Session name (defaults to the configured session name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Read the session record printed by `connect` from stdin
    #[arg(long, conflicts_with = "name")]
    pub stdin: bool,
}
