use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use url::Url;

use crate::bootstrap::Suite;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    /// Set the log level
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bootstrap a new chroot from a distribution mirror
    Create(CreateArgs),

    /// Run an interactive shell (or a given command) inside a chroot
    Enter(EnterArgs),

    /// Mount kernel filesystems and run the configured start hooks
    Start(TargetArgs),

    /// Run the configured stop hooks and unmount kernel filesystems
    Stop(TargetArgs),

    /// Take an incremental, hard-link-deduplicated snapshot of a chroot
    Backup(BackupArgs),

    /// Export a chroot as a compressed tar archive
    Dump(DumpArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Directory to create the chroot in; must not exist yet
    pub target_directory: Utf8PathBuf,

    /// Ubuntu mirror to bootstrap from
    pub mirror: Url,

    /// Ubuntu suite to install
    #[arg(long, value_enum, default_value_t = Suite::Precise)]
    pub suite: Suite,

    /// Create a minimal install
    #[arg(long)]
    pub minbase: bool,
}

#[derive(Args, Debug)]
pub struct EnterArgs {
    /// Chroot base directory
    pub target_directory: Utf8PathBuf,

    /// Command to run instead of the default shell
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Chroot base directory
    pub target_directory: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Chroot base directory
    pub target_directory: Utf8PathBuf,

    /// Directory that holds the snapshots
    pub backup_folder: Utf8PathBuf,

    /// Number of backups to keep
    #[arg(long = "backups_to_keep", default_value_t = 10)]
    pub backups_to_keep: usize,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Chroot base directory
    pub target_directory: Utf8PathBuf,

    /// Archive file to write; must not exist yet
    pub dump_file: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Represents log levels for controlling the verbosity of logging output.
///
/// Maps directly to the log levels used by the `tracing` crate; for example
/// `--log-level debug` enables debug-level output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub fn parse_args() -> Result<Cli> {
    Ok(Cli::parse())
}
