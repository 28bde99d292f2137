pub mod backup;
pub mod bootstrap;
pub mod chroot;
pub mod cli;
pub mod command;
pub mod config;
pub mod dump;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod mounts;
pub mod paths;
pub mod sequence;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::executor::CommandExecutor;

pub use crate::error::ChrootctlError;

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(filter).finish(),
    )
    .context("failed to set global default tracing subscriber")
}

/// Bootstraps a new chroot and installs its service guards.
pub fn run_create(opts: &cli::CreateArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let target = paths::vacant_path(&opts.target_directory)?;
    let config = bootstrap::BootstrapConfig::new(opts.suite, opts.mirror.clone(), opts.minbase);
    bootstrap::bootstrap(&target, &config, &*executor)?;
    bootstrap::install_service_guards(&target, &*executor)
}

/// Runs an interactive session inside an existing chroot.
///
/// The session's own exit status is not treated as an error; mounts are
/// torn down either way.
pub fn run_enter(opts: &cli::EnterArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let root = paths::existing_dir(&opts.target_directory)?;
    let result = chroot::Chroot::new(&root, executor).enter(&opts.command)?;
    if result.failed() {
        tracing::debug!("interactive session ended with {}", result.status_display());
    }
    Ok(())
}

/// Starts services in an existing chroot, leaving it mounted.
pub fn run_start(opts: &cli::TargetArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let root = paths::existing_dir(&opts.target_directory)?;
    chroot::Chroot::new(&root, executor).start()
}

/// Stops services in an existing chroot and unmounts it.
pub fn run_stop(opts: &cli::TargetArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let root = paths::existing_dir(&opts.target_directory)?;
    chroot::Chroot::new(&root, executor).stop()
}

/// Takes a new snapshot of an existing chroot and prunes old ones.
pub fn run_backup(opts: &cli::BackupArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let root = paths::existing_dir(&opts.target_directory)?;
    let folder = paths::existing_dir(&opts.backup_folder)?;
    if opts.backups_to_keep < 1 {
        return Err(
            ChrootctlError::Validation("backups_to_keep must be at least 1".to_string()).into(),
        );
    }
    backup::backup(&root, &folder, opts.backups_to_keep, &*executor).map(|_| ())
}

/// Exports an existing chroot into a fresh archive file.
pub fn run_dump(opts: &cli::DumpArgs, executor: Arc<dyn CommandExecutor>) -> Result<()> {
    let root = paths::existing_dir(&opts.target_directory)?;
    let dump_file = paths::vacant_path(&opts.dump_file)?;
    dump::dump(&root, &dump_file, &*executor)
}

/// Writes completions for the requested shell to stdout.
pub fn run_completions(opts: &cli::CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;

    let mut command = cli::Cli::command();
    clap_complete::generate(
        opts.shell,
        &mut command,
        env!("CARGO_PKG_NAME"),
        &mut io::stdout(),
    );
    Ok(())
}
