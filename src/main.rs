use std::process;
use std::sync::Arc;

use anyhow::Result;
use tracing::error;

use chrootctl::executor::{CommandExecutor, RealCommandExecutor};
use chrootctl::{
    cli, init_logging, run_backup, run_completions, run_create, run_dump, run_enter, run_start,
    run_stop,
};

fn main() -> Result<()> {
    let args = cli::parse_args()?;
    init_logging(args.log_level)?;

    let executor: Arc<dyn CommandExecutor> = Arc::new(RealCommandExecutor);

    let outcome = match &args.command {
        cli::Commands::Create(opts) => run_create(opts, executor),
        cli::Commands::Enter(opts) => run_enter(opts, executor),
        cli::Commands::Start(opts) => run_start(opts, executor),
        cli::Commands::Stop(opts) => run_stop(opts, executor),
        cli::Commands::Backup(opts) => run_backup(opts, executor),
        cli::Commands::Dump(opts) => run_dump(opts, executor),
        cli::Commands::Completions(opts) => run_completions(opts),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        process::exit(1);
    }

    Ok(())
}
