use clap::Parser;
mod app;
mod commands;
mod host;
use commands::cli;
use speedprobe_core::api::{self as core_api, AppConfig, CliError, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = cli::Args::parse();

    let mut cfg = match &args.config {
        Some(path) => core_api::load_from_path(path),
        None => core_api::load_default(),
    }
    .map_err(CliError::Config)?;
    if args.dark {
        cfg.host.dark_theme = true;
    }

    let _guard = init_tracing(&cfg.logging);

    let cmd = args
        .command
        .unwrap_or(cli::Commands::Watch(cli::WatchArgs::default()));
    let exit = dispatch(cmd, &cfg).await?;
    std::process::exit(exit);
}

async fn dispatch(cmd: cli::Commands, cfg: &AppConfig) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Watch(watch_args) => {
            app::run_watch(cfg, watch_args.query.unwrap_or_default()).await
        }
        cli::Commands::Install => app::run_install(cfg).await,
        cli::Commands::Parse(parse_args) => app::run_parse(&parse_args.file),
    }
}

/// `RUST_LOG` wins over the configured level. With a log directory set, output
/// goes to a daily rolling file; the returned guard must live until exit.
fn init_tracing(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    match cfg.directory.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "speedprobe.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
