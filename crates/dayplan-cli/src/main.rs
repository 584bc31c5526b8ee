mod cli;
mod config;
mod storage;
mod tasks;
mod timer;
mod tui;

use crate::cli::ConfigCommand;
use clap::Parser;
use color_eyre::Result;
use dayplan_core::{storage::KeyValueStore, tasks::TaskDate};
use dayplan_task::Session;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the day view, task commands and timer.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    match cli.command.unwrap_or(cli::Command::Tui { date: None }) {
        cli::Command::Tui { date } => {
            let store = storage::task_store(&config)?;
            let mut session = Session::open(store, date.unwrap_or_else(TaskDate::today)).await;
            tui::launch(&mut session).await?
        }
        cli::Command::Version => print_version(),
        cli::Command::Health => run_health_check(&config).await?,
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
        cli::Command::Task(cmd) => tasks::handle(cmd, &config).await?,
        cli::Command::Timer { minutes, seconds } => {
            let (default_minutes, default_seconds) = config.timer_duration();
            let (minutes, seconds) = match (minutes, seconds) {
                (None, None) => (default_minutes, default_seconds),
                (minutes, seconds) => (minutes.unwrap_or(0), seconds.unwrap_or(0)),
            };
            timer::run(minutes, seconds).await?
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy output.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("dayplan {}", env!("CARGO_PKG_VERSION"));
}

/// Runs a quick write/read/delete probe against the configured store.
async fn run_health_check(config: &config::Config) -> Result<()> {
    let store = storage::store_from_config(config)?;
    run_store_health(&store).await?;
    println!("Storage: ok ({})", store.root().display());
    Ok(())
}

async fn run_store_health<S: KeyValueStore>(store: &S) -> Result<()> {
    let probe_key = "health-probe";
    let payload = b"ok";
    store
        .put(probe_key, payload)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e))?;
    let round_trip = store
        .get(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e))?;
    store
        .delete(probe_key)
        .await
        .map_err(|e| color_eyre::eyre::eyre!(e))?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use dayplan_core::storage::InMemoryStore;
    use dayplan_storage::file_store::FileStore;

    use super::*;

    #[tokio::test]
    async fn health_check_with_file_store_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        run_store_health(&store)
            .await
            .expect("health check should succeed");
        assert!(!store.path_for("health-probe").exists());
    }

    #[tokio::test]
    async fn health_check_with_memory_store_succeeds() {
        run_store_health(&InMemoryStore::new())
            .await
            .expect("health check should succeed");
    }
}
