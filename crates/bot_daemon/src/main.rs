use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bot_config::{load_snapshot, SettingsWatcher};
use bot_core::StandardRules;
use bot_daemon::agent;
use bot_daemon::{AgentContext, LogNotifier, SimulatedProvider, SystemClock};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "bot_daemon", version, about = "Unattended fleet and economy agent")]
struct Cli {
    /// Settings document (JSON). Edits are picked up while running.
    #[arg(long, default_value = "config/settings.json")]
    settings: PathBuf,

    /// Universe snapshot backing the in-memory provider.
    #[arg(long, default_value = "config/snapshot.json")]
    snapshot: PathBuf,

    /// Tracing filter directive; `RUST_LOG` wins when set.
    #[arg(long, default_value = "info")]
    log_filter: String,

    /// Seconds between settings file checks.
    #[arg(long, default_value_t = 30)]
    reload_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_filter));
    fmt().with_target(false).with_env_filter(filter).init();

    let mut watcher = SettingsWatcher::new(&cli.settings);
    let settings = watcher.load()?;
    let snapshot = load_snapshot(&cli.snapshot)?;
    info!(
        settings = %cli.settings.display(),
        snapshot = %cli.snapshot.display(),
        celestials = snapshot.celestials.len(),
        "starting agent"
    );

    let rules = Arc::new(StandardRules);
    let clock = Arc::new(SystemClock);
    let provider = Arc::new(SimulatedProvider::new(snapshot, rules.clone(), clock.clone()));
    let ctx = AgentContext::bootstrap(provider, rules, clock, Arc::new(LogNotifier), settings)
        .await
        .context("bootstrapping account state")?;

    let scheduler = agent::scheduler_for(ctx);
    agent::run(
        scheduler,
        Some(watcher),
        Duration::from_secs(cli.reload_secs.max(1)),
        shutdown_signal(),
    )
    .await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("ctrl-c handler unavailable: {e}");
        std::future::pending::<()>().await;
    }
}
