// crates/strata-daemon/src/main.rs
//
// Binary entrypoint for the Strata era keeper.
//
// Parses CLI arguments, loads configuration, initializes tracing, boots the
// genesis ledger, and runs the keeper loop until Ctrl-C or `--max-ticks`.

mod clock;
mod config;
mod genesis;
mod scheduler;
mod shared;
mod state;

use std::time::Duration;

use clap::Parser;
use config::DaemonConfig;
use scheduler::EraKeeper;
use shared::DaemonSharedState;
use state::{KeeperState, KeeperStateMachine};
use strata_core::Account;

use crate::clock::ClockSource;

/// Strata era keeper: starts eras, mints inflation, and settles rewards.
#[derive(Parser, Debug)]
#[command(name = "strata-daemon", version = "0.1.0", about = "Strata era keeper daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.strata/config.toml")]
    config: String,

    /// Stop after this many ticks (overrides the config file).
    #[arg(long)]
    max_ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    let mut state_machine = KeeperStateMachine::new();
    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    // CLI --max-ticks overrides the config file value.
    if args.max_ticks.is_some() {
        daemon_config.max_ticks = args.max_ticks;
    }

    tracing::info!("Strata era keeper v0.1.0");
    tracing::info!("Era period: {}s", daemon_config.ledger.era_period);
    tracing::info!("Inflation rate: {} bp/era", daemon_config.ledger.inflation_rate_bp);
    tracing::info!("Tick interval: {}ms", daemon_config.tick_interval_ms);

    let mut clock = ClockSource::from_config(daemon_config.start_time, daemon_config.seconds_per_tick);
    match clock {
        ClockSource::Wall => tracing::info!("Clock: wall"),
        ClockSource::Simulated { step, .. } => tracing::info!("Clock: simulated, {}s per tick", step),
    }

    state_machine.transition(KeeperState::Bootstrapping)?;
    let ledger = genesis::bootstrap(&daemon_config, clock.now())?;
    tracing::info!(
        indexers = ledger.staking().indexer_length(),
        delegations = daemon_config.delegations.len(),
        "Genesis ledger ready"
    );
    let shared_state = DaemonSharedState::new(ledger);

    // Genesis participants act at the clock's first instant; ticking starts
    // one step later.
    clock.advance();

    state_machine.transition(KeeperState::Running)?;
    let mut keeper = EraKeeper::new(
        shared_state.ledger.clone(),
        clock,
        Account::from_label(&daemon_config.keeper),
        Duration::from_millis(daemon_config.tick_interval_ms),
    );
    let ticks = keeper.run(daemon_config.max_ticks).await;

    state_machine.transition(KeeperState::ShuttingDown)?;
    let ledger = shared_state.ledger.read().await;
    tracing::info!(
        ticks,
        era = ledger.era_number(),
        total_supply = ledger.tokens().total_supply(),
        uptime_secs = shared_state.start_time.elapsed().as_secs(),
        "Strata era keeper shut down gracefully"
    );

    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}
