// crates/holdfast-daemon/src/main.rs
//
// Binary entrypoint for the Holdfast staking daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration,
// constructs the staking engine with a wall-clock time source, bootstraps
// a pool with demo stakers, and runs the compounding scheduler.

mod config;
mod scheduler;

use clap::Parser;
use config::DaemonConfig;
use scheduler::CompoundScheduler;

use holdfast_core::clock::{Clock, Timestamp};
use holdfast_core::AccountId;
use holdfast_engine::StakingEngine;

/// Wall-clock time source: seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// Holdfast staking daemon: pool bootstrap and compounding scheduler.
#[derive(Parser, Debug)]
#[command(
    name = "holdfast-daemon",
    version = "0.1.0",
    about = "Holdfast staking pool daemon"
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.holdfast/config.toml")]
    config: String,

    /// Override the scheduler tick interval, in seconds.
    #[arg(long)]
    tick_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the
    // file is not found.
    let config_path = expand_tilde(&args.config);
    let mut daemon_config = match DaemonConfig::load(&config_path) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                config_path,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI --tick-secs flag overrides the config file value.
    if let Some(tick) = args.tick_secs {
        daemon_config.tick_secs = tick;
    }

    tracing::info!("Holdfast Staking Daemon v0.1.0");
    tracing::info!(
        "Pool: {} staked, {} rewarded at {}/s",
        daemon_config.staking_asset,
        daemon_config.reward_asset,
        daemon_config.reward_rate_per_second
    );
    tracing::info!(
        "Cooldown: {}s, window: {}s, delegation: {}",
        daemon_config.cooldown_secs,
        daemon_config.unstake_window_secs,
        daemon_config.allow_delegation
    );

    let mut engine = StakingEngine::new(SystemClock);
    let pool = engine.initialize_pool(daemon_config.pool_config());
    tracing::info!("Pool {} initialized", pool);

    // Seed demo stakers so the scheduler has positions to compound.
    let demo_accounts = vec![AccountId::new([1u8; 32]), AccountId::new([2u8; 32])];
    for (i, account) in demo_accounts.iter().enumerate() {
        let amount = u128::from(daemon_config.minimum_stake) * (10 * (i as u128 + 1));
        match engine.stake(pool, *account, amount) {
            Ok(shares) => {
                tracing::info!("Demo staker {} deposited {} for {} shares", account, amount, shares)
            }
            Err(e) => tracing::warn!("Demo stake for {} failed: {}", account, e),
        }
        if let Err(e) = engine.set_compound_params(pool, *account, daemon_config.tick_secs, 1) {
            tracing::warn!("Compound params for {} failed: {}", account, e);
        }
    }

    let scheduler = CompoundScheduler::new(engine, pool, demo_accounts, daemon_config.tick_secs);
    scheduler.run().await?;

    tracing::info!("Holdfast daemon shut down gracefully");
    Ok(())
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &path[1..]);
        }
    }
    path.to_string()
}
