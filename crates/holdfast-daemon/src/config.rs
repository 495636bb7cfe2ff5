// crates/holdfast-daemon/src/config.rs
//
// Runtime configuration for the Holdfast staking daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use holdfast_core::wad::WAD;
use holdfast_engine::{LockSchedule, PoolConfig, SlashConfig};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Identifier of the staked asset.
    #[serde(default = "default_staking_asset")]
    pub staking_asset: String,

    /// Identifier of the reward asset.
    #[serde(default = "default_reward_asset")]
    pub reward_asset: String,

    /// Reward emission per second, in reward-asset units.
    #[serde(default = "default_reward_rate")]
    pub reward_rate_per_second: u64,

    /// Minimum amount for a single stake.
    #[serde(default = "default_minimum_stake")]
    pub minimum_stake: u64,

    /// Pool capacity. Zero means unlimited.
    #[serde(default)]
    pub capacity: u64,

    /// Unstake cooldown, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Unstake window after cooldown, in seconds.
    #[serde(default = "default_unstake_window_secs")]
    pub unstake_window_secs: u64,

    /// Whether delegation is permitted.
    #[serde(default = "default_allow_delegation")]
    pub allow_delegation: bool,

    /// Boost at the minimum lock, in basis points (10000 = 1x).
    #[serde(default = "default_base_boost_bps")]
    pub base_boost_bps: u64,

    /// Boost at the maximum lock, in basis points.
    #[serde(default = "default_max_boost_bps")]
    pub max_boost_bps: u64,

    /// Shortest permitted lock, in seconds.
    #[serde(default = "default_min_lock_secs")]
    pub min_lock_secs: u64,

    /// Longest permitted lock, in seconds.
    #[serde(default = "default_max_lock_secs")]
    pub max_lock_secs: u64,

    /// Whether slashing is enabled.
    #[serde(default)]
    pub slashing_enabled: bool,

    /// Largest permitted slash, in basis points.
    #[serde(default = "default_max_slash_bps")]
    pub max_slash_bps: u16,

    /// Pool-wide cooldown between slashes, in seconds.
    #[serde(default = "default_slash_cooldown_secs")]
    pub slash_cooldown_secs: u64,

    /// Seconds between scheduler ticks.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_staking_asset() -> String {
    "HOLD".to_string()
}

fn default_reward_asset() -> String {
    "TIDE".to_string()
}

fn default_reward_rate() -> u64 {
    1_000
}

fn default_minimum_stake() -> u64 {
    100
}

fn default_cooldown_secs() -> u64 {
    7 * 24 * 3600
}

fn default_unstake_window_secs() -> u64 {
    2 * 24 * 3600
}

fn default_allow_delegation() -> bool {
    true
}

fn default_base_boost_bps() -> u64 {
    10_000
}

fn default_max_boost_bps() -> u64 {
    20_000
}

fn default_min_lock_secs() -> u64 {
    7 * 24 * 3600
}

fn default_max_lock_secs() -> u64 {
    365 * 24 * 3600
}

fn default_max_slash_bps() -> u16 {
    5_000
}

fn default_slash_cooldown_secs() -> u64 {
    24 * 3600
}

fn default_tick_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            staking_asset: default_staking_asset(),
            reward_asset: default_reward_asset(),
            reward_rate_per_second: default_reward_rate(),
            minimum_stake: default_minimum_stake(),
            capacity: 0,
            cooldown_secs: default_cooldown_secs(),
            unstake_window_secs: default_unstake_window_secs(),
            allow_delegation: default_allow_delegation(),
            base_boost_bps: default_base_boost_bps(),
            max_boost_bps: default_max_boost_bps(),
            min_lock_secs: default_min_lock_secs(),
            max_lock_secs: default_max_lock_secs(),
            slashing_enabled: false,
            max_slash_bps: default_max_slash_bps(),
            slash_cooldown_secs: default_slash_cooldown_secs(),
            tick_secs: default_tick_secs(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Translate the daemon configuration into engine pool parameters.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            staking_asset: self.staking_asset.clone(),
            reward_asset: self.reward_asset.clone(),
            reward_rate_per_second: u128::from(self.reward_rate_per_second),
            capacity: u128::from(self.capacity),
            minimum_stake: u128::from(self.minimum_stake),
            cooldown_duration: self.cooldown_secs,
            unstake_window: self.unstake_window_secs,
            allow_delegation: self.allow_delegation,
            lock_schedule: LockSchedule {
                base_multiplier: bps_to_wad(self.base_boost_bps),
                max_multiplier: bps_to_wad(self.max_boost_bps),
                min_lock_duration: self.min_lock_secs,
                max_lock_duration: self.max_lock_secs,
            },
            slash_config: SlashConfig {
                enabled: self.slashing_enabled,
                max_slash_bps: self.max_slash_bps,
                slash_cooldown: self.slash_cooldown_secs,
                last_slash_time: 0,
            },
        }
    }
}

fn bps_to_wad(bps: u64) -> u128 {
    u128::from(bps) * WAD / 10_000
}
