// crates/holdfast-daemon/src/scheduler.rs
//
// Compounding scheduler for the Holdfast staking daemon.
//
// Ticks at a configurable interval, triggers auto-compounding for the
// tracked accounts, and logs pool accrual. The engine's own frequency gate
// decides whether a tick actually compounds.

use std::time::Duration;

use holdfast_core::{AccountId, Clock, PoolId};
use holdfast_engine::{CompoundOutcome, StakingEngine};

/// Drives periodic compounding against one pool.
pub struct CompoundScheduler<C: Clock> {
    engine: StakingEngine<C>,
    pool: PoolId,
    accounts: Vec<AccountId>,
    tick: Duration,
}

impl<C: Clock> CompoundScheduler<C> {
    /// Create a scheduler over the given engine, pool, and tracked accounts.
    pub fn new(
        engine: StakingEngine<C>,
        pool: PoolId,
        accounts: Vec<AccountId>,
        tick_secs: u64,
    ) -> Self {
        Self {
            engine,
            pool,
            accounts,
            tick: Duration::from_secs(tick_secs),
        }
    }

    /// Run the scheduler loop until ctrl-c.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            "Compound scheduler started (tick={}s, accounts={})",
            self.tick.as_secs(),
            self.accounts.len()
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Compound scheduler received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.tick) => {
                    self.tick_once();
                }
            }
        }

        Ok(())
    }

    /// One scheduler pass: compound every tracked account, then log totals.
    fn tick_once(&mut self) {
        for account in self.accounts.clone() {
            match self.engine.compound(self.pool, account) {
                Ok(CompoundOutcome::Restaked { rewards, shares }) => {
                    tracing::info!(
                        "Compounded for {}: restaked {} as {} shares",
                        account,
                        rewards,
                        shares
                    );
                }
                Ok(CompoundOutcome::Claimed { rewards }) => {
                    tracing::debug!(
                        "Claimed {} for {} below restake threshold",
                        rewards,
                        account
                    );
                }
                Ok(CompoundOutcome::Skipped) => {
                    tracing::trace!("Compound not yet due for {}", account);
                }
                Err(e) => {
                    tracing::warn!("Compound failed for {}: {}", account, e);
                }
            }
        }

        match self.engine.pool_stats(self.pool) {
            Ok(stats) => tracing::info!(
                "Pool {}: staked={} shares={} stakers={} checkpoints={}",
                stats.id,
                stats.total_staked,
                stats.total_shares,
                stats.staker_count,
                stats.checkpoint_count
            ),
            Err(e) => tracing::error!("Pool stats unavailable: {}", e),
        }
    }
}
