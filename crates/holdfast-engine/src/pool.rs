// crates/holdfast-engine/src/pool.rs
//
// Pool-wide accounting: staked totals, share supply, and the time-weighted
// reward-per-share accumulator.
//
// The accumulator follows the classic reward-pool formula: every elapsed
// second adds `reward_rate_per_second * WAD / total_shares` to
// `acc_reward_per_share`, so a position's accrued reward is just
// `shares * acc / WAD` minus its recorded debt, with no per-second iteration.
// `update` must run before any operation that reads or mutates the
// accumulator or the pool totals.

use serde::{Deserialize, Serialize};

use holdfast_core::clock::Timestamp;
use holdfast_core::error::StakeError;
use holdfast_core::wad::{mul_div, WAD};
use holdfast_core::PoolId;

/// Lifecycle status of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolStatus {
    /// Created but not yet opened for deposits.
    Inactive,
    /// Accepting deposits and accruing rewards.
    Active,
    /// Deposits suspended; exits and claims remain available.
    Paused,
    /// Permanently closed to deposits. Terminal.
    Deprecated,
}

/// A staking pool's accounting record.
///
/// Invariant: `total_shares == 0` if and only if `total_staked == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    /// Pool identifier.
    pub id: PoolId,
    /// Identifier of the asset being staked.
    pub staking_asset: String,
    /// Identifier of the asset paid out as rewards.
    pub reward_asset: String,
    /// Reward emission per second, in reward-asset units.
    pub reward_rate_per_second: u128,
    /// Total staked amount across all positions.
    pub total_staked: u128,
    /// Total share supply across all positions.
    pub total_shares: u128,
    /// WAD-scaled accumulated reward per share.
    pub acc_reward_per_share: u128,
    /// Timestamp of the last accumulator roll-forward.
    pub last_update_time: Timestamp,
    /// Maximum total staked amount. Zero means unlimited.
    pub capacity: u128,
    /// Minimum amount for a single stake operation.
    pub minimum_stake: u128,
    /// Seconds between an unstake request and withdrawability.
    pub cooldown_duration: u64,
    /// Seconds after cooldown during which withdrawal must complete.
    pub unstake_window: u64,
    /// Current lifecycle status.
    pub status: PoolStatus,
    /// Whether voting-power delegation is permitted.
    pub allow_delegation: bool,
}

impl Pool {
    /// Roll the reward accumulator forward to `now`.
    ///
    /// With no outstanding shares there is nothing to accrue to, so only
    /// `last_update_time` advances.
    pub fn update(&mut self, now: Timestamp) -> Result<(), StakeError> {
        if self.total_shares == 0 {
            self.last_update_time = now;
            return Ok(());
        }
        let elapsed = u128::from(now.saturating_sub(self.last_update_time));
        if elapsed > 0 {
            let accrued = elapsed
                .checked_mul(self.reward_rate_per_second)
                .ok_or(StakeError::Overflow)?;
            let delta = mul_div(accrued, WAD, self.total_shares)?;
            self.acc_reward_per_share = self
                .acc_reward_per_share
                .checked_add(delta)
                .ok_or(StakeError::Overflow)?;
        }
        self.last_update_time = now;
        Ok(())
    }

    /// The accumulator value as it would be after `update(now)`, without
    /// mutating the pool. Used by read-only reward projections.
    pub fn projected_acc_reward_per_share(&self, now: Timestamp) -> Result<u128, StakeError> {
        if self.total_shares == 0 {
            return Ok(self.acc_reward_per_share);
        }
        let elapsed = u128::from(now.saturating_sub(self.last_update_time));
        if elapsed == 0 {
            return Ok(self.acc_reward_per_share);
        }
        let accrued = elapsed
            .checked_mul(self.reward_rate_per_second)
            .ok_or(StakeError::Overflow)?;
        let delta = mul_div(accrued, WAD, self.total_shares)?;
        self.acc_reward_per_share
            .checked_add(delta)
            .ok_or(StakeError::Overflow)
    }

    /// Shares minted for a deposit of `amount`.
    ///
    /// Bootstrap is 1:1; afterwards `amount * total_shares / total_staked`,
    /// flooring. The floor systematically favors the pool over the depositor.
    pub fn shares_for_deposit(&self, amount: u128) -> Result<u128, StakeError> {
        if self.total_shares == 0 {
            return Ok(amount);
        }
        mul_div(amount, self.total_shares, self.total_staked)
    }

    /// Amount represented by `shares`: `shares * total_staked / total_shares`,
    /// flooring, or `shares` itself while the pool is empty.
    pub fn amount_for_shares(&self, shares: u128) -> Result<u128, StakeError> {
        if self.total_shares == 0 {
            return Ok(shares);
        }
        mul_div(shares, self.total_staked, self.total_shares)
    }

    /// Reject deposits unless the pool is `Active`.
    pub fn ensure_active(&self) -> Result<(), StakeError> {
        if self.status != PoolStatus::Active {
            return Err(StakeError::PoolNotActive);
        }
        Ok(())
    }

    /// Reject a deposit that would push `total_staked` past `capacity`.
    pub fn ensure_capacity(&self, amount: u128) -> Result<(), StakeError> {
        if self.capacity == 0 {
            return Ok(());
        }
        let requested = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        if requested > self.capacity {
            return Err(StakeError::PoolCapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
