// crates/holdfast-engine/src/position.rs
//
// Per-account stake positions and the reward-debt bookkeeping that ties them
// to the pool accumulator.
//
// A position's accrued reward is `shares * acc / WAD`, scaled by its boost
// multiplier, minus its recorded `reward_debt`. Every mutation (stake top-up,
// withdrawal, slash, lock change) re-bases the debt so that pending rewards
// are preserved across the mutation instead of being auto-claimed or wiped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use holdfast_core::clock::Timestamp;
use holdfast_core::error::StakeError;
use holdfast_core::wad::{mul_div, wad_mul, WAD};
use holdfast_core::AccountId;

use crate::pool::Pool;

/// A single account's stake in a pool.
///
/// Invariant: `shares == 0` implies `amount == 0`. The position is removed
/// from the book when both reach zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakePosition {
    /// Staked amount, in staking-asset units.
    pub amount: u128,
    /// Share claim on the pool's staked total.
    pub shares: u128,
    /// When the position was first created.
    pub staked_at: Timestamp,
    /// Lock expiry. Zero (or any past instant) means unlocked.
    pub lock_end_time: Timestamp,
    /// When rewards were last claimed.
    pub last_claim_time: Timestamp,
    /// Boosted accumulator value already settled into `unpaid_rewards`.
    pub reward_debt: u128,
    /// Rewards settled by a position mutation but not yet claimed.
    pub unpaid_rewards: u128,
    /// WAD-scaled reward multiplier, >= 1x. Earned by locking.
    pub boost_multiplier: u128,
}

impl StakePosition {
    fn new(now: Timestamp) -> Self {
        Self {
            amount: 0,
            shares: 0,
            staked_at: now,
            lock_end_time: 0,
            last_claim_time: now,
            reward_debt: 0,
            unpaid_rewards: 0,
            boost_multiplier: WAD,
        }
    }

    /// Boosted accumulated reward for this position at accumulator value
    /// `acc`: `shares * acc / WAD`, scaled by the boost multiplier.
    pub fn accumulated(&self, acc: u128) -> Result<u128, StakeError> {
        wad_mul(wad_mul(self.shares, acc)?, self.boost_multiplier)
    }

    /// Unclaimed reward at accumulator value `acc`: rewards settled by past
    /// mutations plus whatever has accrued since the last settlement.
    pub fn pending(&self, acc: u128) -> Result<u128, StakeError> {
        let accrued = self.accumulated(acc)?.saturating_sub(self.reward_debt);
        self.unpaid_rewards
            .checked_add(accrued)
            .ok_or(StakeError::Overflow)
    }

    /// Governance power contributed by this position: `shares * boost`.
    pub fn power(&self) -> Result<u128, StakeError> {
        wad_mul(self.shares, self.boost_multiplier)
    }

    /// Whether the position's lock is still in force at `now`.
    pub fn is_locked(&self, now: Timestamp) -> bool {
        now < self.lock_end_time
    }
}

/// All stake positions for one pool, keyed by account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionBook {
    positions: HashMap<AccountId, StakePosition>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &AccountId) -> Option<&StakePosition> {
        self.positions.get(account)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &StakePosition)> {
        self.positions.iter()
    }

    /// Number of open positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn get_required(&self, account: &AccountId) -> Result<&StakePosition, StakeError> {
        self.positions.get(account).ok_or(StakeError::StakeNotFound)
    }

    /// Add stake to an account, minting shares against the pool.
    ///
    /// `lock` carries `(lock_end_time, boost_multiplier)` for the locked
    /// path; the plain path leaves any existing lock and boost untouched.
    /// `enforce_minimum` is cleared for compounding, where the position
    /// already exists and the dust gate lives on the compound parameters.
    ///
    /// Pending rewards of an existing position are preserved, not claimed:
    /// the debt is re-based so `pending` reads the same before and after.
    pub(crate) fn apply_stake(
        &mut self,
        pool: &mut Pool,
        account: AccountId,
        amount: u128,
        now: Timestamp,
        lock: Option<(Timestamp, u128)>,
        enforce_minimum: bool,
    ) -> Result<u128, StakeError> {
        pool.ensure_active()?;
        if enforce_minimum && amount < pool.minimum_stake {
            return Err(StakeError::StakeBelowMinimum {
                amount,
                minimum: pool.minimum_stake,
            });
        }
        pool.ensure_capacity(amount)?;
        pool.update(now)?;

        let shares = pool.shares_for_deposit(amount)?;
        let acc = pool.acc_reward_per_share;

        // Compute every derived value before writing anything, so a failure
        // leaves no partial mutation behind.
        let existing = self.positions.get(&account);
        let pending = match existing {
            Some(position) => {
                if let Some((lock_end, _)) = lock {
                    // A new lock may extend but never shorten an existing one.
                    if lock_end < position.lock_end_time {
                        return Err(StakeError::StakeLocked {
                            unlock_at: position.lock_end_time,
                        });
                    }
                }
                position.pending(acc)?
            }
            None => 0,
        };
        let prior = existing.cloned().unwrap_or_else(|| StakePosition::new(now));
        let new_amount = prior
            .amount
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        let new_shares = prior
            .shares
            .checked_add(shares)
            .ok_or(StakeError::Overflow)?;
        let boost = match lock {
            Some((_, boost)) => boost,
            None => prior.boost_multiplier,
        };
        let accumulated = wad_mul(wad_mul(new_shares, acc)?, boost)?;
        let pool_staked = pool
            .total_staked
            .checked_add(amount)
            .ok_or(StakeError::Overflow)?;
        let pool_shares = pool
            .total_shares
            .checked_add(shares)
            .ok_or(StakeError::Overflow)?;

        let position = self.positions.entry(account).or_insert(prior);
        if let Some((lock_end, _)) = lock {
            position.lock_end_time = lock_end;
        }
        position.boost_multiplier = boost;
        position.amount = new_amount;
        position.shares = new_shares;
        position.unpaid_rewards = pending;
        position.reward_debt = accumulated;
        pool.total_staked = pool_staked;
        pool.total_shares = pool_shares;
        Ok(shares)
    }

    /// Unclaimed rewards projected to `now` without mutating any state.
    pub(crate) fn pending_rewards(
        &self,
        pool: &Pool,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, StakeError> {
        let position = self.get_required(account)?;
        let acc = pool.projected_acc_reward_per_share(now)?;
        position.pending(acc)
    }

    /// Settle the account's accrued rewards and return the claimed amount.
    pub(crate) fn claim(
        &mut self,
        pool: &mut Pool,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, StakeError> {
        self.get_required(account)?;
        pool.update(now)?;
        let acc = pool.acc_reward_per_share;
        let position = self
            .positions
            .get_mut(account)
            .ok_or(StakeError::StakeNotFound)?;
        let pending = position.pending(acc)?;
        position.unpaid_rewards = 0;
        position.reward_debt = position.accumulated(acc)?;
        position.last_claim_time = now;
        if position.shares == 0 && position.amount == 0 {
            self.positions.remove(account);
        }
        Ok(pending)
    }

    /// Remove `amount` from the position, burning shares proportionally.
    ///
    /// Returns `(withdrawn_amount, shares_removed)`. Reachable only through
    /// cooldown completion; the caller has already verified the gate.
    pub(crate) fn withdraw(
        &mut self,
        pool: &mut Pool,
        account: &AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(u128, u128), StakeError> {
        let available = self.get_required(account)?.amount;
        if amount > available {
            return Err(StakeError::InsufficientStake {
                requested: amount,
                available,
            });
        }
        pool.update(now)?;
        let acc = pool.acc_reward_per_share;
        let position = self
            .positions
            .get_mut(account)
            .ok_or(StakeError::StakeNotFound)?;

        let shares_removed = if amount == position.amount {
            position.shares
        } else {
            mul_div(amount, position.shares, position.amount)?
        };

        let pending = position.pending(acc)?;
        position.amount -= amount;
        position.shares -= shares_removed;
        position.unpaid_rewards = pending;
        position.reward_debt = position.accumulated(acc)?;

        pool.total_staked -= amount;
        pool.total_shares -= shares_removed;

        if position.shares == 0 && position.amount == 0 && position.unpaid_rewards == 0 {
            self.positions.remove(account);
        }
        Ok((amount, shares_removed))
    }

    /// Remove an exact `(amount, shares)` pair from the position, for the
    /// slashing path where both reductions are computed from the same
    /// percentage rather than from each other.
    pub(crate) fn forfeit(
        &mut self,
        pool: &mut Pool,
        account: &AccountId,
        amount: u128,
        shares: u128,
        now: Timestamp,
    ) -> Result<(), StakeError> {
        let position = self.get_required(account)?;
        if amount > position.amount || shares > position.shares {
            return Err(StakeError::InsufficientStake {
                requested: amount,
                available: position.amount,
            });
        }
        pool.update(now)?;
        let acc = pool.acc_reward_per_share;
        let position = self
            .positions
            .get_mut(account)
            .ok_or(StakeError::StakeNotFound)?;

        let pending = position.pending(acc)?;
        position.amount -= amount;
        position.shares -= shares;
        position.unpaid_rewards = pending;
        position.reward_debt = position.accumulated(acc)?;

        pool.total_staked -= amount;
        pool.total_shares -= shares;

        if position.shares == 0 && position.amount == 0 && position.unpaid_rewards == 0 {
            self.positions.remove(account);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolStatus;
    use uuid::Uuid;

    fn test_pool(rate: u128) -> Pool {
        Pool {
            id: Uuid::nil(),
            staking_asset: "HOLD".to_string(),
            reward_asset: "TIDE".to_string(),
            reward_rate_per_second: rate,
            total_staked: 0,
            total_shares: 0,
            acc_reward_per_share: 0,
            last_update_time: 0,
            capacity: 0,
            minimum_stake: 10,
            cooldown_duration: 0,
            unstake_window: 0,
            status: PoolStatus::Active,
            allow_delegation: true,
        }
    }

    fn acct(byte: u8) -> AccountId {
        AccountId::new([byte; 32])
    }

    #[test]
    fn test_first_stake_mints_one_to_one() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        let shares = book
            .apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        assert_eq!(shares, 1_000);
        assert_eq!(pool.total_staked, 1_000);
        assert_eq!(pool.total_shares, 1_000);
        assert_eq!(book.get(&acct(1)).unwrap().amount, 1_000);
    }

    #[test]
    fn test_stake_below_minimum_rejected() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        let err = book
            .apply_stake(&mut pool, acct(1), 5, 0, None, true)
            .unwrap_err();
        assert_eq!(
            err,
            StakeError::StakeBelowMinimum {
                amount: 5,
                minimum: 10
            }
        );
        assert_eq!(pool.total_staked, 0);
    }

    #[test]
    fn test_stake_inactive_pool_rejected() {
        let mut pool = test_pool(100);
        pool.status = PoolStatus::Paused;
        let mut book = PositionBook::new();
        assert_eq!(
            book.apply_stake(&mut pool, acct(1), 100, 0, None, true),
            Err(StakeError::PoolNotActive)
        );
    }

    #[test]
    fn test_pending_accrues_with_time() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        // Sole staker earns the entire emission: 100/s * 10s = 1000.
        assert_eq!(book.pending_rewards(&pool, &acct(1), 10).unwrap(), 1_000);
    }

    #[test]
    fn test_claim_resets_pending() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        let claimed = book.claim(&mut pool, &acct(1), 10).unwrap();
        assert_eq!(claimed, 1_000);
        // Same instant, nothing further accrued.
        assert_eq!(book.claim(&mut pool, &acct(1), 10).unwrap(), 0);
        assert_eq!(book.get(&acct(1)).unwrap().last_claim_time, 10);
    }

    #[test]
    fn test_topup_preserves_pending() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        // 1000 pending at t=10, then top up.
        book.apply_stake(&mut pool, acct(1), 1_000, 10, None, true)
            .unwrap();
        assert_eq!(book.pending_rewards(&pool, &acct(1), 10).unwrap(), 1_000);
    }

    #[test]
    fn test_boosted_position_accrues_double() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, Some((1_000, 2 * WAD)), true)
            .unwrap();
        // 2x boost doubles the accrual against the same share count.
        assert_eq!(book.pending_rewards(&pool, &acct(1), 10).unwrap(), 2_000);
    }

    #[test]
    fn test_lock_cannot_shorten() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, Some((500, 2 * WAD)), true)
            .unwrap();
        let err = book
            .apply_stake(&mut pool, acct(1), 100, 10, Some((400, WAD)), true)
            .unwrap_err();
        assert_eq!(err, StakeError::StakeLocked { unlock_at: 500 });
    }

    #[test]
    fn test_withdraw_proportional_shares() {
        let mut pool = test_pool(0);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        let (amount, shares) = book.withdraw(&mut pool, &acct(1), 400, 5).unwrap();
        assert_eq!((amount, shares), (400, 400));
        assert_eq!(pool.total_staked, 600);
        assert_eq!(pool.total_shares, 600);
    }

    #[test]
    fn test_full_withdraw_destroys_position() {
        let mut pool = test_pool(0);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        book.withdraw(&mut pool, &acct(1), 1_000, 5).unwrap();
        assert!(book.get(&acct(1)).is_none());
        assert_eq!(pool.total_staked, 0);
        assert_eq!(pool.total_shares, 0);
    }

    #[test]
    fn test_withdraw_more_than_staked_rejected() {
        let mut pool = test_pool(0);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 500, 0, None, true)
            .unwrap();
        assert_eq!(
            book.withdraw(&mut pool, &acct(1), 501, 5),
            Err(StakeError::InsufficientStake {
                requested: 501,
                available: 500
            })
        );
    }

    #[test]
    fn test_withdraw_preserves_pending() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        // 1000 accrued by t=10; a partial withdrawal must not touch it.
        book.withdraw(&mut pool, &acct(1), 500, 10).unwrap();
        assert_eq!(book.pending_rewards(&pool, &acct(1), 10).unwrap(), 1_000);
    }

    #[test]
    fn test_forfeit_preserves_pending() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        book.forfeit(&mut pool, &acct(1), 500, 500, 10).unwrap();
        assert_eq!(book.get(&acct(1)).unwrap().amount, 500);
        assert_eq!(book.pending_rewards(&pool, &acct(1), 10).unwrap(), 1_000);
    }

    #[test]
    fn test_full_forfeit_keeps_claimable_rewards() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        book.apply_stake(&mut pool, acct(1), 1_000, 0, None, true)
            .unwrap();
        book.forfeit(&mut pool, &acct(1), 1_000, 1_000, 10).unwrap();
        // The zeroed position survives until its settled rewards are paid.
        assert_eq!(book.get(&acct(1)).unwrap().shares, 0);
        assert_eq!(book.claim(&mut pool, &acct(1), 10).unwrap(), 1_000);
        assert!(book.get(&acct(1)).is_none());
    }

    #[test]
    fn test_claim_unknown_account() {
        let mut pool = test_pool(100);
        let mut book = PositionBook::new();
        assert_eq!(
            book.claim(&mut pool, &acct(9), 0),
            Err(StakeError::StakeNotFound)
        );
    }
}
