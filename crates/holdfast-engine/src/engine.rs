// crates/holdfast-engine/src/engine.rs
//
// The engine facade: one `StakingEngine` value owns every pool's state and
// exposes the public operation surface.
//
// Every mutating operation takes `&mut self`, so the borrow checker enforces
// the no-reentrancy rule structurally: no operation can invoke another on
// the same engine before it completes. The clock is read exactly once per
// operation; the accumulator is rolled forward before any state that depends
// on it is read or written; derived values are computed before any write, so
// a failed operation leaves no partial mutation behind.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use holdfast_core::clock::{Clock, Timestamp};
use holdfast_core::error::StakeError;
use holdfast_core::wad::mul_div;
use holdfast_core::{AccountId, PoolId};

use crate::boost::{boost_for_lock, LockSchedule};
use crate::checkpoint::CheckpointLedger;
use crate::compound::{CompoundOutcome, CompoundParams};
use crate::cooldown::{CooldownBook, CooldownPhase};
use crate::delegation::DelegationBook;
use crate::pool::{Pool, PoolStatus};
use crate::position::PositionBook;
use crate::slashing::{slash_amount, SlashConfig, SlashRecord, BPS_DENOMINATOR};

/// Parameters for creating a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Identifier of the asset being staked.
    pub staking_asset: String,
    /// Identifier of the asset paid out as rewards.
    pub reward_asset: String,
    /// Reward emission per second, in reward-asset units.
    pub reward_rate_per_second: u128,
    /// Maximum total staked amount. Zero means unlimited.
    pub capacity: u128,
    /// Minimum amount for a single stake operation.
    pub minimum_stake: u128,
    /// Seconds between an unstake request and withdrawability.
    pub cooldown_duration: u64,
    /// Seconds after cooldown during which withdrawal must complete.
    pub unstake_window: u64,
    /// Whether voting-power delegation is permitted.
    pub allow_delegation: bool,
    /// Lock-boost schedule for `stake_with_lock`.
    pub lock_schedule: LockSchedule,
    /// Slash policy.
    pub slash_config: SlashConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            staking_asset: "STAKE".to_string(),
            reward_asset: "REWARD".to_string(),
            reward_rate_per_second: 0,
            capacity: 0,
            minimum_stake: 1,
            cooldown_duration: 7 * 24 * 3600,
            unstake_window: 2 * 24 * 3600,
            allow_delegation: true,
            lock_schedule: LockSchedule::default(),
            slash_config: SlashConfig::default(),
        }
    }
}

/// Everything the engine owns for one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PoolState {
    pool: Pool,
    positions: PositionBook,
    cooldowns: CooldownBook,
    delegations: DelegationBook,
    checkpoints: CheckpointLedger,
    slash_config: SlashConfig,
    slash_records: Vec<SlashRecord>,
    lock_schedule: LockSchedule,
    compound_params: HashMap<AccountId, CompoundParams>,
}

impl PoolState {
    /// `shares * boost` for the account's position, zero when none exists.
    fn position_power(&self, account: &AccountId) -> Result<u128, StakeError> {
        match self.positions.get(account) {
            Some(position) => position.power(),
            None => Ok(0),
        }
    }

    /// Live voting power: own position power unless delegated away, plus
    /// power delegated in by others.
    fn live_voting_power(&self, account: &AccountId) -> Result<u128, StakeError> {
        let own = self.position_power(account)?;
        Ok(self.delegations.voting_power(account, own))
    }

    /// After a share/boost mutation for `account`: push the power delta into
    /// the current delegatee's aggregate, then checkpoint the one account
    /// whose voting power actually moved.
    fn record_power_change(
        &mut self,
        account: AccountId,
        old_power: u128,
        now: Timestamp,
    ) -> Result<(), StakeError> {
        let new_power = self.position_power(&account)?;
        self.delegations
            .apply_power_delta(&account, old_power, new_power);
        let affected = self.delegations.delegatee_of(&account).unwrap_or(account);
        let power = self.live_voting_power(&affected)?;
        self.checkpoints.record(now, affected, power);
        Ok(())
    }

    /// Checkpoint `account`'s current voting power.
    fn checkpoint_account(&mut self, account: AccountId, now: Timestamp) -> Result<(), StakeError> {
        let power = self.live_voting_power(&account)?;
        self.checkpoints.record(now, account, power);
        Ok(())
    }
}

/// Read-only summary of one staker's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakerStats {
    pub amount: u128,
    pub shares: u128,
    pub staked_at: Timestamp,
    pub lock_end_time: Timestamp,
    pub last_claim_time: Timestamp,
    pub boost_multiplier: u128,
    pub pending_rewards: u128,
    pub voting_power: u128,
    pub delegated_to: Option<AccountId>,
    pub cooldown: CooldownPhase,
}

/// Read-only summary of one pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    pub id: PoolId,
    pub status: PoolStatus,
    pub total_staked: u128,
    pub total_shares: u128,
    pub reward_rate_per_second: u128,
    pub acc_reward_per_share: u128,
    pub staker_count: usize,
    pub checkpoint_count: usize,
    pub total_power: u128,
}

/// The staking engine. Owns all pool state; constructed once and passed by
/// reference to callers, never held in an ambient singleton.
pub struct StakingEngine<C: Clock> {
    clock: C,
    pools: HashMap<PoolId, PoolState>,
}

impl<C: Clock> StakingEngine<C> {
    /// Create an engine with no pools, driven by the given clock.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            pools: HashMap::new(),
        }
    }

    /// Create a pool and return its id. The pool opens as `Active`.
    pub fn initialize_pool(&mut self, config: PoolConfig) -> PoolId {
        let now = self.clock.now();
        let id = Uuid::now_v7();
        let pool = Pool {
            id,
            staking_asset: config.staking_asset,
            reward_asset: config.reward_asset,
            reward_rate_per_second: config.reward_rate_per_second,
            total_staked: 0,
            total_shares: 0,
            acc_reward_per_share: 0,
            last_update_time: now,
            capacity: config.capacity,
            minimum_stake: config.minimum_stake,
            cooldown_duration: config.cooldown_duration,
            unstake_window: config.unstake_window,
            status: PoolStatus::Active,
            allow_delegation: config.allow_delegation,
        };
        self.pools.insert(
            id,
            PoolState {
                pool,
                positions: PositionBook::new(),
                cooldowns: CooldownBook::new(),
                delegations: DelegationBook::new(),
                checkpoints: CheckpointLedger::new(),
                slash_config: config.slash_config,
                slash_records: Vec::new(),
                lock_schedule: config.lock_schedule,
                compound_params: HashMap::new(),
            },
        );
        id
    }

    // ------------------------------------------------------------------
    // Staking
    // ------------------------------------------------------------------

    /// Stake `amount` for `account`, minting shares. Returns the shares.
    pub fn stake(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
        amount: u128,
    ) -> Result<u128, StakeError> {
        ensure_account(&account)?;
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        let old_power = state.position_power(&account)?;
        let shares = state
            .positions
            .apply_stake(&mut state.pool, account, amount, now, None, true)?;
        state.record_power_change(account, old_power, now)?;
        Ok(shares)
    }

    /// Stake with a time lock, earning a boost from the pool's schedule.
    pub fn stake_with_lock(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
        amount: u128,
        lock_duration: u64,
    ) -> Result<u128, StakeError> {
        ensure_account(&account)?;
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        let boost = boost_for_lock(&state.lock_schedule, lock_duration)?;
        let lock_end = now
            .checked_add(lock_duration)
            .ok_or(StakeError::Overflow)?;
        let old_power = state.position_power(&account)?;
        let shares = state.positions.apply_stake(
            &mut state.pool,
            account,
            amount,
            now,
            Some((lock_end, boost)),
            true,
        )?;
        state.record_power_change(account, old_power, now)?;
        Ok(shares)
    }

    /// Unclaimed rewards for `account`, projected to now. Read-only.
    pub fn pending_rewards(
        &self,
        pool_id: PoolId,
        account: AccountId,
    ) -> Result<u128, StakeError> {
        let now = self.clock.now();
        let state = self.state(&pool_id)?;
        state.positions.pending_rewards(&state.pool, &account, now)
    }

    /// Settle and return the account's accrued rewards.
    pub fn claim(&mut self, pool_id: PoolId, account: AccountId) -> Result<u128, StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        state.positions.claim(&mut state.pool, &account, now)
    }

    // ------------------------------------------------------------------
    // Unstaking
    // ------------------------------------------------------------------

    /// Request withdrawal of `amount`, starting the cooldown.
    pub fn initiate_unstake(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
        amount: u128,
    ) -> Result<(), StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        state.pool.update(now)?;
        let position = state
            .positions
            .get(&account)
            .ok_or(StakeError::StakeNotFound)?;
        state
            .cooldowns
            .initiate(&state.pool, position, account, amount, now)
    }

    /// Drop a pending unstake request without withdrawing.
    pub fn cancel_unstake(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
    ) -> Result<(), StakeError> {
        let state = self.state_mut(&pool_id)?;
        state.cooldowns.cancel(&account)?;
        Ok(())
    }

    /// Complete a served cooldown: claims rewards, withdraws the requested
    /// amount, clears the request. Returns `(withdrawn, rewards)`.
    pub fn complete_unstake(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
    ) -> Result<(u128, u128), StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        state
            .positions
            .get(&account)
            .ok_or(StakeError::StakeNotFound)?;
        let requested = state.cooldowns.complete(&state.pool, &account, now)?;
        let rewards = state.positions.claim(&mut state.pool, &account, now)?;
        // The position may have shrunk since initiation (e.g. slashed);
        // withdraw what remains of the request rather than failing.
        let available = state
            .positions
            .get(&account)
            .map(|p| p.amount)
            .unwrap_or(0);
        let amount = requested.min(available);
        let old_power = state.position_power(&account)?;
        let (withdrawn, _shares) = state
            .positions
            .withdraw(&mut state.pool, &account, amount, now)?;
        state.record_power_change(account, old_power, now)?;
        Ok((withdrawn, rewards))
    }

    /// The phase of `account`'s unstake request at now. Read-only.
    pub fn cooldown_status(
        &self,
        pool_id: PoolId,
        account: AccountId,
    ) -> Result<CooldownPhase, StakeError> {
        let now = self.clock.now();
        let state = self.state(&pool_id)?;
        Ok(state.cooldowns.phase(&state.pool, &account, now))
    }

    // ------------------------------------------------------------------
    // Delegation
    // ------------------------------------------------------------------

    /// Delegate `delegator`'s voting power to `delegatee`.
    pub fn delegate(
        &mut self,
        pool_id: PoolId,
        delegator: AccountId,
        delegatee: AccountId,
    ) -> Result<(), StakeError> {
        ensure_account(&delegator)?;
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        if !state.pool.allow_delegation {
            return Err(StakeError::DelegationNotAllowed);
        }
        state.pool.update(now)?;
        let position = state
            .positions
            .get(&delegator)
            .ok_or(StakeError::StakeNotFound)?;
        let power = position.power()?;
        if power == 0 {
            return Err(StakeError::StakeNotFound);
        }
        let prior = state.delegations.delegatee_of(&delegator);
        state.delegations.delegate(delegator, delegatee, power)?;
        state.checkpoint_account(delegator, now)?;
        if let Some(prev) = prior {
            state.checkpoint_account(prev, now)?;
        }
        state.checkpoint_account(delegatee, now)?;
        Ok(())
    }

    /// Reclaim `delegator`'s voting power from its delegatee.
    pub fn undelegate(
        &mut self,
        pool_id: PoolId,
        delegator: AccountId,
    ) -> Result<(), StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        state.pool.update(now)?;
        let power = state.position_power(&delegator)?;
        let delegatee = state.delegations.undelegate(&delegator, power)?;
        state.checkpoint_account(delegator, now)?;
        state.checkpoint_account(delegatee, now)?;
        Ok(())
    }

    /// Live voting power: own `shares * boost` unless delegated away, plus
    /// power delegated in by others. Read-only.
    pub fn voting_power(&self, pool_id: PoolId, account: AccountId) -> Result<u128, StakeError> {
        self.state(&pool_id)?.live_voting_power(&account)
    }

    /// Voting power at `timestamp`: live for the present or future,
    /// checkpointed for the past. Read-only.
    pub fn voting_power_at(
        &self,
        pool_id: PoolId,
        account: AccountId,
        timestamp: Timestamp,
    ) -> Result<u128, StakeError> {
        let now = self.clock.now();
        let state = self.state(&pool_id)?;
        if timestamp >= now {
            state.live_voting_power(&account)
        } else {
            Ok(state.checkpoints.power_at(&account, timestamp))
        }
    }

    /// Total voting power at `timestamp`. Read-only.
    pub fn total_power_at(
        &self,
        pool_id: PoolId,
        timestamp: Timestamp,
    ) -> Result<u128, StakeError> {
        let now = self.clock.now();
        let state = self.state(&pool_id)?;
        if timestamp >= now {
            let mut total: u128 = 0;
            for (_, position) in state.positions.iter() {
                total = total.saturating_add(position.power()?);
            }
            Ok(total)
        } else {
            Ok(state.checkpoints.total_power_at(timestamp))
        }
    }

    // ------------------------------------------------------------------
    // Slashing
    // ------------------------------------------------------------------

    /// Forfeit `percentage_bps` of `account`'s stake. Returns the slashed
    /// amount. Throttled by the pool-wide slash cooldown.
    pub fn slash(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
        percentage_bps: u16,
        reason: &str,
    ) -> Result<u128, StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        state.slash_config.check(percentage_bps, now)?;
        let position = state
            .positions
            .get(&account)
            .ok_or(StakeError::StakeNotFound)?;
        let slashed = slash_amount(position.amount, percentage_bps)?;
        let shares_removed = mul_div(
            position.shares,
            u128::from(percentage_bps),
            BPS_DENOMINATOR,
        )?
        .min(position.shares);
        let old_power = state.position_power(&account)?;
        state
            .positions
            .forfeit(&mut state.pool, &account, slashed, shares_removed, now)?;
        state.slash_config.last_slash_time = now;
        state.slash_records.push(SlashRecord {
            account,
            amount: slashed,
            timestamp: now,
            reason: reason.to_string(),
        });
        state.record_power_change(account, old_power, now)?;
        Ok(slashed)
    }

    /// The pool's slash audit log. Read-only.
    pub fn slash_history(&self, pool_id: PoolId) -> Result<&[SlashRecord], StakeError> {
        Ok(&self.state(&pool_id)?.slash_records)
    }

    // ------------------------------------------------------------------
    // Compounding
    // ------------------------------------------------------------------

    /// Configure automatic compounding for an account.
    pub fn set_compound_params(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
        frequency: u64,
        min_compound_amount: u128,
    ) -> Result<(), StakeError> {
        let state = self.state_mut(&pool_id)?;
        let entry = state.compound_params.entry(account).or_default();
        entry.frequency = frequency;
        entry.min_compound_amount = min_compound_amount;
        Ok(())
    }

    /// Claim the account's rewards and stake them back into the position.
    ///
    /// A no-op while the frequency gate holds; claims below the configured
    /// minimum are settled but left for the caller to disburse.
    pub fn compound(
        &mut self,
        pool_id: PoolId,
        account: AccountId,
    ) -> Result<CompoundOutcome, StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        let params = state
            .compound_params
            .get(&account)
            .cloned()
            .unwrap_or_default();
        if !params.due(now) {
            return Ok(CompoundOutcome::Skipped);
        }
        state
            .positions
            .get(&account)
            .ok_or(StakeError::StakeNotFound)?;
        state.pool.update(now)?;
        let pending = state.positions.pending_rewards(&state.pool, &account, now)?;
        if pending == 0 || pending < params.min_compound_amount {
            let rewards = state.positions.claim(&mut state.pool, &account, now)?;
            return Ok(CompoundOutcome::Claimed { rewards });
        }
        // Validate the restake before settling so a failure leaves the
        // claim untouched.
        state.pool.ensure_active()?;
        state.pool.ensure_capacity(pending)?;
        let rewards = state.positions.claim(&mut state.pool, &account, now)?;
        let old_power = state.position_power(&account)?;
        let shares = state
            .positions
            .apply_stake(&mut state.pool, account, rewards, now, None, false)?;
        state.record_power_change(account, old_power, now)?;
        let entry = state.compound_params.entry(account).or_default();
        entry.last_compound = now;
        Ok(CompoundOutcome::Restaked { rewards, shares })
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Change the pool's lifecycle status. `Deprecated` is terminal.
    pub fn set_status(&mut self, pool_id: PoolId, status: PoolStatus) -> Result<(), StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        if state.pool.status == PoolStatus::Deprecated {
            return Err(StakeError::PoolDeprecated);
        }
        state.pool.update(now)?;
        state.pool.status = status;
        Ok(())
    }

    /// Change the reward rate. The accumulator is rolled forward first so
    /// rewards accrued at the old rate are preserved.
    pub fn set_reward_rate(&mut self, pool_id: PoolId, rate: u128) -> Result<(), StakeError> {
        let now = self.clock.now();
        let state = self.state_mut(&pool_id)?;
        state.pool.update(now)?;
        state.pool.reward_rate_per_second = rate;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    /// Summary of one staker's position. Read-only.
    pub fn staker_stats(
        &self,
        pool_id: PoolId,
        account: AccountId,
    ) -> Result<StakerStats, StakeError> {
        let now = self.clock.now();
        let state = self.state(&pool_id)?;
        let position = state
            .positions
            .get(&account)
            .ok_or(StakeError::StakeNotFound)?;
        Ok(StakerStats {
            amount: position.amount,
            shares: position.shares,
            staked_at: position.staked_at,
            lock_end_time: position.lock_end_time,
            last_claim_time: position.last_claim_time,
            boost_multiplier: position.boost_multiplier,
            pending_rewards: state.positions.pending_rewards(&state.pool, &account, now)?,
            voting_power: state.live_voting_power(&account)?,
            delegated_to: state.delegations.delegatee_of(&account),
            cooldown: state.cooldowns.phase(&state.pool, &account, now),
        })
    }

    /// Summary of one pool. Read-only.
    pub fn pool_stats(&self, pool_id: PoolId) -> Result<PoolStats, StakeError> {
        let state = self.state(&pool_id)?;
        let mut total_power: u128 = 0;
        for (_, position) in state.positions.iter() {
            total_power = total_power.saturating_add(position.power()?);
        }
        Ok(PoolStats {
            id: state.pool.id,
            status: state.pool.status,
            total_staked: state.pool.total_staked,
            total_shares: state.pool.total_shares,
            reward_rate_per_second: state.pool.reward_rate_per_second,
            acc_reward_per_share: state.pool.acc_reward_per_share,
            staker_count: state.positions.len(),
            checkpoint_count: state.checkpoints.len(),
            total_power,
        })
    }

    fn state(&self, pool_id: &PoolId) -> Result<&PoolState, StakeError> {
        self.pools.get(pool_id).ok_or(StakeError::PoolNotFound)
    }

    fn state_mut(&mut self, pool_id: &PoolId) -> Result<&mut PoolState, StakeError> {
        self.pools.get_mut(pool_id).ok_or(StakeError::PoolNotFound)
    }
}

fn ensure_account(account: &AccountId) -> Result<(), StakeError> {
    if account.is_zero() {
        return Err(StakeError::ZeroAccount);
    }
    Ok(())
}
