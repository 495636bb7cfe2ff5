// crates/holdfast-engine/src/cooldown.rs
//
// Unstake cooldown state machine.
//
// Lifecycle per account: NoCooldown -> CooldownActive -> WithdrawWindowOpen
// -> WindowExpired. Withdrawal is only reachable while the window is open;
// an expired request stays on record (visible in status queries) until it is
// cancelled or replaced by a fresh initiation. At most one live request per
// account.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use holdfast_core::clock::Timestamp;
use holdfast_core::error::StakeError;
use holdfast_core::AccountId;

use crate::pool::Pool;
use crate::position::StakePosition;

/// A pending unstake request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownState {
    /// Amount queued for withdrawal.
    pub amount: u128,
    /// When the cooldown started.
    pub start_time: Timestamp,
    /// Cleared when the request completes or is cancelled.
    pub is_active: bool,
}

/// Observable phase of an account's unstake request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CooldownPhase {
    /// No unstake request on record.
    NoCooldown,
    /// Waiting out the cooldown; withdrawable at `ready_at`.
    CooldownActive { ready_at: Timestamp },
    /// Cooldown served; withdrawal must complete by `closes_at`.
    WithdrawWindowOpen { closes_at: Timestamp },
    /// The window lapsed; the request must be re-initiated.
    WindowExpired,
}

/// Unstake requests for one pool, keyed by account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CooldownBook {
    cooldowns: HashMap<AccountId, CooldownState>,
}

impl CooldownBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &AccountId) -> Option<&CooldownState> {
        self.cooldowns.get(account)
    }

    /// The phase of `account`'s request at `now`.
    pub fn phase(&self, pool: &Pool, account: &AccountId, now: Timestamp) -> CooldownPhase {
        match self.cooldowns.get(account) {
            None => CooldownPhase::NoCooldown,
            Some(state) if !state.is_active => CooldownPhase::NoCooldown,
            Some(state) => {
                let ready_at = state.start_time + pool.cooldown_duration;
                let closes_at = ready_at + pool.unstake_window;
                if now < ready_at {
                    CooldownPhase::CooldownActive { ready_at }
                } else if now <= closes_at {
                    CooldownPhase::WithdrawWindowOpen { closes_at }
                } else {
                    CooldownPhase::WindowExpired
                }
            }
        }
    }

    /// Start a cooldown for `amount` of the account's stake.
    ///
    /// The position's lock must have expired and no live request may exist;
    /// a request whose window has already lapsed is replaced.
    pub(crate) fn initiate(
        &mut self,
        pool: &Pool,
        position: &StakePosition,
        account: AccountId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), StakeError> {
        if position.is_locked(now) {
            return Err(StakeError::StakeLocked {
                unlock_at: position.lock_end_time,
            });
        }
        if amount == 0 || amount > position.amount {
            return Err(StakeError::InsufficientStake {
                requested: amount,
                available: position.amount,
            });
        }
        match self.phase(pool, &account, now) {
            CooldownPhase::NoCooldown | CooldownPhase::WindowExpired => {}
            _ => return Err(StakeError::CooldownAlreadyActive),
        }
        self.cooldowns.insert(
            account,
            CooldownState {
                amount,
                start_time: now,
                is_active: true,
            },
        );
        Ok(())
    }

    /// Drop the account's request without withdrawing.
    pub(crate) fn cancel(&mut self, account: &AccountId) -> Result<CooldownState, StakeError> {
        match self.cooldowns.remove(account) {
            Some(state) if state.is_active => Ok(state),
            _ => Err(StakeError::CooldownNotFound),
        }
    }

    /// Verify the request is withdrawable at `now` and consume it.
    ///
    /// Returns the queued amount. Fails fast with the matching temporal
    /// error when called too early or too late; the too-late case leaves the
    /// record in place so status queries still show `WindowExpired`.
    pub(crate) fn complete(
        &mut self,
        pool: &Pool,
        account: &AccountId,
        now: Timestamp,
    ) -> Result<u128, StakeError> {
        let state = self
            .cooldowns
            .get(account)
            .filter(|s| s.is_active)
            .ok_or(StakeError::CooldownNotFound)?;
        let ready_at = state.start_time + pool.cooldown_duration;
        let closes_at = ready_at + pool.unstake_window;
        if now < ready_at {
            return Err(StakeError::CooldownNotComplete { ready_at });
        }
        if now > closes_at {
            return Err(StakeError::UnstakeWindowClosed { closed_at: closes_at });
        }
        let amount = state.amount;
        self.cooldowns.remove(account);
        Ok(amount)
    }
}
