// crates/holdfast-core/src/error.rs
//
// Protocol-wide error types for the Holdfast staking engine.
//
// Variants fall into four families: validation errors (rejected before any
// state is read), state errors (rejected after reading but before mutating),
// temporal errors (stored timestamps compared against the clock), and
// arithmetic errors. None of them are retryable by the engine itself.

use thiserror::Error;

use crate::clock::Timestamp;

/// Protocol-wide error type for the Holdfast staking engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakeError {
    /// No pool exists under the given pool id.
    #[error("pool not found")]
    PoolNotFound,

    /// The pool is not accepting deposits in its current status.
    #[error("pool is not active")]
    PoolNotActive,

    /// The pool has been deprecated; the requested transition is not allowed.
    #[error("pool is deprecated")]
    PoolDeprecated,

    /// Depositing `requested` would push the pool past its configured capacity.
    #[error("pool capacity exceeded: deposit would bring total to {requested} against a capacity of {capacity}")]
    PoolCapacityExceeded { requested: u128, capacity: u128 },

    /// Stake amount is below the pool's configured minimum.
    #[error("stake amount {amount} is below the pool minimum of {minimum}")]
    StakeBelowMinimum { amount: u128, minimum: u128 },

    /// The zero account is not a valid staker or delegatee.
    #[error("zero account")]
    ZeroAccount,

    /// No stake position exists for the account.
    #[error("no stake position for account")]
    StakeNotFound,

    /// The position holds less than the requested amount.
    #[error("insufficient stake: requested {requested} but only {available} available")]
    InsufficientStake { requested: u128, available: u128 },

    /// The position's lock has not expired yet.
    #[error("stake is locked until {unlock_at}")]
    StakeLocked { unlock_at: Timestamp },

    /// Lock duration is outside the schedule's configured bounds.
    #[error("lock duration {duration}s is outside the allowed range [{min}s, {max}s]")]
    InvalidLockDuration { duration: u64, min: u64, max: u64 },

    /// An unstake cooldown is already running for this account.
    #[error("an unstake cooldown is already active")]
    CooldownAlreadyActive,

    /// No unstake cooldown exists for this account.
    #[error("no unstake cooldown for account")]
    CooldownNotFound,

    /// The cooldown period has not elapsed yet.
    #[error("cooldown not complete: withdrawable at {ready_at}")]
    CooldownNotComplete { ready_at: Timestamp },

    /// The unstake window has lapsed; the request must be re-initiated.
    #[error("unstake window closed at {closed_at}; re-initiate the cooldown")]
    UnstakeWindowClosed { closed_at: Timestamp },

    /// The pool does not permit delegation.
    #[error("delegation is not allowed for this pool")]
    DelegationNotAllowed,

    /// An account cannot delegate voting power to itself.
    #[error("cannot delegate to self")]
    SelfDelegation,

    /// The delegator already delegates to this delegatee.
    #[error("already delegated to this delegatee")]
    AlreadyDelegated,

    /// The account has no outgoing delegation to remove.
    #[error("account is not currently delegated")]
    NotDelegated,

    /// Slashing is disabled for this pool.
    #[error("slashing is disabled")]
    SlashingDisabled,

    /// Slash percentage is zero or exceeds the configured maximum.
    #[error("invalid slash percentage: {bps} bps against a maximum of {max_bps} bps")]
    InvalidSlashPercentage { bps: u16, max_bps: u16 },

    /// The pool-wide slash cooldown has not elapsed since the last slash.
    #[error("slash cooldown active: next slash allowed at {ready_at}")]
    SlashCooldownActive { ready_at: Timestamp },

    /// A ledger computation overflowed the 128-bit accounting range.
    #[error("arithmetic overflow in ledger computation")]
    Overflow,

    /// A share conversion was attempted against an empty denominator.
    #[error("division by zero in ledger computation")]
    DivisionByZero,

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StakeError {
    fn from(e: serde_json::Error) -> Self {
        StakeError::Serialization(e.to_string())
    }
}
