// crates/holdfast-engine/src/checkpoint.rs
//
// Append-only, time-indexed voting-power snapshots.
//
// Each checkpoint carries the full account->power map valid at its
// timestamp, so historical queries are a single binary search plus a map
// lookup. Checkpoints recorded at the same timestamp coalesce into one
// entry (several accounts can change power inside one operation); once a
// later checkpoint exists, earlier ones are immutable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use holdfast_core::clock::Timestamp;
use holdfast_core::AccountId;

/// A voting-power snapshot at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// When this snapshot was taken.
    pub timestamp: Timestamp,
    /// Total voting power across all accounts at this instant.
    pub total_power: u128,
    /// Per-account voting power. Accounts absent from the map hold zero.
    pub balances: HashMap<AccountId, u128>,
}

/// The append-only checkpoint sequence for one pool.
///
/// Invariant: timestamps are strictly increasing across entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointLedger {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of checkpoints recorded so far.
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Record `account`'s new voting power at `now`.
    ///
    /// If the latest checkpoint was taken at `now`, its entry is overwritten
    /// in place; otherwise a new checkpoint is appended that carries the
    /// previous snapshot forward before applying the delta. `now` must not
    /// precede the latest checkpoint (the clock is monotonic).
    pub fn record(&mut self, now: Timestamp, account: AccountId, new_power: u128) {
        if let Some(last) = self.checkpoints.last_mut() {
            if last.timestamp == now {
                let old_power = last.balances.get(&account).copied().unwrap_or(0);
                last.total_power = last
                    .total_power
                    .saturating_sub(old_power)
                    .saturating_add(new_power);
                if new_power == 0 {
                    last.balances.remove(&account);
                } else {
                    last.balances.insert(account, new_power);
                }
                return;
            }
        }

        let (mut balances, prev_total) = match self.checkpoints.last() {
            Some(last) => (last.balances.clone(), last.total_power),
            None => (HashMap::new(), 0),
        };
        let old_power = balances.get(&account).copied().unwrap_or(0);
        let total_power = prev_total.saturating_sub(old_power).saturating_add(new_power);
        if new_power == 0 {
            balances.remove(&account);
        } else {
            balances.insert(account, new_power);
        }
        self.checkpoints.push(Checkpoint {
            timestamp: now,
            total_power,
            balances,
        });
    }

    /// `account`'s recorded power in the latest checkpoint.
    pub fn latest_power(&self, account: &AccountId) -> u128 {
        self.checkpoints
            .last()
            .and_then(|cp| cp.balances.get(account).copied())
            .unwrap_or(0)
    }

    /// `account`'s power at historical `timestamp`.
    ///
    /// Binary-searches for the latest checkpoint at or before `timestamp`;
    /// queries predating every checkpoint return zero.
    pub fn power_at(&self, account: &AccountId, timestamp: Timestamp) -> u128 {
        match self.checkpoint_at(timestamp) {
            Some(cp) => cp.balances.get(account).copied().unwrap_or(0),
            None => 0,
        }
    }

    /// Total power at historical `timestamp`, zero before the first checkpoint.
    pub fn total_power_at(&self, timestamp: Timestamp) -> u128 {
        self.checkpoint_at(timestamp)
            .map(|cp| cp.total_power)
            .unwrap_or(0)
    }

    fn checkpoint_at(&self, timestamp: Timestamp) -> Option<&Checkpoint> {
        let idx = self
            .checkpoints
            .partition_point(|cp| cp.timestamp <= timestamp);
        if idx == 0 {
            None
        } else {
            Some(&self.checkpoints[idx - 1])
        }
    }
}
