// crates/holdfast-engine/src/delegation.rs
//
// Voting-power delegation: per-account delegation edges plus the aggregated
// power delegated to each delegatee.
//
// An account that has delegated away contributes nothing directly; only its
// delegatee counts that power. Invariant: for every delegatee x,
// `delegated_power[x]` equals the sum of `shares * boost` over all accounts
// currently delegating to x. Any operation that changes an account's
// `shares * boost` must push the delta through `apply_power_delta` before a
// checkpoint is recorded.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use holdfast_core::error::StakeError;
use holdfast_core::AccountId;

/// Delegation edges and aggregates for one pool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegationBook {
    /// Outgoing edge per delegator. Absent means self-delegated.
    edges: HashMap<AccountId, AccountId>,
    /// Power delegated *to* each account by others.
    delegated_power: HashMap<AccountId, u128>,
}

impl DelegationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The account's current delegatee, if it has delegated away.
    pub fn delegatee_of(&self, account: &AccountId) -> Option<AccountId> {
        self.edges.get(account).copied()
    }

    /// Power delegated to `account` by others.
    pub fn delegated_power(&self, account: &AccountId) -> u128 {
        self.delegated_power.get(account).copied().unwrap_or(0)
    }

    /// Compose an account's live voting power from its own position power
    /// and the power delegated to it.
    pub fn voting_power(&self, account: &AccountId, own_power: u128) -> u128 {
        let own = if self.edges.contains_key(account) {
            0
        } else {
            own_power
        };
        own.saturating_add(self.delegated_power(account))
    }

    /// Point `delegator`'s power at `delegatee`.
    ///
    /// Re-delegation moves the power from the prior delegatee's aggregate to
    /// the new one. `power` is the delegator's current `shares * boost`.
    pub(crate) fn delegate(
        &mut self,
        delegator: AccountId,
        delegatee: AccountId,
        power: u128,
    ) -> Result<(), StakeError> {
        if delegatee.is_zero() {
            return Err(StakeError::ZeroAccount);
        }
        if delegatee == delegator {
            return Err(StakeError::SelfDelegation);
        }
        let prior = self.edges.get(&delegator).copied();
        if prior == Some(delegatee) {
            return Err(StakeError::AlreadyDelegated);
        }
        if let Some(prev) = prior {
            self.remove_power(&prev, power);
        }
        self.add_power(&delegatee, power);
        self.edges.insert(delegator, delegatee);
        Ok(())
    }

    /// Clear `delegator`'s outgoing edge and reclaim its power.
    pub(crate) fn undelegate(
        &mut self,
        delegator: &AccountId,
        power: u128,
    ) -> Result<AccountId, StakeError> {
        let delegatee = self
            .edges
            .remove(delegator)
            .ok_or(StakeError::NotDelegated)?;
        self.remove_power(&delegatee, power);
        Ok(delegatee)
    }

    /// Propagate a change in `account`'s position power into its current
    /// delegatee's aggregate. A self-delegated account needs no bookkeeping;
    /// its power is read live.
    pub(crate) fn apply_power_delta(
        &mut self,
        account: &AccountId,
        old_power: u128,
        new_power: u128,
    ) {
        if let Some(delegatee) = self.edges.get(account).copied() {
            self.remove_power(&delegatee, old_power);
            self.add_power(&delegatee, new_power);
        }
    }

    fn add_power(&mut self, delegatee: &AccountId, power: u128) {
        if power == 0 {
            return;
        }
        *self.delegated_power.entry(*delegatee).or_default() += power;
    }

    fn remove_power(&mut self, delegatee: &AccountId, power: u128) {
        if let Some(entry) = self.delegated_power.get_mut(delegatee) {
            *entry = entry.saturating_sub(power);
            if *entry == 0 {
                self.delegated_power.remove(delegatee);
            }
        }
    }

    /// Iterate delegation edges, for invariant checks and stats.
    pub fn edges(&self) -> impl Iterator<Item = (&AccountId, &AccountId)> {
        self.edges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(byte: u8) -> AccountId {
        AccountId::new([byte; 32])
    }

    #[test]
    fn test_delegate_moves_power() {
        let mut book = DelegationBook::new();
        book.delegate(acct(1), acct(2), 1_000).unwrap();
        assert_eq!(book.delegated_power(&acct(2)), 1_000);
        assert_eq!(book.delegatee_of(&acct(1)), Some(acct(2)));
        // Delegator's own power no longer counts directly.
        assert_eq!(book.voting_power(&acct(1), 1_000), 0);
        assert_eq!(book.voting_power(&acct(2), 500), 1_500);
    }

    #[test]
    fn test_redelegation_moves_aggregate() {
        let mut book = DelegationBook::new();
        book.delegate(acct(1), acct(2), 1_000).unwrap();
        book.delegate(acct(1), acct(3), 1_000).unwrap();
        assert_eq!(book.delegated_power(&acct(2)), 0);
        assert_eq!(book.delegated_power(&acct(3)), 1_000);
    }

    #[test]
    fn test_same_delegatee_rejected() {
        let mut book = DelegationBook::new();
        book.delegate(acct(1), acct(2), 1_000).unwrap();
        assert_eq!(
            book.delegate(acct(1), acct(2), 1_000),
            Err(StakeError::AlreadyDelegated)
        );
    }

    #[test]
    fn test_self_delegation_rejected() {
        let mut book = DelegationBook::new();
        assert_eq!(
            book.delegate(acct(1), acct(1), 100),
            Err(StakeError::SelfDelegation)
        );
    }

    #[test]
    fn test_zero_delegatee_rejected() {
        let mut book = DelegationBook::new();
        assert_eq!(
            book.delegate(acct(1), AccountId::ZERO, 100),
            Err(StakeError::ZeroAccount)
        );
    }

    #[test]
    fn test_undelegate_restores_power() {
        let mut book = DelegationBook::new();
        book.delegate(acct(1), acct(2), 1_000).unwrap();
        let delegatee = book.undelegate(&acct(1), 1_000).unwrap();
        assert_eq!(delegatee, acct(2));
        assert_eq!(book.delegated_power(&acct(2)), 0);
        assert_eq!(book.voting_power(&acct(1), 1_000), 1_000);
    }

    #[test]
    fn test_undelegate_without_edge_rejected() {
        let mut book = DelegationBook::new();
        assert_eq!(book.undelegate(&acct(1), 0), Err(StakeError::NotDelegated));
    }

    #[test]
    fn test_power_delta_tracks_delegatee_aggregate() {
        let mut book = DelegationBook::new();
        book.delegate(acct(1), acct(2), 1_000).unwrap();
        // Delegator stakes more: 1000 -> 1600.
        book.apply_power_delta(&acct(1), 1_000, 1_600);
        assert_eq!(book.delegated_power(&acct(2)), 1_600);
        // Slash drops it to 800.
        book.apply_power_delta(&acct(1), 1_600, 800);
        assert_eq!(book.delegated_power(&acct(2)), 800);
    }

    #[test]
    fn test_power_delta_ignores_self_delegated() {
        let mut book = DelegationBook::new();
        book.apply_power_delta(&acct(1), 0, 5_000);
        assert_eq!(book.delegated_power(&acct(1)), 0);
    }
}
