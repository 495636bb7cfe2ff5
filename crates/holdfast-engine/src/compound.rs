// crates/holdfast-engine/src/compound.rs
//
// Per-account compounding parameters: how often claimed rewards are turned
// back into stake, and the dust threshold below which a claim is paid out
// instead of restaked.

use serde::{Deserialize, Serialize};

use holdfast_core::clock::Timestamp;

/// Compounding configuration for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundParams {
    /// Minimum seconds between compounds. Zero means no frequency gate.
    pub frequency: u64,
    /// Claims below this amount are not restaked.
    pub min_compound_amount: u128,
    /// When the account last compounded. Zero means never.
    pub last_compound: Timestamp,
}

impl CompoundParams {
    /// Whether the frequency gate permits compounding at `now`.
    pub fn due(&self, now: Timestamp) -> bool {
        self.frequency == 0 || now >= self.last_compound + self.frequency
    }
}

/// What a compound operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundOutcome {
    /// The frequency gate was not yet due; nothing happened.
    Skipped,
    /// Rewards were claimed but fell below the restake threshold; the
    /// caller must disburse them.
    Claimed { rewards: u128 },
    /// Rewards were claimed and staked back into the position.
    Restaked { rewards: u128, shares: u128 },
}
