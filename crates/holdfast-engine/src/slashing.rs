// crates/holdfast-engine/src/slashing.rs
//
// Slash policy and audit records.
//
// A slash forfeits a percentage of a position's stake, capped by the
// configured maximum and throttled by a cooldown that is global to the pool:
// one slash anywhere blocks all further slashes pool-wide until the cooldown
// elapses. Slashed value flows to an external collaborator; the engine only
// computes amounts and keeps the audit trail.

use serde::{Deserialize, Serialize};

use holdfast_core::clock::Timestamp;
use holdfast_core::error::StakeError;
use holdfast_core::wad::mul_div;
use holdfast_core::AccountId;

/// Basis-point denominator: 10,000 bps == 100%.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Pool-wide slash policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlashConfig {
    /// Master switch for slashing.
    pub enabled: bool,
    /// Largest permitted slash, in basis points.
    pub max_slash_bps: u16,
    /// Seconds that must elapse between any two slashes in the pool.
    pub slash_cooldown: u64,
    /// When the pool was last slashed. Zero means never.
    pub last_slash_time: Timestamp,
}

impl Default for SlashConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_slash_bps: 5_000,
            slash_cooldown: 24 * 3600,
            last_slash_time: 0,
        }
    }
}

impl SlashConfig {
    /// Validate a slash request against the policy at `now`.
    pub fn check(&self, percentage_bps: u16, now: Timestamp) -> Result<(), StakeError> {
        if !self.enabled {
            return Err(StakeError::SlashingDisabled);
        }
        if percentage_bps == 0 || percentage_bps > self.max_slash_bps {
            return Err(StakeError::InvalidSlashPercentage {
                bps: percentage_bps,
                max_bps: self.max_slash_bps,
            });
        }
        if self.last_slash_time > 0 {
            let ready_at = self.last_slash_time + self.slash_cooldown;
            if now < ready_at {
                return Err(StakeError::SlashCooldownActive { ready_at });
            }
        }
        Ok(())
    }
}

/// Audit record of an executed slash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashRecord {
    /// The slashed account.
    pub account: AccountId,
    /// Amount removed from the position.
    pub amount: u128,
    /// When the slash executed.
    pub timestamp: Timestamp,
    /// Caller-supplied justification, kept verbatim.
    pub reason: String,
}

/// Compute the slashed amount for a position: `amount * bps / 10000`,
/// flooring, never exceeding the position's amount.
pub fn slash_amount(position_amount: u128, percentage_bps: u16) -> Result<u128, StakeError> {
    let slashed = mul_div(
        position_amount,
        u128::from(percentage_bps),
        BPS_DENOMINATOR,
    )?;
    Ok(slashed.min(position_amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SlashConfig {
        SlashConfig {
            enabled: true,
            max_slash_bps: 5_000,
            slash_cooldown: 100,
            last_slash_time: 0,
        }
    }

    #[test]
    fn test_half_slash() {
        assert_eq!(slash_amount(1_000, 5_000).unwrap(), 500);
    }

    #[test]
    fn test_slash_floors() {
        // 333 * 1000 / 10000 = 33.3 -> 33
        assert_eq!(slash_amount(333, 1_000).unwrap(), 33);
    }

    #[test]
    fn test_full_slash_never_exceeds_stake() {
        assert_eq!(slash_amount(777, 10_000).unwrap(), 777);
    }

    #[test]
    fn test_zero_stake_slashes_zero() {
        assert_eq!(slash_amount(0, 5_000).unwrap(), 0);
    }

    #[test]
    fn test_disabled_rejected() {
        let mut cfg = config();
        cfg.enabled = false;
        assert_eq!(cfg.check(100, 0), Err(StakeError::SlashingDisabled));
    }

    #[test]
    fn test_percentage_bounds() {
        let cfg = config();
        assert_eq!(
            cfg.check(0, 0),
            Err(StakeError::InvalidSlashPercentage {
                bps: 0,
                max_bps: 5_000
            })
        );
        assert_eq!(
            cfg.check(5_001, 0),
            Err(StakeError::InvalidSlashPercentage {
                bps: 5_001,
                max_bps: 5_000
            })
        );
        assert!(cfg.check(5_000, 0).is_ok());
    }

    #[test]
    fn test_cooldown_throttles() {
        let mut cfg = config();
        cfg.last_slash_time = 50;
        assert_eq!(
            cfg.check(100, 149),
            Err(StakeError::SlashCooldownActive { ready_at: 150 })
        );
        assert!(cfg.check(100, 150).is_ok());
    }

    #[test]
    fn test_first_slash_has_no_cooldown() {
        let cfg = config();
        assert!(cfg.check(100, 0).is_ok());
    }

    #[test]
    fn test_record_serializes() {
        let record = SlashRecord {
            account: AccountId::new([3u8; 32]),
            amount: 500,
            timestamp: 42,
            reason: "consensus deviation".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: SlashRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
