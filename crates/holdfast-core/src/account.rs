// crates/holdfast-core/src/account.rs
//
// Account and pool identifiers for the Holdfast staking engine.
//
// Accounts are opaque 32-byte keys supplied by the caller; the engine never
// interprets them. The all-zero key is reserved as the "no account" sentinel
// and is rejected wherever a real account is required.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a staking pool.
pub type PoolId = Uuid;

/// An opaque 32-byte account key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The reserved all-zero sentinel ("no account").
    pub const ZERO: AccountId = AccountId([0u8; 32]);

    /// Construct an account id from raw key bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Whether this is the reserved zero sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First four bytes as hex is enough to tell accounts apart in logs.
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sentinel() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::new([1u8; 32]).is_zero());
    }

    #[test]
    fn test_display_prefix() {
        let account = AccountId::new([0xab; 32]);
        assert_eq!(format!("{}", account), "abababab…");
    }

    #[test]
    fn test_serde_round_trip() {
        let account = AccountId::new([7u8; 32]);
        let json = serde_json::to_string(&account).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(account, back);
    }
}
