// crates/holdfast-core/src/wad.rs
//
// WAD fixed-point arithmetic for the Holdfast staking engine.
//
// All fractional ledger quantities (reward-per-share accumulator, boost
// multipliers) carry 18 fractional decimal digits. 1.0 == WAD == 10^18.
// Every division floors; the engine preserves this bias deliberately: share
// minting rounds in the pool's favor, amount-from-shares conversion rounds
// in the pool's favor on exit.

use crate::error::StakeError;

/// Fixed-point scale: 18 fractional decimal digits. 1.0 == 10^18.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Compute `a * b / denom` with flooring division.
///
/// # Errors
/// Returns `StakeError::DivisionByZero` if `denom` is zero and
/// `StakeError::Overflow` if the intermediate product exceeds `u128::MAX`.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128, StakeError> {
    if denom == 0 {
        return Err(StakeError::DivisionByZero);
    }
    a.checked_mul(b)
        .map(|product| product / denom)
        .ok_or(StakeError::Overflow)
}

/// Multiply two WAD-scaled values: `a * b / WAD`, flooring.
pub fn wad_mul(a: u128, b: u128) -> Result<u128, StakeError> {
    mul_div(a, b, WAD)
}

/// Divide two WAD-scaled values: `a * WAD / b`, flooring.
pub fn wad_div(a: u128, b: u128) -> Result<u128, StakeError> {
    mul_div(a, WAD, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wad_is_ten_to_the_eighteenth() {
        assert_eq!(WAD, 10u128.pow(18));
    }

    #[test]
    fn test_mul_div_exact() {
        assert_eq!(mul_div(6, 7, 2).unwrap(), 21);
    }

    #[test]
    fn test_mul_div_floors() {
        // 7 * 3 / 2 = 10.5 -> 10
        assert_eq!(mul_div(7, 3, 2).unwrap(), 10);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(mul_div(1, 1, 0), Err(StakeError::DivisionByZero));
    }

    #[test]
    fn test_mul_div_overflow() {
        assert_eq!(mul_div(u128::MAX, 2, 1), Err(StakeError::Overflow));
    }

    #[test]
    fn test_wad_mul_identity() {
        assert_eq!(wad_mul(12_345, WAD).unwrap(), 12_345);
    }

    #[test]
    fn test_wad_mul_half() {
        assert_eq!(wad_mul(1_000, WAD / 2).unwrap(), 500);
    }

    #[test]
    fn test_wad_div_identity() {
        assert_eq!(wad_div(12_345, 12_345).unwrap(), WAD);
    }

    #[test]
    fn test_wad_div_floors() {
        // 1/3 in WAD terms ends in ...333, never rounds up.
        let third = wad_div(1, 3).unwrap();
        assert_eq!(third, WAD / 3);
        assert_eq!(third % 10, 3);
    }
}
