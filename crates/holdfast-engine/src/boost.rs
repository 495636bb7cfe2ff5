// crates/holdfast-engine/src/boost.rs
//
// Lock-boost schedule: maps a lock duration to a WAD-scaled reward
// multiplier. Pure configuration plus a pure function, no lifecycle.

use serde::{Deserialize, Serialize};

use holdfast_core::error::StakeError;
use holdfast_core::wad::{mul_div, WAD};

/// Configuration for lock-duration reward boosts.
///
/// A lock of `min_lock_duration` earns `base_multiplier`; a lock of
/// `max_lock_duration` earns `max_multiplier`; durations in between
/// interpolate linearly. Multipliers are WAD-scaled and at least 1x.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockSchedule {
    /// Multiplier at the minimum lock duration (WAD-scaled, >= 1x).
    pub base_multiplier: u128,
    /// Multiplier at the maximum lock duration (WAD-scaled).
    pub max_multiplier: u128,
    /// Shortest permitted lock, in seconds.
    pub min_lock_duration: u64,
    /// Longest permitted lock, in seconds.
    pub max_lock_duration: u64,
}

impl Default for LockSchedule {
    fn default() -> Self {
        Self {
            base_multiplier: WAD,
            max_multiplier: 2 * WAD,
            min_lock_duration: 7 * 24 * 3600,
            max_lock_duration: 365 * 24 * 3600,
        }
    }
}

/// Compute the boost multiplier for a lock of `duration` seconds.
///
/// Linear interpolation between the schedule's base and max multipliers,
/// clamped to the schedule's bounds.
///
/// # Errors
/// Returns `StakeError::InvalidLockDuration` if `duration` lies outside
/// `[min_lock_duration, max_lock_duration]`.
pub fn boost_for_lock(schedule: &LockSchedule, duration: u64) -> Result<u128, StakeError> {
    if duration < schedule.min_lock_duration || duration > schedule.max_lock_duration {
        return Err(StakeError::InvalidLockDuration {
            duration,
            min: schedule.min_lock_duration,
            max: schedule.max_lock_duration,
        });
    }
    let span = schedule.max_lock_duration - schedule.min_lock_duration;
    if span == 0 {
        return Ok(schedule.max_multiplier.max(schedule.base_multiplier));
    }
    let progress = u128::from(duration - schedule.min_lock_duration);
    let range = schedule
        .max_multiplier
        .saturating_sub(schedule.base_multiplier);
    let boost = schedule.base_multiplier + mul_div(range, progress, u128::from(span))?;
    Ok(boost.min(schedule.max_multiplier.max(schedule.base_multiplier)))
}
