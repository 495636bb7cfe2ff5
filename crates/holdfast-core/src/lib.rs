// crates/holdfast-core/src/lib.rs
//
// holdfast-core: Core types, fixed-point math, clock abstraction, and errors
// for the Holdfast staking engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// All monetary ledger fields use WAD fixed-point scaling (18 fractional
// digits) to avoid floating point in economic calculations.

pub mod account;
pub mod clock;
pub mod error;
pub mod wad;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use holdfast_core::AccountId;`

pub use account::{AccountId, PoolId};
pub use clock::{Clock, ManualClock, Timestamp};
pub use error::StakeError;
pub use wad::{mul_div, wad_div, wad_mul, WAD};
