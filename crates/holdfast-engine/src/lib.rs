// crates/holdfast-engine/src/lib.rs
//
// holdfast-engine: share-based staking and reward accounting for the
// Holdfast Protocol.
//
// The engine is a single-owner ledger: one `StakingEngine` value owns every
// pool record, stake position, cooldown, delegation edge, and checkpoint.
// Operations run sequentially and atomically: each takes `&mut self`, reads
// the clock once, rolls the reward accumulator forward, validates, mutates,
// and records a voting-power checkpoint if power changed. Value transfer and
// access control live outside the engine; it only computes amounts.

pub mod boost;
pub mod checkpoint;
pub mod compound;
pub mod cooldown;
pub mod delegation;
pub mod engine;
pub mod pool;
pub mod position;
pub mod slashing;

// Re-export key types for ergonomic access from downstream crates.
pub use boost::{boost_for_lock, LockSchedule};
pub use checkpoint::{Checkpoint, CheckpointLedger};
pub use compound::{CompoundOutcome, CompoundParams};
pub use cooldown::{CooldownPhase, CooldownState};
pub use engine::{PoolConfig, PoolStats, StakerStats, StakingEngine};
pub use pool::{Pool, PoolStatus};
pub use position::StakePosition;
pub use slashing::{SlashConfig, SlashRecord, BPS_DENOMINATOR};
