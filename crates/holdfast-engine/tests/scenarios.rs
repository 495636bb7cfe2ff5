// crates/holdfast-engine/tests/scenarios.rs
//
// End-to-end scenarios for the staking engine: reward accrual across
// multiple stakers, lock boosts, the unstake cooldown window, slashing,
// delegation, and historical voting-power queries.

use holdfast_core::clock::ManualClock;
use holdfast_core::error::StakeError;
use holdfast_core::wad::WAD;
use holdfast_core::{AccountId, PoolId};
use holdfast_engine::{
    CooldownPhase, LockSchedule, PoolConfig, SlashConfig, StakingEngine,
};

const COOLDOWN: u64 = 100;
const WINDOW: u64 = 50;

fn acct(byte: u8) -> AccountId {
    AccountId::new([byte; 32])
}

fn setup(rate: u128) -> (StakingEngine<ManualClock>, ManualClock, PoolId) {
    let clock = ManualClock::new();
    let mut engine = StakingEngine::new(clock.clone());
    let pool = engine.initialize_pool(PoolConfig {
        staking_asset: "HOLD".to_string(),
        reward_asset: "TIDE".to_string(),
        reward_rate_per_second: rate,
        minimum_stake: 10,
        cooldown_duration: COOLDOWN,
        unstake_window: WINDOW,
        allow_delegation: true,
        lock_schedule: LockSchedule {
            base_multiplier: WAD,
            max_multiplier: 2 * WAD,
            min_lock_duration: 100,
            max_lock_duration: 1_000,
        },
        slash_config: SlashConfig {
            enabled: true,
            max_slash_bps: 5_000,
            slash_cooldown: 1_000,
            last_slash_time: 0,
        },
        ..PoolConfig::default()
    });
    (engine, clock, pool)
}

#[test]
fn single_staker_accrues_full_emission() {
    // rate 100/s, sole staker of 1000 at t=0: 1000 pending at t=10.
    let (mut engine, clock, pool) = setup(100);
    let shares = engine.stake(pool, acct(1), 1_000).unwrap();
    assert_eq!(shares, 1_000);

    clock.advance(10);
    assert_eq!(engine.pending_rewards(pool, acct(1)).unwrap(), 1_000);

    let claimed = engine.claim(pool, acct(1)).unwrap();
    assert_eq!(claimed, 1_000);
    // Same instant: nothing further to claim.
    assert_eq!(engine.claim(pool, acct(1)).unwrap(), 0);
}

#[test]
fn two_stakers_split_emission_evenly() {
    // rate 200/s, two stakers of 1000 each at t=0: 1000 pending each at t=10.
    let (mut engine, clock, pool) = setup(200);
    engine.stake(pool, acct(1), 1_000).unwrap();
    engine.stake(pool, acct(2), 1_000).unwrap();

    clock.advance(10);
    assert_eq!(engine.pending_rewards(pool, acct(1)).unwrap(), 1_000);
    assert_eq!(engine.pending_rewards(pool, acct(2)).unwrap(), 1_000);
}

#[test]
fn max_lock_doubles_accrual() {
    let (mut engine, clock, pool) = setup(100);
    engine.stake_with_lock(pool, acct(1), 1_000, 1_000).unwrap();
    engine.stake(pool, acct(2), 1_000).unwrap();

    let stats = engine.staker_stats(pool, acct(1)).unwrap();
    assert_eq!(stats.boost_multiplier, 2 * WAD);

    clock.advance(10);
    // Equal shares, but the locked staker accrues at double rate.
    let locked = engine.pending_rewards(pool, acct(1)).unwrap();
    let unlocked = engine.pending_rewards(pool, acct(2)).unwrap();
    assert_eq!(locked, 2 * unlocked);
}

#[test]
fn locked_stake_cannot_initiate_unstake() {
    let (mut engine, clock, pool) = setup(0);
    engine.stake_with_lock(pool, acct(1), 1_000, 500).unwrap();
    assert_eq!(
        engine.initiate_unstake(pool, acct(1), 500),
        Err(StakeError::StakeLocked { unlock_at: 500 })
    );
    clock.advance(500);
    assert!(engine.initiate_unstake(pool, acct(1), 500).is_ok());
}

#[test]
fn cooldown_window_gates_completion() {
    let (mut engine, clock, pool) = setup(0);
    engine.stake(pool, acct(1), 1_000).unwrap();
    engine.initiate_unstake(pool, acct(1), 500).unwrap();

    // Too early.
    clock.advance(COOLDOWN - 1);
    assert_eq!(
        engine.complete_unstake(pool, acct(1)),
        Err(StakeError::CooldownNotComplete { ready_at: COOLDOWN })
    );

    // Inside the window.
    clock.advance(1);
    let (amount, _rewards) = engine.complete_unstake(pool, acct(1)).unwrap();
    assert_eq!(amount, 500);
    assert_eq!(
        engine.cooldown_status(pool, acct(1)).unwrap(),
        CooldownPhase::NoCooldown
    );
}

#[test]
fn expired_window_requires_reinitiation() {
    let (mut engine, clock, pool) = setup(0);
    engine.stake(pool, acct(1), 1_000).unwrap();
    engine.initiate_unstake(pool, acct(1), 500).unwrap();

    clock.advance(COOLDOWN + WINDOW + 1);
    assert_eq!(
        engine.complete_unstake(pool, acct(1)),
        Err(StakeError::UnstakeWindowClosed {
            closed_at: COOLDOWN + WINDOW
        })
    );
    assert_eq!(
        engine.cooldown_status(pool, acct(1)).unwrap(),
        CooldownPhase::WindowExpired
    );

    // A fresh request goes through the full cycle again.
    engine.initiate_unstake(pool, acct(1), 500).unwrap();
    clock.advance(COOLDOWN);
    let (amount, _) = engine.complete_unstake(pool, acct(1)).unwrap();
    assert_eq!(amount, 500);
}

#[test]
fn stake_round_trip_returns_exactly_the_deposit() {
    let (mut engine, clock, pool) = setup(100);
    engine.stake(pool, acct(1), 1_234).unwrap();
    engine.initiate_unstake(pool, acct(1), 1_234).unwrap();
    clock.advance(COOLDOWN);
    let (amount, _rewards) = engine.complete_unstake(pool, acct(1)).unwrap();
    // Floor rounding may only ever reduce the return, never increase it.
    assert!(amount <= 1_234);
    assert_eq!(amount, 1_234);
    assert_eq!(engine.pool_stats(pool).unwrap().total_staked, 0);
    assert_eq!(engine.pool_stats(pool).unwrap().total_shares, 0);
}

#[test]
fn pending_rewards_is_monotonic_without_claims() {
    let (mut engine, clock, pool) = setup(7);
    engine.stake(pool, acct(1), 333).unwrap();
    engine.stake(pool, acct(2), 667).unwrap();

    let mut last = 0u128;
    for _ in 0..20 {
        clock.advance(13);
        let pending = engine.pending_rewards(pool, acct(1)).unwrap();
        assert!(pending >= last);
        last = pending;
    }
}

#[test]
fn share_supply_matches_sum_of_positions() {
    let (mut engine, clock, pool) = setup(100);
    let accounts = [acct(1), acct(2), acct(3)];
    engine.stake(pool, accounts[0], 1_000).unwrap();
    engine.stake(pool, accounts[1], 2_500).unwrap();
    engine.stake_with_lock(pool, accounts[2], 4_000, 550).unwrap();

    clock.advance(50);
    engine.slash(pool, accounts[1], 3_000, "deviation").unwrap();
    engine.initiate_unstake(pool, accounts[0], 400).unwrap();
    clock.advance(COOLDOWN);
    engine.complete_unstake(pool, accounts[0]).unwrap();

    let stats = engine.pool_stats(pool).unwrap();
    let share_sum: u128 = accounts
        .iter()
        .map(|a| {
            engine
                .staker_stats(pool, *a)
                .map(|s| s.shares)
                .unwrap_or(0)
        })
        .sum();
    assert_eq!(share_sum, stats.total_shares);
    // total_shares == 0 iff total_staked == 0, and both are nonzero here.
    assert!(stats.total_shares > 0 && stats.total_staked > 0);
}

#[test]
fn slash_halves_position_and_cooldown_throttles() {
    let (mut engine, clock, pool) = setup(0);
    engine.stake(pool, acct(1), 1_000).unwrap();
    clock.advance(5);

    let slashed = engine.slash(pool, acct(1), 5_000, "invalid proof").unwrap();
    assert_eq!(slashed, 500);
    let stats = engine.staker_stats(pool, acct(1)).unwrap();
    assert_eq!(stats.amount, 500);
    assert_eq!(stats.shares, 500);

    // Second slash before the cooldown elapses fails.
    clock.advance(999);
    assert!(matches!(
        engine.slash(pool, acct(1), 1_000, "again"),
        Err(StakeError::SlashCooldownActive { .. })
    ));
    clock.advance(1);
    assert!(engine.slash(pool, acct(1), 1_000, "again").is_ok());
}

#[test]
fn slash_percentage_above_maximum_rejected() {
    let (mut engine, _clock, pool) = setup(0);
    engine.stake(pool, acct(1), 1_000).unwrap();
    assert_eq!(
        engine.slash(pool, acct(1), 5_001, "too much"),
        Err(StakeError::InvalidSlashPercentage {
            bps: 5_001,
            max_bps: 5_000
        })
    );
}

#[test]
fn delegated_power_follows_stake_changes() {
    let (mut engine, clock, pool) = setup(0);
    engine.stake(pool, acct(1), 1_000).unwrap();
    engine.stake(pool, acct(2), 200).unwrap();
    engine.delegate(pool, acct(1), acct(2)).unwrap();

    assert_eq!(engine.voting_power(pool, acct(1)).unwrap(), 0);
    assert_eq!(engine.voting_power(pool, acct(2)).unwrap(), 1_200);

    // A slash against the delegator shrinks the delegatee's power.
    clock.advance(5);
    engine.slash(pool, acct(1), 5_000, "deviation").unwrap();
    assert_eq!(engine.voting_power(pool, acct(2)).unwrap(), 700);
}

#[test]
fn voting_power_history_brackets_checkpoints() {
    let (mut engine, clock, pool) = setup(0);
    clock.advance(100);
    engine.stake(pool, acct(1), 1_000).unwrap();
    clock.advance(100);
    engine.stake(pool, acct(1), 500).unwrap();
    clock.advance(100);

    // Before the first checkpoint: zero.
    assert_eq!(engine.voting_power_at(pool, acct(1), 99).unwrap(), 0);
    assert_eq!(engine.total_power_at(pool, 99).unwrap(), 0);
    // Between checkpoints: the earlier snapshot.
    assert_eq!(engine.voting_power_at(pool, acct(1), 150).unwrap(), 1_000);
    // At and after the latest checkpoint: the live value.
    assert_eq!(engine.voting_power_at(pool, acct(1), 250).unwrap(), 1_500);
    assert_eq!(engine.voting_power_at(pool, acct(1), 300).unwrap(), 1_500);
    assert_eq!(engine.total_power_at(pool, 300).unwrap(), 1_500);
}

#[test]
fn claim_resets_and_rewards_resume_accruing() {
    let (mut engine, clock, pool) = setup(100);
    engine.stake(pool, acct(1), 1_000).unwrap();
    clock.advance(10);
    assert_eq!(engine.claim(pool, acct(1)).unwrap(), 1_000);
    clock.advance(4);
    assert_eq!(engine.pending_rewards(pool, acct(1)).unwrap(), 400);
}

#[test]
fn completing_unstake_pays_accrued_rewards() {
    let (mut engine, clock, pool) = setup(100);
    engine.stake(pool, acct(1), 1_000).unwrap();
    clock.advance(10);
    engine.initiate_unstake(pool, acct(1), 1_000).unwrap();
    clock.advance(COOLDOWN);
    let (amount, rewards) = engine.complete_unstake(pool, acct(1)).unwrap();
    assert_eq!(amount, 1_000);
    // 10s before initiation plus the cooldown itself, all at 100/s.
    assert_eq!(rewards, 100 * (10 + u128::from(COOLDOWN)));
}
