// crates/strata-economics/src/lib.rs
//
// strata-economics: the era clock, token ledger, staking ledger, inflation
// scheduler, and reward distribution engine of the Strata era ledger, plus
// the `Ledger` that composes them into one serialized state machine.
//
// All amounts are in base units; 1 token = 10^18 base units.

pub mod config;
pub mod era;
pub mod indexer_set;
pub mod inflation;
pub mod ledger;
pub mod reward_table;
pub mod rewards;
pub mod staking;
pub mod token;
pub mod unbonding;

// Re-export key types for ergonomic access from downstream crates.
pub use config::LedgerConfig;
pub use era::{EraClock, DEFAULT_ERA_PERIOD};
pub use inflation::{InflationMint, InflationScheduler, InflationState, MAX_INFLATION_ERAS_PER_CALL};
pub use ledger::{GenesisAccounts, Ledger};
pub use reward_table::{EraRewardTable, RewardStream};
pub use rewards::{
    EraReward, PaymentSchedule, PendingStakeChanges, RewardPool, RewardsDistributor, StakeChange,
    StakeShare, PER_TRILL,
};
pub use staking::{StakingLedger, StakingParams, WithdrawReceipt};
pub use token::{TokenLedger, Tokens, GENESIS_SUPPLY, UNITS_PER_TOKEN};
pub use unbonding::{UnbondingQueue, UnbondingRequest, MAX_WITHDRAWALS_PER_CALL};
