// crates/strata-economics/src/rewards.rs
//
// Reward distribution for the Strata ledger.
//
// Payments are scheduled into a per-indexer `EraRewardTable` and settled one
// closed era at a time. Settlement keeps a running reward rate (the prefix
// sum of the table) and advances an accumulated-reward-per-stake value:
//   acc += era_reward * PER_TRILL / total_stake
// Each stakeholder's claim is then
//   pending + stake * acc / PER_TRILL - reward_debt
// so no per-era loop over stakeholders is ever needed.
//
// A delegation written in era W becomes active in era W+1. Each indexer keeps
// a queue of such changes, and every call that settles the indexer first
// settles up to W, snapshots the queued stake as it is active in W+1, and only
// then settles W+1 onwards. Whichever call drives settlement, each era is
// priced at the stake that was active in it.
//
// Every mutation is computed on a `StagedRewards` and written in one step,
// so a failed call leaves the distributor untouched.
//
// All payment tokens sit in the reward pool account until claimed.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use strata_core::{Account, Amount, EraNumber, Seconds, StrataError, Timestamp};

use crate::era::EraClock;
use crate::reward_table::{EraRewardTable, RewardStream};
use crate::staking::StakingLedger;
use crate::token::TokenLedger;

/// Fixed-point scale of the accumulated reward per stake.
pub const PER_TRILL: Amount = 1_000_000_000_000;

/// Label of the module account holding undistributed and unclaimed rewards.
pub const REWARD_POOL_LABEL: &str = "strata/rewards";

/// Settlement cursor of one indexer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    pub acc_per_stake: Amount,
    /// First era not yet settled.
    pub next_era_to_settle: EraNumber,
    /// Reward rate of the last settled era.
    pub era_reward: Amount,
    /// Sum of every stakeholder's snapshotted stake.
    pub total_stake: Amount,
    /// Rewards of eras in which nobody held stake.
    pub undistributed: Amount,
}

/// A stakeholder's position in an indexer's reward pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeShare {
    pub stake: Amount,
    pub reward_debt: Amount,
    /// Rewards earned at a previous stake and not yet claimed.
    pub pending: Amount,
}

/// Reward paid out to stakeholders for one settled era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraReward {
    pub era: EraNumber,
    pub reward: Amount,
}

/// Result of `apply_stake_change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeChange {
    pub previous: Amount,
    pub current: Amount,
    /// Eras settled while catching up before the snapshot.
    pub settled: Vec<EraReward>,
}

/// Result of `apply_pending_stake_changes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingStakeChanges {
    /// Queued snapshots taken.
    pub applied: usize,
    /// Eras settled on the way, per indexer.
    pub settled: Vec<(Account, Vec<EraReward>)>,
}

/// Eras covered by a scheduled payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSchedule {
    pub first_era: EraNumber,
    pub last_era: EraNumber,
}

#[derive(Debug, Clone)]
struct IndexerRewards {
    pool: RewardPool,
    table: EraRewardTable,
    shares: HashMap<Account, StakeShare>,
    /// Stakeholder -> era in which its delegation last changed, not yet snapshotted.
    pending: BTreeMap<Account, EraNumber>,
}

impl IndexerRewards {
    fn new(era: EraNumber) -> Self {
        Self {
            pool: RewardPool {
                next_era_to_settle: era,
                ..RewardPool::default()
            },
            table: EraRewardTable::new(),
            shares: HashMap::new(),
            pending: BTreeMap::new(),
        }
    }

    fn share(&self, user: &Account) -> StakeShare {
        self.shares.get(user).copied().unwrap_or_default()
    }

    fn has_due_changes(&self, current: EraNumber) -> bool {
        self.pending.values().any(|&written| written < current)
    }

    /// Settle every era before `current`, taking each queued snapshot right
    /// before the first era in which its change is active.
    fn catch_up(
        &self,
        staking: &StakingLedger,
        indexer: Account,
        current: EraNumber,
    ) -> Result<StagedRewards, StrataError> {
        let mut staged = StagedRewards {
            indexer,
            era: current,
            pool: self.pool,
            shares: HashMap::new(),
            applied: Vec::new(),
            settled: Vec::new(),
        };
        let mut due: Vec<(EraNumber, Account)> = self
            .pending
            .iter()
            .filter(|&(_, &written)| written < current)
            .map(|(&user, &written)| (written, user))
            .collect();
        due.sort_unstable();

        for (written, user) in due {
            let active = written + 1;
            let settled = settle(&mut staged.pool, &self.table, active)?;
            staged.settled.extend(settled);
            let old = staged.share_or(&user, self.share(&user));
            let stake = staking.get_delegation_amount(&user, &indexer, active);
            staged.snapshot(old, user, stake)?;
            staged.applied.push(user);
        }
        let settled = settle(&mut staged.pool, &self.table, current)?;
        staged.settled.extend(settled);
        Ok(staged)
    }

    fn commit(&mut self, staged: StagedRewards) -> Vec<EraReward> {
        self.pool = staged.pool;
        for user in &staged.applied {
            self.pending.remove(user);
        }
        for (user, share) in staged.shares {
            if share == StakeShare::default() {
                self.shares.remove(&user);
            } else {
                self.shares.insert(user, share);
            }
        }
        staged.settled
    }
}

/// Settlement and share updates computed for one indexer, not yet written.
#[derive(Debug, Clone)]
pub(crate) struct StagedRewards {
    indexer: Account,
    era: EraNumber,
    pool: RewardPool,
    /// Shares changed so far; overrides the stored ones.
    shares: HashMap<Account, StakeShare>,
    /// Queued snapshots consumed.
    applied: Vec<Account>,
    settled: Vec<EraReward>,
}

impl StagedRewards {
    fn share_or(&self, user: &Account, stored: StakeShare) -> StakeShare {
        self.shares.get(user).copied().unwrap_or(stored)
    }

    /// Re-snapshot `user` at `stake`, keeping what it earned at `old` as pending.
    fn snapshot(&mut self, old: StakeShare, user: Account, stake: Amount) -> Result<(), StrataError> {
        let acc = self.pool.acc_per_stake;
        let share = StakeShare {
            stake,
            reward_debt: share_of(stake, acc)?,
            pending: accrued(&old, acc)?,
        };
        self.pool.total_stake = self
            .pool
            .total_stake
            .checked_sub(old.stake)
            .and_then(|t| t.checked_add(stake))
            .ok_or(StrataError::Overflow("indexer total stake"))?;
        self.shares.insert(user, share);
        Ok(())
    }

    /// Zero `user`'s claimable rewards and return them.
    fn take_rewards(&mut self, old: StakeShare, user: Account) -> Result<Amount, StrataError> {
        let acc = self.pool.acc_per_stake;
        let amount = accrued(&old, acc)?;
        self.shares.insert(
            user,
            StakeShare {
                stake: old.stake,
                reward_debt: share_of(old.stake, acc)?,
                pending: 0,
            },
        );
        Ok(amount)
    }
}

/// A stake snapshot staged on top of the catch-up it needs.
#[derive(Debug, Clone)]
pub(crate) struct StagedStakeChange {
    rewards: StagedRewards,
    user: Account,
    previous: Amount,
    current: Amount,
}

/// Owns every indexer's reward tables, accumulators, and stake shares.
#[derive(Debug, Clone)]
pub struct RewardsDistributor {
    account: Account,
    indexers: HashMap<Account, IndexerRewards>,
}

impl Default for RewardsDistributor {
    fn default() -> Self {
        Self::new()
    }
}

impl RewardsDistributor {
    pub fn new() -> Self {
        Self {
            account: Account::from_label(REWARD_POOL_LABEL),
            indexers: HashMap::new(),
        }
    }

    /// Account holding reward tokens until they are claimed.
    pub fn account(&self) -> Account {
        self.account
    }

    /// Settle every closed era of `indexer` (all eras before `era`).
    ///
    /// Queued stake snapshots are taken on the way. Advances the settlement
    /// cursor even when there is nothing to pay.
    pub fn collect_and_distribute_rewards(
        &mut self,
        staking: &StakingLedger,
        indexer: Account,
        era: EraNumber,
    ) -> Result<Vec<EraReward>, StrataError> {
        let staged = self.stage(staking, indexer, era)?;
        Ok(self.commit(staged))
    }

    /// Queue a snapshot of `user`'s stake in `indexer`, taken when the change
    /// written in `era` becomes active.
    ///
    /// Callers collect `indexer` at `era` before changing the delegation, so
    /// no older change of `user` is still waiting.
    pub fn queue_stake_change(&mut self, indexer: Account, user: Account, era: EraNumber) {
        self.indexers
            .entry(indexer)
            .or_insert_with(|| IndexerRewards::new(era))
            .pending
            .insert(user, era);
    }

    /// Take every queued snapshot whose change is active in `era`.
    ///
    /// All indexers are staged first and written together, so on error
    /// nothing is applied.
    pub fn apply_pending_stake_changes(
        &mut self,
        staking: &StakingLedger,
        era: EraNumber,
    ) -> Result<PendingStakeChanges, StrataError> {
        let mut due: Vec<Account> = self
            .indexers
            .iter()
            .filter(|(_, r)| r.has_due_changes(era))
            .map(|(&indexer, _)| indexer)
            .collect();
        due.sort_unstable();

        let staged = due
            .into_iter()
            .map(|indexer| self.stage(staking, indexer, era))
            .collect::<Result<Vec<_>, _>>()?;
        let applied: usize = staged.iter().map(|s| s.applied.len()).sum();
        let settled = staged
            .into_iter()
            .map(|s| (s.indexer, self.commit(s)))
            .collect();
        Ok(PendingStakeChanges { applied, settled })
    }

    /// Number of queued snapshots across all indexers.
    pub fn pending_stake_changes(&self) -> usize {
        self.indexers.values().map(|r| r.pending.len()).sum()
    }

    /// Re-snapshot `user`'s stake in `indexer` from the staking ledger.
    ///
    /// Rewards earned at the old stake are kept as pending.
    pub fn apply_stake_change(
        &mut self,
        staking: &StakingLedger,
        indexer: Account,
        user: Account,
        era: EraNumber,
    ) -> Result<StakeChange, StrataError> {
        let stake = staking.get_delegation_amount(&user, &indexer, era);
        let staged = self.stage_stake_change(staking, indexer, user, era, stake)?;
        Ok(self.commit_stake_change(staged))
    }

    /// Stage a snapshot of `user` at `stake` without writing anything.
    ///
    /// Lets a caller check the reward side before committing a staking write
    /// whose result is `stake`.
    pub(crate) fn stage_stake_change(
        &self,
        staking: &StakingLedger,
        indexer: Account,
        user: Account,
        era: EraNumber,
        stake: Amount,
    ) -> Result<StagedStakeChange, StrataError> {
        let mut rewards = self.stage(staking, indexer, era)?;
        let old = rewards.share_or(&user, self.stake_share(&indexer, &user));
        rewards.snapshot(old, user, stake)?;
        Ok(StagedStakeChange {
            rewards,
            user,
            previous: old.stake,
            current: stake,
        })
    }

    pub(crate) fn commit_stake_change(&mut self, staged: StagedStakeChange) -> StakeChange {
        let indexer = staged.rewards.indexer;
        let settled = self.commit(staged.rewards);
        tracing::debug!(
            indexer = %indexer,
            user = %staged.user,
            previous = staged.previous,
            current = staged.current,
            total_stake = self.pool(&indexer).total_stake,
            "stake snapshot applied"
        );
        StakeChange {
            previous: staged.previous,
            current: staged.current,
            settled,
        }
    }

    /// Pay out everything `beneficiary` has earned from `indexer`.
    ///
    /// Returns the amount transferred; a zero balance is a no-op.
    pub fn claim(
        &mut self,
        tokens: &mut TokenLedger,
        staking: &StakingLedger,
        indexer: Account,
        beneficiary: Account,
        era: EraNumber,
    ) -> Result<Amount, StrataError> {
        if !self.indexers.contains_key(&indexer) {
            return Ok(0);
        }
        let mut staged = self.stage(staking, indexer, era)?;
        let old = staged.share_or(&beneficiary, self.stake_share(&indexer, &beneficiary));
        let amount = staged.take_rewards(old, beneficiary)?;
        if amount > 0 {
            tokens.transfer(&self.account, &beneficiary, amount)?;
        }
        self.commit(staged);
        if amount > 0 {
            tracing::info!(indexer = %indexer, beneficiary = %beneficiary, amount, "rewards claimed");
        }
        Ok(amount)
    }

    /// Pay `value` to `indexer`'s stakeholders for the current era.
    pub fn deposit_payment(
        &mut self,
        tokens: &mut TokenLedger,
        payer: Account,
        indexer: Account,
        value: Amount,
        era: EraNumber,
    ) -> Result<PaymentSchedule, StrataError> {
        let streams = [RewardStream {
            from: era,
            until: era + 1,
            rate: value,
        }];
        self.schedule(tokens, payer, indexer, value, era, &streams)
    }

    /// Spread a prepaid agreement of `value` over the eras it covers.
    ///
    /// The agreement runs for `period` seconds from `start`, which must fall
    /// inside the current era. The current era receives its time-weighted
    /// share, every fully covered era receives `value * era_period / period`,
    /// and the last era receives the exact remainder.
    #[allow(clippy::too_many_arguments)]
    pub fn increase_agreement_rewards(
        &mut self,
        tokens: &mut TokenLedger,
        clock: &EraClock,
        payer: Account,
        indexer: Account,
        value: Amount,
        start: Timestamp,
        period: Seconds,
    ) -> Result<PaymentSchedule, StrataError> {
        let streams = spread_agreement(value, start, period, clock)?;
        self.schedule(tokens, payer, indexer, value, clock.era_number(), &streams)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_acc_per_stake(&self, indexer: &Account) -> Amount {
        self.pool(indexer).acc_per_stake
    }

    /// Settlement state of `indexer`; all zero if it was never touched.
    pub fn pool(&self, indexer: &Account) -> RewardPool {
        self.indexers
            .get(indexer)
            .map(|r| r.pool)
            .unwrap_or_default()
    }

    pub fn stake_share(&self, indexer: &Account, user: &Account) -> StakeShare {
        self.indexers
            .get(indexer)
            .map(|r| r.share(user))
            .unwrap_or_default()
    }

    /// Claimable rewards of `user` from `indexer` as of the last settlement.
    pub fn user_rewards(&self, indexer: &Account, user: &Account) -> Result<Amount, StrataError> {
        accrued(&self.stake_share(indexer, user), self.get_acc_per_stake(indexer))
    }

    pub fn get_rewards_add_table(&self, indexer: &Account, from: EraNumber, count: usize) -> Vec<Amount> {
        match self.indexers.get(indexer) {
            Some(r) => r.table.add_window(from, count),
            None => vec![0; count],
        }
    }

    pub fn get_rewards_remove_table(&self, indexer: &Account, from: EraNumber, count: usize) -> Vec<Amount> {
        match self.indexers.get(indexer) {
            Some(r) => r.table.remove_window(from, count),
            None => vec![0; count],
        }
    }

    /// Scheduled reward rate of `indexer` for `era`.
    pub fn era_reward_rate(&self, indexer: &Account, era: EraNumber) -> Amount {
        self.indexers
            .get(indexer)
            .map(|r| r.table.rate_at(era))
            .unwrap_or(0)
    }

    fn stage(&self, staking: &StakingLedger, indexer: Account, era: EraNumber) -> Result<StagedRewards, StrataError> {
        match self.indexers.get(&indexer) {
            Some(entry) => entry.catch_up(staking, indexer, era),
            None => IndexerRewards::new(era).catch_up(staking, indexer, era),
        }
    }

    fn commit(&mut self, staged: StagedRewards) -> Vec<EraReward> {
        let indexer = staged.indexer;
        let era = staged.era;
        let snapshots = staged.applied.len();
        // Settling an indexer nobody has paid or staked in leaves nothing to keep.
        if staged.shares.is_empty() && !self.indexers.contains_key(&indexer) {
            return staged.settled;
        }
        let entry = self
            .indexers
            .entry(indexer)
            .or_insert_with(|| IndexerRewards::new(era));
        let settled = entry.commit(staged);
        if !settled.is_empty() || snapshots > 0 {
            tracing::debug!(
                indexer = %indexer,
                eras = settled.len(),
                snapshots,
                acc_per_stake = entry.pool.acc_per_stake,
                "rewards distributed"
            );
        }
        settled
    }

    fn schedule(
        &mut self,
        tokens: &mut TokenLedger,
        payer: Account,
        indexer: Account,
        value: Amount,
        era: EraNumber,
        streams: &[RewardStream],
    ) -> Result<PaymentSchedule, StrataError> {
        if value == 0 {
            return Err(StrataError::InvalidAmount("payment must be positive".to_string()));
        }
        let available = tokens.balance_of(&payer);
        if available < value {
            return Err(StrataError::InsufficientBalance {
                requested: value,
                available,
            });
        }
        let last_era = streams
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.until - 1)
            .max()
            .unwrap_or(era);

        let entry = self
            .indexers
            .entry(indexer)
            .or_insert_with(|| IndexerRewards::new(era));
        entry.table.add_streams(streams)?;
        tokens.transfer(&payer, &self.account, value)?;
        tracing::debug!(
            payer = %payer,
            indexer = %indexer,
            value,
            first_era = era,
            last_era,
            "payment scheduled"
        );
        Ok(PaymentSchedule {
            first_era: era,
            last_era,
        })
    }
}

/// Advance `pool` through every era before `current`.
fn settle(pool: &mut RewardPool, table: &EraRewardTable, current: EraNumber) -> Result<Vec<EraReward>, StrataError> {
    let mut settled = Vec::new();
    while pool.next_era_to_settle < current {
        let era = pool.next_era_to_settle;
        pool.era_reward = pool
            .era_reward
            .checked_add(table.add_at(era))
            .and_then(|r| r.checked_sub(table.remove_at(era)))
            .ok_or(StrataError::Overflow("era reward rate"))?;

        let reward = pool.era_reward;
        if reward > 0 {
            if pool.total_stake > 0 {
                let per_stake = reward
                    .checked_mul(PER_TRILL)
                    .ok_or(StrataError::Overflow("reward per stake"))?
                    / pool.total_stake;
                pool.acc_per_stake = pool
                    .acc_per_stake
                    .checked_add(per_stake)
                    .ok_or(StrataError::Overflow("accumulated reward per stake"))?;
            } else {
                pool.undistributed = pool
                    .undistributed
                    .checked_add(reward)
                    .ok_or(StrataError::Overflow("undistributed rewards"))?;
            }
            settled.push(EraReward { era, reward });
        }
        pool.next_era_to_settle += 1;
    }
    Ok(settled)
}

/// `stake * acc / PER_TRILL` without forming the full product.
fn share_of(stake: Amount, acc: Amount) -> Result<Amount, StrataError> {
    let whole = (stake / PER_TRILL)
        .checked_mul(acc)
        .ok_or(StrataError::Overflow("stake share"))?;
    let part = (stake % PER_TRILL)
        .checked_mul(acc)
        .ok_or(StrataError::Overflow("stake share"))?
        / PER_TRILL;
    whole
        .checked_add(part)
        .ok_or(StrataError::Overflow("stake share"))
}

fn accrued(share: &StakeShare, acc: Amount) -> Result<Amount, StrataError> {
    share_of(share.stake, acc)?
        .checked_sub(share.reward_debt)
        .and_then(|earned| earned.checked_add(share.pending))
        .ok_or(StrataError::Overflow("user rewards"))
}

/// Split an agreement payment into per-era reward streams.
fn spread_agreement(
    value: Amount,
    start: Timestamp,
    period: Seconds,
    clock: &EraClock,
) -> Result<Vec<RewardStream>, StrataError> {
    if period == 0 {
        return Err(StrataError::InvalidAmount("agreement period must be positive".to_string()));
    }
    if start < clock.era_start_time() || start >= clock.era_end() {
        return Err(StrataError::InvalidAmount(
            "agreement must start within the current era".to_string(),
        ));
    }
    let era = clock.era_number();
    let era_period = clock.era_period();
    let end = start
        .checked_add(period)
        .ok_or(StrataError::Overflow("agreement end"))?;
    let first_portion = clock.era_end().min(end).saturating_sub(start);
    if first_portion >= period {
        return Ok(vec![RewardStream {
            from: era,
            until: era + 1,
            rate: value,
        }]);
    }

    let first = portion(value, first_portion, period)?;
    let rest = period - first_portion;
    let full_eras = rest / era_period;
    let per_full = portion(value, era_period, period)?;
    let full_total = per_full
        .checked_mul(Amount::from(full_eras))
        .ok_or(StrataError::Overflow("agreement spread"))?;
    let last = value
        .checked_sub(first)
        .and_then(|v| v.checked_sub(full_total))
        .ok_or(StrataError::Overflow("agreement spread"))?;
    // A remainder with no partial tail era is rounding dust for the last full era.
    let last_era = if rest % era_period > 0 {
        era + 1 + full_eras
    } else {
        era + full_eras
    };

    Ok(vec![
        RewardStream {
            from: era,
            until: era + 1,
            rate: first,
        },
        RewardStream {
            from: era + 1,
            until: era + 1 + full_eras,
            rate: per_full,
        },
        RewardStream {
            from: last_era,
            until: last_era + 1,
            rate: last,
        },
    ])
}

/// `value * part / whole`, truncating.
fn portion(value: Amount, part: Seconds, whole: Seconds) -> Result<Amount, StrataError> {
    value
        .checked_mul(Amount::from(part))
        .map(|v| v / Amount::from(whole))
        .ok_or(StrataError::Overflow("agreement spread"))
}
