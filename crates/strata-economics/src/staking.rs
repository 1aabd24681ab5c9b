// crates/strata-economics/src/staking.rs
//
// Staking ledger: self-stake, delegation, unbonding, and withdrawal.
//
// Every balance is a `DeferredValue<Amount>` keyed by (delegator, indexer).
// Self-stake written by the registrar applies immediately; every other write
// lands in `value_after` and becomes active at the next era. Tokens move into
// the escrow account on stake/delegate and leave it only through `withdraw`,
// where the unbond fee is burned.
//
// Each operation validates against copies of the affected records, performs
// the (atomic) token movement, and only then commits. A failed call leaves no
// trace.
//
// Defaults (see `StakingParams::default`):
//   - Lock period: 1,000 s
//   - Indexer leverage limit: 10x self-stake
//   - Unbond fee: 10 bp, burned

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use strata_core::{
    bp_of, ensure_rate_bp, Account, Amount, Authority, DeferredValue, EraNumber, Role, Seconds,
    StrataError, Timestamp,
};

use crate::indexer_set::IndexerSet;
use crate::token::TokenLedger;
use crate::unbonding::{UnbondingQueue, UnbondingRequest, MAX_WITHDRAWALS_PER_CALL};

/// Default unbonding lock period in seconds.
pub const DEFAULT_LOCK_PERIOD: Seconds = 1_000;

/// Default multiple of self-stake an indexer may accept in total delegation.
pub const DEFAULT_INDEXER_LEVERAGE_LIMIT: u32 = 10;

/// Default unbond fee in basis points.
pub const DEFAULT_UNBOND_FEE_RATE_BP: u32 = 10;

/// Label of the module account that escrows all staked tokens.
pub const STAKING_ESCROW_LABEL: &str = "strata/staking";

/// Owner-adjustable staking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    pub lock_period: Seconds,
    pub indexer_leverage_limit: u32,
    pub unbond_fee_rate_bp: u32,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            lock_period: DEFAULT_LOCK_PERIOD,
            indexer_leverage_limit: DEFAULT_INDEXER_LEVERAGE_LIMIT,
            unbond_fee_rate_bp: DEFAULT_UNBOND_FEE_RATE_BP,
        }
    }
}

/// One settled unbonding request, as paid out by `withdraw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub index: u64,
    pub indexer: Account,
    /// Amount of the request before the fee.
    pub amount: Amount,
    /// Portion burned as the unbond fee.
    pub fee: Amount,
}

impl WithdrawReceipt {
    /// Amount actually transferred to the source.
    pub fn net(&self) -> Amount {
        self.amount - self.fee
    }
}

/// Owns delegations, indexer totals, the active indexer set, and unbonding queues.
#[derive(Debug, Clone)]
pub struct StakingLedger {
    params: StakingParams,
    owner: Authority,
    registrar: Authority,
    escrow: Account,
    /// Keyed by (delegator, indexer).
    delegations: HashMap<(Account, Account), DeferredValue<Amount>>,
    totals: HashMap<Account, DeferredValue<Amount>>,
    indexers: IndexerSet,
    unbondings: HashMap<Account, UnbondingQueue>,
    /// Per delegator, every indexer it has ever staked to, in first-stake order.
    staking_indexers: HashMap<Account, Vec<Account>>,
    staking_indexer_nos: HashMap<(Account, Account), usize>,
}

impl StakingLedger {
    pub fn new(owner: Account, registrar: Account, params: StakingParams) -> Self {
        Self {
            params,
            owner: Authority::new(owner, Role::Owner),
            registrar: Authority::new(registrar, Role::Registrar),
            escrow: Account::from_label(STAKING_ESCROW_LABEL),
            delegations: HashMap::new(),
            totals: HashMap::new(),
            indexers: IndexerSet::new(),
            unbondings: HashMap::new(),
            staking_indexers: HashMap::new(),
            staking_indexer_nos: HashMap::new(),
        }
    }

    /// Account holding every staked token.
    pub fn escrow(&self) -> Account {
        self.escrow
    }

    pub fn params(&self) -> StakingParams {
        self.params
    }

    pub fn lock_period(&self) -> Seconds {
        self.params.lock_period
    }

    pub fn indexer_leverage_limit(&self) -> u32 {
        self.params.indexer_leverage_limit
    }

    pub fn unbond_fee_rate_bp(&self) -> u32 {
        self.params.unbond_fee_rate_bp
    }

    pub fn owner(&self) -> Account {
        self.owner.holder()
    }

    pub fn registrar(&self) -> Account {
        self.registrar.holder()
    }

    // ------------------------------------------------------------------
    // Privileged configuration
    // ------------------------------------------------------------------

    pub fn set_lock_period(&mut self, caller: &Account, lock_period: Seconds) -> Result<(), StrataError> {
        self.owner.ensure(caller)?;
        self.params.lock_period = lock_period;
        Ok(())
    }

    pub fn set_indexer_leverage_limit(&mut self, caller: &Account, limit: u32) -> Result<(), StrataError> {
        self.owner.ensure(caller)?;
        if limit == 0 {
            return Err(StrataError::InvalidAmount(
                "indexer leverage limit must be positive".to_string(),
            ));
        }
        self.params.indexer_leverage_limit = limit;
        Ok(())
    }

    pub fn set_unbond_fee_rate_bp(&mut self, caller: &Account, rate_bp: u32) -> Result<(), StrataError> {
        self.owner.ensure(caller)?;
        self.params.unbond_fee_rate_bp = ensure_rate_bp(rate_bp)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registrar operations
    // ------------------------------------------------------------------

    /// Self-stake `amount` for `indexer`, effective immediately.
    ///
    /// Tokens are pulled from the indexer's balance. The first stake adds the
    /// indexer to the active set.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is the registrar; `InvalidAmount` for a
    /// zero amount; `InsufficientBalance` if the indexer cannot pay.
    pub fn stake(
        &mut self,
        tokens: &mut TokenLedger,
        caller: &Account,
        indexer: Account,
        amount: Amount,
        era: EraNumber,
    ) -> Result<(), StrataError> {
        self.registrar.ensure(caller)?;
        ensure_positive(amount)?;

        let mut own = self.delegation_record(&indexer, &indexer);
        own.update_now(era, |v| add(v, amount))?;
        let mut total = self.total_record(&indexer);
        total.update_now(era, |v| add(v, amount))?;

        tokens.transfer(&indexer, &self.escrow, amount)?;

        self.delegations.insert((indexer, indexer), own);
        self.totals.insert(indexer, total);
        self.indexers.insert(indexer);
        self.record_staking_indexer(indexer, indexer);
        tracing::debug!(indexer = %indexer, amount, era, "self-stake applied");
        Ok(())
    }

    /// Begin unbonding part of an indexer's self-stake.
    ///
    /// The remaining self-stake must still cover the indexer's total
    /// delegation at the current leverage limit. Returns the unbonding index.
    pub fn unstake(
        &mut self,
        caller: &Account,
        indexer: Account,
        amount: Amount,
        era: EraNumber,
        now: Timestamp,
    ) -> Result<u64, StrataError> {
        self.registrar.ensure(caller)?;
        ensure_positive(amount)?;

        let mut own = self.delegation_record(&indexer, &indexer);
        let mut total = self.total_record(&indexer);
        own.update_after(era, |v| sub_delegation(v, amount))?;
        total.update_after(era, |v| sub_delegation(v, amount))?;
        self.ensure_leverage(own.value_after(), total.value_after())?;

        self.delegations.insert((indexer, indexer), own);
        self.totals.insert(indexer, total);
        Ok(self.push_unbonding(indexer, indexer, amount, now))
    }

    /// Remove `indexer` from the active set and unbond its whole self-stake.
    ///
    /// Returns the unbonding index and amount, or `None` if there was no
    /// self-stake left to unbond.
    pub fn unregister_indexer(
        &mut self,
        caller: &Account,
        indexer: Account,
        era: EraNumber,
        now: Timestamp,
    ) -> Result<Option<(u64, Amount)>, StrataError> {
        self.registrar.ensure(caller)?;
        if !self.indexers.contains(&indexer) {
            return Err(StrataError::NotFound(format!("indexer {}", indexer)));
        }

        let mut own = self.delegation_record(&indexer, &indexer);
        let amount = own.value_after();
        let mut total = self.total_record(&indexer);
        own.update_after(era, |v| sub_delegation(v, amount))?;
        total.update_after(era, |v| sub_delegation(v, amount))?;

        self.indexers.remove(&indexer);
        self.delegations.insert((indexer, indexer), own);
        self.totals.insert(indexer, total);
        tracing::info!(indexer = %indexer, amount, "indexer unregistered");
        if amount == 0 {
            return Ok(None);
        }
        Ok(Some((self.push_unbonding(indexer, indexer, amount, now), amount)))
    }

    // ------------------------------------------------------------------
    // Delegator operations
    // ------------------------------------------------------------------

    /// Delegate `amount` from `caller` to `indexer`, effective next era.
    ///
    /// # Errors
    /// `NotFound` if `indexer` is not active; `SelfDelegationLocked` if the
    /// caller is the indexer; `LeverageExceeded` if the pending total would
    /// exceed `self_stake * leverage_limit`; `InsufficientBalance` if the
    /// caller cannot pay.
    pub fn delegate(
        &mut self,
        tokens: &mut TokenLedger,
        caller: Account,
        indexer: Account,
        amount: Amount,
        era: EraNumber,
    ) -> Result<(), StrataError> {
        ensure_positive(amount)?;
        if caller == indexer {
            return Err(StrataError::SelfDelegationLocked);
        }
        self.ensure_active(&indexer)?;

        let (delegation, total) = self.planned_increase(caller, indexer, amount, era)?;
        tokens.transfer(&caller, &self.escrow, amount)?;

        self.delegations.insert((caller, indexer), delegation);
        self.totals.insert(indexer, total);
        self.record_staking_indexer(caller, indexer);
        tracing::debug!(source = %caller, indexer = %indexer, amount, era, "delegation queued");
        Ok(())
    }

    /// Begin unbonding `amount` of `caller`'s delegation to `indexer`.
    ///
    /// Returns the index of the new unbonding request.
    pub fn undelegate(
        &mut self,
        caller: Account,
        indexer: Account,
        amount: Amount,
        era: EraNumber,
        now: Timestamp,
    ) -> Result<u64, StrataError> {
        ensure_positive(amount)?;
        if caller == indexer {
            return Err(StrataError::SelfDelegationLocked);
        }

        let (delegation, total) = self.planned_decrease(caller, indexer, amount, era)?;
        self.delegations.insert((caller, indexer), delegation);
        self.totals.insert(indexer, total);
        Ok(self.push_unbonding(caller, indexer, amount, now))
    }

    /// Move `amount` of `caller`'s delegation from `from` to `to` without
    /// releasing it from escrow.
    pub fn redelegate(
        &mut self,
        caller: Account,
        from: Account,
        to: Account,
        amount: Amount,
        era: EraNumber,
    ) -> Result<(), StrataError> {
        ensure_positive(amount)?;
        if caller == from || caller == to {
            return Err(StrataError::SelfDelegationLocked);
        }
        if from == to {
            return Err(StrataError::InvalidAmount(
                "cannot redelegate to the same indexer".to_string(),
            ));
        }
        self.ensure_active(&to)?;

        let (from_delegation, from_total) = self.planned_decrease(caller, from, amount, era)?;
        let (to_delegation, to_total) = self.planned_increase(caller, to, amount, era)?;

        self.delegations.insert((caller, from), from_delegation);
        self.totals.insert(from, from_total);
        self.delegations.insert((caller, to), to_delegation);
        self.totals.insert(to, to_total);
        self.record_staking_indexer(caller, to);
        tracing::debug!(source = %caller, from = %from, to = %to, amount, era, "redelegation queued");
        Ok(())
    }

    /// Settle up to ten matured unbonding requests of `caller`, oldest first.
    ///
    /// The unbond fee of each request is burned; the rest is paid out.
    ///
    /// # Errors
    /// `NothingToWithdraw` if no request is both unsettled and matured.
    pub fn withdraw(
        &mut self,
        tokens: &mut TokenLedger,
        caller: Account,
        now: Timestamp,
    ) -> Result<Vec<WithdrawReceipt>, StrataError> {
        let queue = self
            .unbondings
            .get(&caller)
            .ok_or(StrataError::NothingToWithdraw)?;
        let ready = queue.matured(now, self.params.lock_period, MAX_WITHDRAWALS_PER_CALL);
        if ready.is_empty() {
            return Err(StrataError::NothingToWithdraw);
        }

        let mut receipts = Vec::with_capacity(ready.len());
        let mut gross: Amount = 0;
        let mut burned: Amount = 0;
        for &index in &ready {
            let request = queue
                .get(index)
                .ok_or_else(|| StrataError::NotFound(format!("unbonding request {}", index)))?;
            let fee = bp_of(request.amount, self.params.unbond_fee_rate_bp)?;
            gross = add(gross, request.amount)?;
            burned = add(burned, fee)?;
            receipts.push(WithdrawReceipt {
                index,
                indexer: request.indexer,
                amount: request.amount,
                fee,
            });
        }

        let available = tokens.balance_of(&self.escrow);
        if available < gross {
            return Err(StrataError::InsufficientBalance {
                requested: gross,
                available,
            });
        }
        tokens.transfer(&self.escrow, &caller, gross - burned)?;
        tokens.burn(&self.escrow, burned)?;

        if let Some(queue) = self.unbondings.get_mut(&caller) {
            queue.mark_settled(&ready);
        }
        tracing::info!(
            source = %caller,
            settled = receipts.len(),
            paid = gross - burned,
            burned,
            "unbonding requests withdrawn"
        );
        Ok(receipts)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The delegation record of (`source`, `indexer`) as seen from `era`.
    pub fn get_staking_amount(&self, source: &Account, indexer: &Account, era: EraNumber) -> DeferredValue<Amount> {
        self.delegation_record(source, indexer).view(era)
    }

    /// Active delegation of `source` to `indexer` in `era`.
    pub fn get_delegation_amount(&self, source: &Account, indexer: &Account, era: EraNumber) -> Amount {
        self.delegation_record(source, indexer).value_at(era)
    }

    /// Active total delegation (self-stake included) of `indexer` in `era`.
    pub fn get_total_staking_amount(&self, indexer: &Account, era: EraNumber) -> Amount {
        self.total_record(indexer).value_at(era)
    }

    /// The indexer's total record as seen from `era`.
    pub fn get_total_staking_record(&self, indexer: &Account, era: EraNumber) -> DeferredValue<Amount> {
        self.total_record(indexer).view(era)
    }

    pub fn get_unbonding_amount(&self, source: &Account, index: u64) -> Result<UnbondingRequest, StrataError> {
        self.unbondings
            .get(source)
            .and_then(|q| q.get(index))
            .copied()
            .ok_or_else(|| StrataError::NotFound(format!("unbonding request {} of {}", index, source)))
    }

    pub fn get_unbonding_amounts(&self, source: &Account) -> &[UnbondingRequest] {
        self.unbondings
            .get(source)
            .map(|q| q.requests())
            .unwrap_or(&[])
    }

    /// Sum of `source`'s requests not yet withdrawn.
    pub fn get_pending_unbonding(&self, source: &Account) -> Amount {
        self.unbondings
            .get(source)
            .map(|q| q.pending_amount())
            .unwrap_or(0)
    }

    pub fn unbonding_length(&self, source: &Account) -> u64 {
        self.unbondings.get(source).map(|q| q.len()).unwrap_or(0)
    }

    pub fn withdrawn_length(&self, source: &Account) -> u64 {
        self.unbondings
            .get(source)
            .map(|q| q.withdrawn_len())
            .unwrap_or(0)
    }

    pub fn indexer_length(&self) -> usize {
        self.indexers.len()
    }

    pub fn indexers(&self, index: usize) -> Option<Account> {
        self.indexers.get(index)
    }

    /// Enumeration slot of an active indexer.
    pub fn indexer_no(&self, indexer: &Account) -> Option<usize> {
        self.indexers.position(indexer)
    }

    pub fn is_indexer(&self, account: &Account) -> bool {
        self.indexers.contains(account)
    }

    pub fn active_indexers(&self) -> impl Iterator<Item = &Account> {
        self.indexers.iter()
    }

    pub fn get_staking_indexers_length(&self, source: &Account) -> usize {
        self.staking_indexers.get(source).map(Vec::len).unwrap_or(0)
    }

    pub fn staking_indexers(&self, source: &Account, index: usize) -> Option<Account> {
        self.staking_indexers
            .get(source)
            .and_then(|list| list.get(index))
            .copied()
    }

    pub fn staking_indexer_no(&self, source: &Account, indexer: &Account) -> Option<usize> {
        self.staking_indexer_nos.get(&(*source, *indexer)).copied()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn delegation_record(&self, source: &Account, indexer: &Account) -> DeferredValue<Amount> {
        self.delegations
            .get(&(*source, *indexer))
            .copied()
            .unwrap_or_default()
    }

    fn total_record(&self, indexer: &Account) -> DeferredValue<Amount> {
        self.totals.get(indexer).copied().unwrap_or_default()
    }

    fn ensure_active(&self, indexer: &Account) -> Result<(), StrataError> {
        if self.indexers.contains(indexer) {
            Ok(())
        } else {
            Err(StrataError::NotFound(format!("indexer {}", indexer)))
        }
    }

    /// Pending total must not exceed pending self-stake times the leverage limit.
    fn ensure_leverage(&self, self_stake: Amount, total: Amount) -> Result<(), StrataError> {
        let capacity = self_stake
            .checked_mul(Amount::from(self.params.indexer_leverage_limit))
            .ok_or(StrataError::Overflow("leverage capacity"))?;
        if total > capacity {
            return Err(StrataError::LeverageExceeded {
                requested: total,
                capacity,
            });
        }
        Ok(())
    }

    fn planned_increase(
        &self,
        source: Account,
        indexer: Account,
        amount: Amount,
        era: EraNumber,
    ) -> Result<(DeferredValue<Amount>, DeferredValue<Amount>), StrataError> {
        let mut delegation = self.delegation_record(&source, &indexer);
        let mut total = self.total_record(&indexer);
        delegation.update_after(era, |v| add(v, amount))?;
        total.update_after(era, |v| add(v, amount))?;
        let own = self.delegation_record(&indexer, &indexer).value_after();
        self.ensure_leverage(own, total.value_after())?;
        Ok((delegation, total))
    }

    fn planned_decrease(
        &self,
        source: Account,
        indexer: Account,
        amount: Amount,
        era: EraNumber,
    ) -> Result<(DeferredValue<Amount>, DeferredValue<Amount>), StrataError> {
        let mut delegation = self.delegation_record(&source, &indexer);
        let mut total = self.total_record(&indexer);
        delegation.update_after(era, |v| sub_delegation(v, amount))?;
        total.update_after(era, |v| sub_delegation(v, amount))?;
        Ok((delegation, total))
    }

    fn push_unbonding(&mut self, source: Account, indexer: Account, amount: Amount, now: Timestamp) -> u64 {
        let index = self.unbondings.entry(source).or_default().push(UnbondingRequest {
            source,
            indexer,
            amount,
            start_time: now,
            settled: false,
        });
        tracing::debug!(source = %source, indexer = %indexer, amount, index, "unbonding requested");
        index
    }

    fn record_staking_indexer(&mut self, source: Account, indexer: Account) {
        if self.staking_indexer_nos.contains_key(&(source, indexer)) {
            return;
        }
        let list = self.staking_indexers.entry(source).or_default();
        self.staking_indexer_nos.insert((source, indexer), list.len());
        list.push(indexer);
    }
}

fn ensure_positive(amount: Amount) -> Result<(), StrataError> {
    if amount == 0 {
        return Err(StrataError::InvalidAmount("amount should be positive".to_string()));
    }
    Ok(())
}

fn add(value: Amount, amount: Amount) -> Result<Amount, StrataError> {
    value
        .checked_add(amount)
        .ok_or(StrataError::Overflow("staking amount"))
}

fn sub_delegation(value: Amount, amount: Amount) -> Result<Amount, StrataError> {
    value
        .checked_sub(amount)
        .ok_or(StrataError::InsufficientDelegation {
            requested: amount,
            available: value,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ErrorKind;

    const STAKE: Amount = 1_000_000_000;
    const NOW: Timestamp = 1_700_000_000;
    const ERA: EraNumber = 1;

    struct Fixture {
        tokens: TokenLedger,
        staking: StakingLedger,
    }

    fn owner() -> Account {
        Account::from_label("owner")
    }

    fn registrar() -> Account {
        Account::from_label("registrar")
    }

    fn indexer() -> Account {
        Account::from_label("indexer")
    }

    fn indexer2() -> Account {
        Account::from_label("indexer2")
    }

    fn delegator() -> Account {
        Account::from_label("delegator")
    }

    /// Two registered indexers with `STAKE` each and a funded delegator.
    fn fixture() -> Fixture {
        let mut tokens = TokenLedger::with_genesis(owner(), 100 * STAKE, Account::from_label("minter"));
        for account in [indexer(), indexer2(), delegator()] {
            tokens.transfer(&owner(), &account, STAKE).unwrap();
        }
        let mut staking = StakingLedger::new(owner(), registrar(), StakingParams::default());
        staking.stake(&mut tokens, &registrar(), indexer(), STAKE, ERA).unwrap();
        staking.stake(&mut tokens, &registrar(), indexer2(), STAKE, ERA).unwrap();
        Fixture { tokens, staking }
    }

    #[test]
    fn test_default_params() {
        let params = StakingParams::default();
        assert_eq!(params.lock_period, 1000);
        assert_eq!(params.indexer_leverage_limit, 10);
        assert_eq!(params.unbond_fee_rate_bp, 10);
    }

    #[test]
    fn test_update_params_by_owner() {
        let Fixture { mut staking, .. } = fixture();
        staking.set_lock_period(&owner(), 100).unwrap();
        staking.set_indexer_leverage_limit(&owner(), 100).unwrap();
        staking.set_unbond_fee_rate_bp(&owner(), 100).unwrap();
        assert_eq!(staking.lock_period(), 100);
        assert_eq!(staking.indexer_leverage_limit(), 100);
        assert_eq!(staking.unbond_fee_rate_bp(), 100);
    }

    #[test]
    fn test_update_params_without_owner_fails() {
        let Fixture { mut staking, .. } = fixture();
        let other = indexer2();
        for err in [
            staking.set_lock_period(&other, 100).unwrap_err(),
            staking.set_indexer_leverage_limit(&other, 100).unwrap_err(),
            staking.set_unbond_fee_rate_bp(&other, 100).unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
        }
        assert_eq!(staking.params(), StakingParams::default());
    }

    #[test]
    fn test_unbond_fee_rate_out_of_range() {
        let Fixture { mut staking, .. } = fixture();
        let err = staking.set_unbond_fee_rate_bp(&owner(), 10_001).unwrap_err();
        assert_eq!(err, StrataError::RateOutOfRange(10_001));
    }

    #[test]
    fn test_stake_by_registrar() {
        let Fixture { tokens, staking } = fixture();
        assert_eq!(staking.indexer_length(), 2);
        assert_eq!(staking.indexer_no(&indexer()), Some(0));
        assert_eq!(staking.indexer_no(&indexer2()), Some(1));
        assert_eq!(staking.indexers(0), Some(indexer()));
        assert_eq!(staking.indexers(1), Some(indexer2()));
        assert_eq!(staking.staking_indexer_no(&indexer(), &indexer()), Some(0));
        assert_eq!(staking.staking_indexers(&indexer(), 0), Some(indexer()));
        assert_eq!(staking.get_staking_indexers_length(&indexer()), 1);

        // Self-stake is effective in the same era
        let own = staking.get_staking_amount(&indexer(), &indexer(), ERA);
        assert_eq!(own.value_at(ERA), STAKE);
        assert_eq!(own.value_after(), STAKE);
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA), STAKE);
        assert_eq!(tokens.balance_of(&staking.escrow()), 2 * STAKE);
    }

    #[test]
    fn test_stake_with_invalid_caller_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        let err = staking
            .stake(&mut tokens, &indexer(), indexer(), 1000, ERA)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA), STAKE);
    }

    #[test]
    fn test_delegate_is_deferred() {
        let Fixture { mut tokens, mut staking } = fixture();
        let escrow_before = tokens.balance_of(&staking.escrow());
        staking
            .delegate(&mut tokens, delegator(), indexer(), 1000, ERA)
            .unwrap();

        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer(), ERA), 0);
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA), STAKE);
        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer(), ERA + 1), 1000);
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA + 1), STAKE + 1000);
        assert_eq!(staking.get_staking_indexers_length(&delegator()), 1);
        assert_eq!(tokens.balance_of(&delegator()), STAKE - 1000);
        assert_eq!(tokens.balance_of(&staking.escrow()), escrow_before + 1000);
    }

    #[test]
    fn test_delegate_to_inactive_indexer_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        let err = staking
            .delegate(&mut tokens, delegator(), Account::from_label("nobody"), 10, ERA)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(tokens.balance_of(&delegator()), STAKE);
    }

    #[test]
    fn test_delegation_exceeding_leverage_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        let limit = Amount::from(staking.indexer_leverage_limit());
        tokens.transfer(&owner(), &delegator(), STAKE * limit).unwrap();
        let balance = tokens.balance_of(&delegator());

        let err = staking
            .delegate(&mut tokens, delegator(), indexer(), STAKE * limit, ERA)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(tokens.balance_of(&delegator()), balance);
        assert_eq!(staking.get_staking_amount(&delegator(), &indexer(), ERA).value_after(), 0);

        // Exactly up to capacity is allowed
        staking
            .delegate(&mut tokens, delegator(), indexer(), STAKE * (limit - 1), ERA)
            .unwrap();
    }

    #[test]
    fn test_redelegate() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 1000, ERA)
            .unwrap();
        let escrow = tokens.balance_of(&staking.escrow());
        staking
            .redelegate(delegator(), indexer(), indexer2(), 1000, ERA)
            .unwrap();

        let next = ERA + 1;
        assert_eq!(staking.get_staking_indexers_length(&delegator()), 2);
        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer(), next), 0);
        assert_eq!(staking.get_total_staking_amount(&indexer(), next), STAKE);
        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer2(), next), 1000);
        assert_eq!(staking.get_total_staking_amount(&indexer2(), next), STAKE + 1000);
        assert_eq!(tokens.balance_of(&staking.escrow()), escrow);
    }

    #[test]
    fn test_redelegate_with_invalid_params_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        let err = staking
            .redelegate(indexer(), indexer(), indexer2(), 1000, ERA)
            .unwrap_err();
        assert_eq!(err, StrataError::SelfDelegationLocked);

        staking
            .delegate(&mut tokens, delegator(), indexer(), 1000, ERA)
            .unwrap();
        let err = staking
            .redelegate(delegator(), indexer(), indexer2(), 1001, ERA)
            .unwrap_err();
        assert_eq!(
            err,
            StrataError::InsufficientDelegation {
                requested: 1001,
                available: 1000
            }
        );
        assert_eq!(staking.get_staking_amount(&delegator(), &indexer2(), ERA).value_after(), 0);
    }

    #[test]
    fn test_redelegate_exceeding_target_leverage_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 1000, ERA)
            .unwrap();
        // indexer2 can now only carry its own stake
        staking.set_indexer_leverage_limit(&owner(), 1).unwrap();

        let err = staking
            .redelegate(delegator(), indexer(), indexer2(), 1000, ERA)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
        assert_eq!(
            err,
            StrataError::LeverageExceeded {
                requested: STAKE + 1000,
                capacity: STAKE
            }
        );

        // Nothing moved on either side
        assert_eq!(staking.get_staking_amount(&delegator(), &indexer(), ERA).value_after(), 1000);
        assert_eq!(staking.get_total_staking_record(&indexer(), ERA).value_after(), STAKE + 1000);
        assert_eq!(staking.get_staking_amount(&delegator(), &indexer2(), ERA).value_after(), 0);
        assert_eq!(staking.get_total_staking_record(&indexer2(), ERA).value_after(), STAKE);
        assert_eq!(staking.get_staking_indexers_length(&delegator()), 1);
        assert_eq!(staking.staking_indexer_no(&delegator(), &indexer2()), None);
    }

    #[test]
    fn test_unstake_by_registrar() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 2000, ERA)
            .unwrap();
        let index = staking.unstake(&registrar(), indexer(), 1000, ERA, NOW).unwrap();
        assert_eq!(index, 0);

        let next = ERA + 1;
        assert_eq!(
            staking.get_staking_amount(&indexer(), &indexer(), next).value_after(),
            STAKE - 1000
        );
        assert_eq!(staking.get_total_staking_amount(&indexer(), next), STAKE + 1000);
        let request = staking.get_unbonding_amount(&indexer(), 0).unwrap();
        assert_eq!(request.amount, 1000);
        assert_eq!(request.start_time, NOW);
        assert_eq!(staking.unbonding_length(&indexer()), 1);
        assert_eq!(staking.withdrawn_length(&indexer()), 0);
        assert_eq!(staking.indexer_length(), 2);
    }

    #[test]
    fn test_unstake_with_invalid_caller_fails() {
        let Fixture { mut staking, .. } = fixture();
        let err = staking
            .unstake(&indexer2(), indexer2(), 1000, ERA, NOW)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_unregister_indexer_swap_removes() {
        let Fixture { mut staking, .. } = fixture();
        let unbond = staking
            .unregister_indexer(&registrar(), indexer(), ERA, NOW)
            .unwrap();
        assert_eq!(unbond, Some((0, STAKE)));

        assert_eq!(staking.indexer_length(), 1);
        assert_eq!(staking.indexer_no(&indexer()), None);
        assert_eq!(staking.indexer_no(&indexer2()), Some(0));
        assert_eq!(staking.indexers(0), Some(indexer2()));
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA + 1), 0);

        let err = staking
            .unregister_indexer(&registrar(), indexer(), ERA, NOW)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_undelegate_by_delegator() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 2000, ERA)
            .unwrap();
        assert_eq!(staking.undelegate(delegator(), indexer(), 1000, ERA, NOW).unwrap(), 0);

        let next = ERA + 1;
        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer(), next), 1000);
        assert_eq!(staking.get_total_staking_amount(&indexer(), next), STAKE + 1000);
        let request = staking.get_unbonding_amount(&delegator(), 0).unwrap();
        assert_eq!((request.amount, request.start_time), (1000, NOW));
        assert_eq!(request.indexer, indexer());
        assert_eq!(staking.unbonding_length(&delegator()), 1);
        assert_eq!(staking.withdrawn_length(&delegator()), 0);
    }

    #[test]
    fn test_multiple_undelegate_requests() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 2000, ERA)
            .unwrap();
        for i in 0..3 {
            assert_eq!(
                staking.undelegate(delegator(), indexer(), 500, ERA, NOW + i).unwrap(),
                i
            );
        }

        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer(), ERA + 1), 500);
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA + 1), STAKE + 500);
        let requests = staking.get_unbonding_amounts(&delegator());
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.amount == 500));
        assert_eq!(requests[2].start_time, NOW + 2);
        assert_eq!(staking.get_pending_unbonding(&delegator()), 1500);
    }

    #[test]
    fn test_undelegate_with_invalid_params_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 2000, ERA)
            .unwrap();

        let err = staking.undelegate(indexer(), indexer(), STAKE, ERA, NOW).unwrap_err();
        assert_eq!(err, StrataError::SelfDelegationLocked);
        let err = staking.undelegate(delegator(), indexer(), 0, ERA, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        let err = staking.undelegate(delegator(), indexer(), 2001, ERA, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert_eq!(staking.unbonding_length(&delegator()), 0);
    }

    #[test]
    fn test_withdraw_single_request() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 10_000, ERA)
            .unwrap();
        staking.undelegate(delegator(), indexer(), 1000, ERA, NOW).unwrap();
        staking
            .undelegate(delegator(), indexer(), 1000, ERA, NOW + DEFAULT_LOCK_PERIOD)
            .unwrap();

        let balance = tokens.balance_of(&delegator());
        let escrow = tokens.balance_of(&staking.escrow());
        let supply = tokens.total_supply();
        let receipts = staking
            .withdraw(&mut tokens, delegator(), NOW + DEFAULT_LOCK_PERIOD)
            .unwrap();

        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].fee, 1); // 1000 * 10 / 10000
        assert_eq!(tokens.balance_of(&delegator()), balance + 999);
        assert_eq!(tokens.balance_of(&staking.escrow()), escrow - 1000);
        assert_eq!(tokens.total_supply(), supply - 1);
        assert_eq!(staking.unbonding_length(&delegator()), 2);
        assert_eq!(staking.withdrawn_length(&delegator()), 1);
    }

    #[test]
    fn test_withdraw_max_ten_requests_per_call() {
        let Fixture { mut tokens, mut staking } = fixture();
        staking
            .delegate(&mut tokens, delegator(), indexer(), 10_000, ERA)
            .unwrap();
        for _ in 0..12 {
            staking.undelegate(delegator(), indexer(), 500, ERA, NOW).unwrap();
        }
        let later = NOW + DEFAULT_LOCK_PERIOD;
        for _ in 0..3 {
            staking.undelegate(delegator(), indexer(), 500, ERA, later).unwrap();
        }
        assert_eq!(staking.unbonding_length(&delegator()), 15);

        let balance = tokens.balance_of(&delegator());
        let net = 500 - 500 * 10 / 10_000;

        assert_eq!(staking.withdraw(&mut tokens, delegator(), later).unwrap().len(), 10);
        assert_eq!(tokens.balance_of(&delegator()), balance + 10 * net);
        assert_eq!(staking.withdrawn_length(&delegator()), 10);

        assert_eq!(staking.withdraw(&mut tokens, delegator(), later).unwrap().len(), 2);
        assert_eq!(staking.withdrawn_length(&delegator()), 12);

        let err = staking.withdraw(&mut tokens, delegator(), later).unwrap_err();
        assert_eq!(err, StrataError::NothingToWithdraw);

        let last = later + DEFAULT_LOCK_PERIOD;
        assert_eq!(staking.withdraw(&mut tokens, delegator(), last).unwrap().len(), 3);
        assert_eq!(tokens.balance_of(&delegator()), balance + 15 * net);
        assert_eq!(staking.withdrawn_length(&delegator()), 15);
        assert_eq!(staking.unbonding_length(&delegator()), 15);
    }

    #[test]
    fn test_withdraw_without_requests_fails() {
        let Fixture { mut tokens, mut staking } = fixture();
        let err = staking.withdraw(&mut tokens, delegator(), NOW).unwrap_err();
        assert_eq!(err, StrataError::NothingToWithdraw);
    }

    #[test]
    fn test_delegate_then_undelegate_round_trip() {
        let Fixture { mut tokens, mut staking } = fixture();
        let before = staking.get_delegation_amount(&delegator(), &indexer(), ERA + 1);
        staking
            .delegate(&mut tokens, delegator(), indexer(), 777, ERA)
            .unwrap();
        staking.undelegate(delegator(), indexer(), 777, ERA, NOW).unwrap();
        assert_eq!(staking.get_delegation_amount(&delegator(), &indexer(), ERA + 1), before);
        assert_eq!(staking.get_total_staking_amount(&indexer(), ERA + 1), STAKE);
    }
}
