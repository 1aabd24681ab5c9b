// crates/strata-economics/src/ledger.rs
//
// The Strata ledger: one serialized state machine composing the token ledger,
// era clock, staking ledger, inflation scheduler, and reward distributor.
//
// Every mutating call takes the caller and the host's current time. Except for
// the era clock's own operations, each call first lazily advances the era
// (`safe_update_and_get_era`) so no component ever acts on an expired era.
// Calls either complete fully or fail without changing state, and each
// externally visible effect is appended to an event log the host drains.
// The lazy era advance and the settlement of already closed eras are driven
// by time alone and persist even when the rest of the call fails.
//
// Delegation changes only take effect at the next era. Each one is queued in
// the reward distributor, which snapshots it before settling that era no
// matter which call gets there first. The era keeper also applies the queue
// every tick (`apply_pending_stake_changes`).

use strata_core::{Account, Amount, EraNumber, LedgerEvent, Seconds, StrataError, Timestamp};

use crate::config::LedgerConfig;
use crate::era::EraClock;
use crate::inflation::{InflationMint, InflationScheduler};
use crate::rewards::{EraReward, PaymentSchedule, RewardsDistributor, StakeChange};
use crate::staking::{StakingLedger, WithdrawReceipt};
use crate::token::TokenLedger;

/// Accounts holding the privileged roles of a new ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenesisAccounts {
    /// Receives the genesis supply and owns every configuration setter.
    pub owner: Account,
    /// Sole caller of stake/unstake/unregister.
    pub registrar: Account,
    pub inflation_destination: Account,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
    tokens: TokenLedger,
    clock: EraClock,
    staking: StakingLedger,
    inflation: InflationScheduler,
    rewards: RewardsDistributor,
    events: Vec<LedgerEvent>,
}

impl Ledger {
    /// Create a ledger at era 0 with the genesis supply credited to the owner.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation.
    pub fn genesis(config: LedgerConfig, accounts: GenesisAccounts) -> Result<Self, StrataError> {
        config.validate()?;
        let tokens = TokenLedger::with_genesis(
            accounts.owner,
            config.genesis_supply,
            InflationScheduler::minter_account(),
        );
        let clock = EraClock::new(accounts.owner, config.era_period);
        let staking = StakingLedger::new(accounts.owner, accounts.registrar, config.staking_params());
        let inflation = InflationScheduler::new(
            accounts.owner,
            accounts.inflation_destination,
            config.inflation_rate_bp,
            0,
        )?;
        tracing::info!(
            owner = %accounts.owner,
            registrar = %accounts.registrar,
            era_period = config.era_period,
            genesis_supply = config.genesis_supply,
            "ledger genesis"
        );
        Ok(Self {
            config,
            tokens,
            clock,
            staking,
            inflation,
            rewards: RewardsDistributor::new(),
            events: Vec::new(),
        })
    }

    // ------------------------------------------------------------------
    // Component access (read-only)
    // ------------------------------------------------------------------

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    pub fn clock(&self) -> &EraClock {
        &self.clock
    }

    pub fn staking(&self) -> &StakingLedger {
        &self.staking
    }

    pub fn inflation(&self) -> &InflationScheduler {
        &self.inflation
    }

    pub fn rewards(&self) -> &RewardsDistributor {
        &self.rewards
    }

    /// Events not yet drained, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take every pending event, oldest first.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Token
    // ------------------------------------------------------------------

    pub fn transfer(&mut self, caller: Account, to: Account, amount: Amount) -> Result<(), StrataError> {
        self.tokens.transfer(&caller, &to, amount)
    }

    // ------------------------------------------------------------------
    // Era clock
    // ------------------------------------------------------------------

    pub fn era_number(&self) -> EraNumber {
        self.clock.era_number()
    }

    pub fn era_period(&self) -> Seconds {
        self.clock.era_period()
    }

    pub fn era_start_time(&self) -> Timestamp {
        self.clock.era_start_time()
    }

    /// # Errors
    /// `EraStillActive` before `era_start_time + era_period`.
    pub fn start_new_era(&mut self, caller: Account, now: Timestamp) -> Result<EraNumber, StrataError> {
        let era = self.clock.start_new_era(now)?;
        self.events.push(LedgerEvent::NewEraStart { era, caller });
        Ok(era)
    }

    /// Advance the era if it has expired and return the current era.
    pub fn safe_update_and_get_era(&mut self, caller: Account, now: Timestamp) -> EraNumber {
        let before = self.clock.era_number();
        let era = self.clock.safe_update_and_get_era(now);
        if era != before {
            self.events.push(LedgerEvent::NewEraStart { era, caller });
        }
        era
    }

    pub fn update_era_period(&mut self, caller: Account, period: Seconds) -> Result<(), StrataError> {
        self.clock.update_era_period(&caller, period)?;
        self.config.era_period = period;
        self.events.push(LedgerEvent::EraPeriodUpdate {
            era: self.clock.era_number(),
            period,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Staking
    // ------------------------------------------------------------------

    /// Registrar-only self-stake. The indexer's reward share is updated at once.
    pub fn stake(
        &mut self,
        caller: Account,
        indexer: Account,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        let stake = self
            .staking
            .get_delegation_amount(&indexer, &indexer, era)
            .checked_add(amount)
            .ok_or(StrataError::Overflow("staking amount"))?;
        // Stage the reward snapshot first; the staking write is the last step that can fail.
        let staged = self
            .rewards
            .stage_stake_change(&self.staking, indexer, indexer, era, stake)?;
        self.staking
            .stake(&mut self.tokens, &caller, indexer, amount, era)?;
        let change = self.rewards.commit_stake_change(staged);
        self.emit_settled(indexer, &change.settled);
        self.events.push(LedgerEvent::Staked { indexer, amount });
        Ok(())
    }

    /// Registrar-only partial unbond of an indexer's self-stake.
    pub fn unstake(
        &mut self,
        caller: Account,
        indexer: Account,
        amount: Amount,
        now: Timestamp,
    ) -> Result<u64, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        self.settle_closed_eras(indexer, era)?;
        let index = self.staking.unstake(&caller, indexer, amount, era, now)?;
        self.rewards.queue_stake_change(indexer, indexer, era);
        self.events.push(LedgerEvent::UnbondRequested {
            source: indexer,
            indexer,
            amount,
            index,
        });
        Ok(index)
    }

    /// Registrar-only full exit: leaves the active set and unbonds all self-stake.
    pub fn unregister_indexer(
        &mut self,
        caller: Account,
        indexer: Account,
        now: Timestamp,
    ) -> Result<Option<u64>, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        self.settle_closed_eras(indexer, era)?;
        let unbond = self.staking.unregister_indexer(&caller, indexer, era, now)?;
        self.events.push(LedgerEvent::IndexerUnregistered { indexer });
        Ok(unbond.map(|(index, amount)| {
            self.rewards.queue_stake_change(indexer, indexer, era);
            self.events.push(LedgerEvent::UnbondRequested {
                source: indexer,
                indexer,
                amount,
                index,
            });
            index
        }))
    }

    pub fn delegate(
        &mut self,
        caller: Account,
        indexer: Account,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        self.settle_closed_eras(indexer, era)?;
        self.staking
            .delegate(&mut self.tokens, caller, indexer, amount, era)?;
        self.rewards.queue_stake_change(indexer, caller, era);
        self.events.push(LedgerEvent::Delegated {
            source: caller,
            indexer,
            amount,
        });
        Ok(())
    }

    /// Returns the index of the new unbonding request.
    pub fn undelegate(
        &mut self,
        caller: Account,
        indexer: Account,
        amount: Amount,
        now: Timestamp,
    ) -> Result<u64, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        self.settle_closed_eras(indexer, era)?;
        let index = self.staking.undelegate(caller, indexer, amount, era, now)?;
        self.rewards.queue_stake_change(indexer, caller, era);
        self.events.push(LedgerEvent::UnbondRequested {
            source: caller,
            indexer,
            amount,
            index,
        });
        Ok(index)
    }

    pub fn redelegate(
        &mut self,
        caller: Account,
        from: Account,
        to: Account,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        self.settle_closed_eras(from, era)?;
        self.settle_closed_eras(to, era)?;
        self.staking.redelegate(caller, from, to, amount, era)?;
        self.rewards.queue_stake_change(from, caller, era);
        self.rewards.queue_stake_change(to, caller, era);
        self.events.push(LedgerEvent::Redelegated {
            source: caller,
            from,
            to,
            amount,
        });
        Ok(())
    }

    /// Settle up to ten of the caller's matured unbonding requests.
    pub fn withdraw(&mut self, caller: Account, now: Timestamp) -> Result<Vec<WithdrawReceipt>, StrataError> {
        self.safe_update_and_get_era(caller, now);
        let receipts = self.staking.withdraw(&mut self.tokens, caller, now)?;
        self.events.extend(receipts.iter().map(|r| LedgerEvent::Withdrawn {
            source: caller,
            index: r.index,
            amount: r.amount,
            fee: r.fee,
        }));
        Ok(receipts)
    }

    pub fn set_lock_period(&mut self, caller: Account, lock_period: Seconds, now: Timestamp) -> Result<(), StrataError> {
        self.safe_update_and_get_era(caller, now);
        self.staking.set_lock_period(&caller, lock_period)?;
        self.config.lock_period = lock_period;
        self.config_updated("lock_period", u128::from(lock_period));
        Ok(())
    }

    pub fn set_indexer_leverage_limit(&mut self, caller: Account, limit: u32, now: Timestamp) -> Result<(), StrataError> {
        self.safe_update_and_get_era(caller, now);
        self.staking.set_indexer_leverage_limit(&caller, limit)?;
        self.config.indexer_leverage_limit = limit;
        self.config_updated("indexer_leverage_limit", u128::from(limit));
        Ok(())
    }

    pub fn set_unbond_fee_rate_bp(&mut self, caller: Account, rate_bp: u32, now: Timestamp) -> Result<(), StrataError> {
        self.safe_update_and_get_era(caller, now);
        self.staking.set_unbond_fee_rate_bp(&caller, rate_bp)?;
        self.config.unbond_fee_rate_bp = rate_bp;
        self.config_updated("unbond_fee_rate_bp", u128::from(rate_bp));
        Ok(())
    }

    /// Active delegation of `source` to `indexer` in the current era.
    pub fn get_delegation_amount(&self, source: &Account, indexer: &Account) -> Amount {
        self.staking
            .get_delegation_amount(source, indexer, self.clock.era_number())
    }

    /// Active total stake of `indexer` in the current era.
    pub fn get_total_staking_amount(&self, indexer: &Account) -> Amount {
        self.staking
            .get_total_staking_amount(indexer, self.clock.era_number())
    }

    // ------------------------------------------------------------------
    // Inflation
    // ------------------------------------------------------------------

    pub fn get_not_inflated_eras(&self) -> u64 {
        self.inflation.get_not_inflated_eras(self.clock.era_number())
    }

    /// Mint inflation for up to ten pending eras. Any caller may trigger it.
    pub fn mint_inflated_tokens(&mut self, caller: Account, now: Timestamp) -> Result<InflationMint, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        let mint = self.inflation.mint_inflated_tokens(&mut self.tokens, era)?;
        self.events.push(LedgerEvent::InflationMinted {
            eras: mint.eras,
            amount: mint.amount,
            destination: mint.destination,
        });
        Ok(mint)
    }

    pub fn set_inflation_rate_bp(&mut self, caller: Account, rate_bp: u32, now: Timestamp) -> Result<(), StrataError> {
        self.safe_update_and_get_era(caller, now);
        self.inflation.set_inflation_rate_bp(&caller, rate_bp)?;
        self.config.inflation_rate_bp = rate_bp;
        self.config_updated("inflation_rate_bp", u128::from(rate_bp));
        Ok(())
    }

    pub fn set_inflation_destination(
        &mut self,
        caller: Account,
        destination: Account,
        now: Timestamp,
    ) -> Result<(), StrataError> {
        self.safe_update_and_get_era(caller, now);
        self.inflation
            .set_inflation_destination(&caller, destination)?;
        self.events
            .push(LedgerEvent::InflationDestinationUpdated { destination });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rewards
    // ------------------------------------------------------------------

    pub fn collect_and_distribute_rewards(
        &mut self,
        caller: Account,
        indexer: Account,
        now: Timestamp,
    ) -> Result<Vec<EraReward>, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        let settled = self
            .rewards
            .collect_and_distribute_rewards(&self.staking, indexer, era)?;
        self.emit_settled(indexer, &settled);
        Ok(settled)
    }

    /// Snapshot `user`'s active stake in `indexer` into the reward pool.
    pub fn apply_stake_change(
        &mut self,
        caller: Account,
        indexer: Account,
        user: Account,
        now: Timestamp,
    ) -> Result<StakeChange, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        let change = self
            .rewards
            .apply_stake_change(&self.staking, indexer, user, era)?;
        self.emit_settled(indexer, &change.settled);
        Ok(change)
    }

    /// Apply every queued stake snapshot whose change is now active.
    ///
    /// All or nothing: on failure every snapshot stays queued. Returns the
    /// number applied.
    pub fn apply_pending_stake_changes(&mut self, caller: Account, now: Timestamp) -> Result<usize, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        let pending = match self.rewards.apply_pending_stake_changes(&self.staking, era) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::warn!(
                    era,
                    queued = self.rewards.pending_stake_changes(),
                    error = %e,
                    "stake snapshots failed"
                );
                return Err(e);
            }
        };
        for (indexer, settled) in &pending.settled {
            self.emit_settled(*indexer, settled);
        }
        Ok(pending.applied)
    }

    /// Number of stake snapshots waiting to be applied.
    pub fn pending_stake_change_count(&self) -> usize {
        self.rewards.pending_stake_changes()
    }

    /// Pay the caller everything it has earned from `indexer`. Zero is a no-op.
    pub fn claim(&mut self, caller: Account, indexer: Account, now: Timestamp) -> Result<Amount, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        self.settle_closed_eras(indexer, era)?;
        let amount = self
            .rewards
            .claim(&mut self.tokens, &self.staking, indexer, caller, era)?;
        if amount > 0 {
            self.events.push(LedgerEvent::RewardsClaimed {
                indexer,
                beneficiary: caller,
                amount,
            });
        }
        Ok(amount)
    }

    /// Pay `value` from the caller to `indexer`'s stakeholders for the current era.
    pub fn deposit_payment(
        &mut self,
        caller: Account,
        indexer: Account,
        value: Amount,
        now: Timestamp,
    ) -> Result<PaymentSchedule, StrataError> {
        let era = self.safe_update_and_get_era(caller, now);
        let schedule = self
            .rewards
            .deposit_payment(&mut self.tokens, caller, indexer, value, era)?;
        self.payment_deposited(caller, indexer, value, schedule);
        Ok(schedule)
    }

    /// Spread a prepaid agreement from the caller over the eras it covers.
    pub fn increase_agreement_rewards(
        &mut self,
        caller: Account,
        indexer: Account,
        value: Amount,
        start: Timestamp,
        period: Seconds,
        now: Timestamp,
    ) -> Result<PaymentSchedule, StrataError> {
        self.safe_update_and_get_era(caller, now);
        let schedule = self.rewards.increase_agreement_rewards(
            &mut self.tokens,
            &self.clock,
            caller,
            indexer,
            value,
            start,
            period,
        )?;
        self.payment_deposited(caller, indexer, value, schedule);
        Ok(schedule)
    }

    pub fn get_acc_per_stake(&self, indexer: &Account) -> Amount {
        self.rewards.get_acc_per_stake(indexer)
    }

    pub fn user_rewards(&self, indexer: &Account, user: &Account) -> Result<Amount, StrataError> {
        self.rewards.user_rewards(indexer, user)
    }

    pub fn get_rewards_add_table(&self, indexer: &Account, from: EraNumber, count: usize) -> Vec<Amount> {
        self.rewards.get_rewards_add_table(indexer, from, count)
    }

    pub fn get_rewards_remove_table(&self, indexer: &Account, from: EraNumber, count: usize) -> Vec<Amount> {
        self.rewards.get_rewards_remove_table(indexer, from, count)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Settle `indexer` up to `era`, taking due snapshots, before its stake changes again.
    fn settle_closed_eras(&mut self, indexer: Account, era: EraNumber) -> Result<(), StrataError> {
        let settled = self
            .rewards
            .collect_and_distribute_rewards(&self.staking, indexer, era)?;
        self.emit_settled(indexer, &settled);
        Ok(())
    }

    fn emit_settled(&mut self, indexer: Account, settled: &[EraReward]) {
        self.events
            .extend(settled.iter().map(|r| LedgerEvent::RewardsDistributed {
                indexer,
                era: r.era,
                reward: r.reward,
            }));
    }

    fn payment_deposited(&mut self, payer: Account, indexer: Account, amount: Amount, schedule: PaymentSchedule) {
        self.events.push(LedgerEvent::PaymentDeposited {
            payer,
            indexer,
            amount,
            first_era: schedule.first_era,
            last_era: schedule.last_era,
        });
    }

    fn config_updated(&mut self, key: &str, value: u128) {
        tracing::info!(key, value, "ledger config updated");
        self.events.push(LedgerEvent::ConfigUpdated {
            key: key.to_string(),
            value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ErrorKind;

    const NOW: Timestamp = 1_700_000_000;
    const STAKE: Amount = 1_000_000_000;

    fn owner() -> Account {
        Account::from_label("owner")
    }

    fn registrar() -> Account {
        Account::from_label("registrar")
    }

    fn indexer() -> Account {
        Account::from_label("indexer")
    }

    fn delegator() -> Account {
        Account::from_label("delegator")
    }

    fn ledger() -> Ledger {
        Ledger::genesis(
            LedgerConfig::default(),
            GenesisAccounts {
                owner: owner(),
                registrar: registrar(),
                inflation_destination: Account::from_label("treasury"),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_genesis_state() {
        let ledger = ledger();
        assert_eq!(ledger.era_number(), 0);
        assert_eq!(ledger.era_start_time(), 0);
        assert_eq!(ledger.era_period(), 86_400);
        assert_eq!(ledger.tokens().balance_of(&owner()), 10u128.pow(28));
        assert_eq!(ledger.get_not_inflated_eras(), 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_genesis_rejects_invalid_config() {
        let config = LedgerConfig {
            unbond_fee_rate_bp: 20_000,
            ..LedgerConfig::default()
        };
        let accounts = GenesisAccounts {
            owner: owner(),
            registrar: registrar(),
            inflation_destination: owner(),
        };
        assert!(matches!(
            Ledger::genesis(config, accounts),
            Err(StrataError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_mutations_advance_expired_era_lazily() {
        let mut ledger = ledger();
        ledger.transfer(owner(), indexer(), STAKE).unwrap();
        ledger.stake(registrar(), indexer(), STAKE, NOW).unwrap();
        assert_eq!(ledger.era_number(), 1);

        let events = ledger.drain_events();
        assert_eq!(
            events[0],
            LedgerEvent::NewEraStart {
                era: 1,
                caller: registrar()
            }
        );
        assert_eq!(events.last().unwrap().name(), "staked");
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_failed_stake_leaves_no_trace() {
        let mut ledger = ledger();
        ledger.start_new_era(owner(), NOW).unwrap();
        ledger.drain_events();
        // The indexer holds no tokens
        let err = ledger.stake(registrar(), indexer(), STAKE, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert_eq!(ledger.staking().indexer_length(), 0);
        assert_eq!(ledger.rewards().pool(&indexer()).total_stake, 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_pending_stake_changes_apply_next_era() {
        let mut ledger = ledger();
        ledger.transfer(owner(), indexer(), STAKE).unwrap();
        ledger.transfer(owner(), delegator(), STAKE).unwrap();
        ledger.stake(registrar(), indexer(), STAKE, NOW).unwrap();
        ledger.delegate(delegator(), indexer(), 1000, NOW).unwrap();
        assert_eq!(ledger.pending_stake_change_count(), 1);

        // Same era: the delegation is not active yet, nothing to apply
        assert_eq!(ledger.apply_pending_stake_changes(owner(), NOW + 1).unwrap(), 0);

        let next = NOW + ledger.era_period();
        ledger.start_new_era(owner(), next).unwrap();
        assert_eq!(ledger.apply_pending_stake_changes(owner(), next).unwrap(), 1);
        assert_eq!(ledger.pending_stake_change_count(), 0);
        assert_eq!(ledger.rewards().stake_share(&indexer(), &delegator()).stake, 1000);
        assert_eq!(ledger.rewards().pool(&indexer()).total_stake, STAKE + 1000);
    }

    #[test]
    fn test_collect_before_apply_prices_active_delegation() {
        let mut ledger = ledger();
        let period = ledger.era_period();
        ledger.transfer(owner(), indexer(), STAKE).unwrap();
        ledger.transfer(owner(), delegator(), 3 * STAKE).unwrap();
        ledger.stake(registrar(), indexer(), STAKE, NOW).unwrap();
        ledger.delegate(delegator(), indexer(), 3 * STAKE, NOW).unwrap();

        ledger.start_new_era(owner(), NOW + period).unwrap();
        ledger.deposit_payment(owner(), indexer(), 4000, NOW + period).unwrap();
        ledger.start_new_era(owner(), NOW + 2 * period).unwrap();

        // Settlement runs before anyone applied the queued snapshot
        ledger
            .collect_and_distribute_rewards(owner(), indexer(), NOW + 2 * period)
            .unwrap();
        assert_eq!(ledger.pending_stake_change_count(), 0);
        assert_eq!(ledger.apply_pending_stake_changes(owner(), NOW + 2 * period).unwrap(), 0);
        assert_eq!(ledger.user_rewards(&indexer(), &indexer()).unwrap(), 1000);
        assert_eq!(ledger.user_rewards(&indexer(), &delegator()).unwrap(), 3000);
        assert_eq!(ledger.claim(delegator(), indexer(), NOW + 2 * period).unwrap(), 3000);
    }

    #[test]
    fn test_failed_delegate_keeps_queued_change() {
        let mut ledger = ledger();
        ledger.transfer(owner(), indexer(), STAKE).unwrap();
        ledger.transfer(owner(), delegator(), STAKE).unwrap();
        ledger.stake(registrar(), indexer(), STAKE, NOW).unwrap();
        ledger.delegate(delegator(), indexer(), 1000, NOW).unwrap();
        ledger.drain_events();

        // Over the delegator's balance: nothing changes
        let err = ledger.delegate(delegator(), indexer(), STAKE, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert_eq!(ledger.pending_stake_change_count(), 1);
        assert_eq!(ledger.staking().get_staking_amount(&delegator(), &indexer(), 1).value_after(), 1000);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_config_setters_emit_events() {
        let mut ledger = ledger();
        ledger.set_lock_period(owner(), 100, NOW).unwrap();
        ledger.set_inflation_rate_bp(owner(), 0, NOW).unwrap();
        assert_eq!(ledger.config().lock_period, 100);
        assert_eq!(ledger.staking().lock_period(), 100);
        assert_eq!(ledger.inflation().inflation_rate_bp(), 0);

        let names: Vec<&str> = ledger.events().iter().map(LedgerEvent::name).collect();
        assert_eq!(names, vec!["new_era_start", "config_updated", "config_updated"]);

        let err = ledger.set_lock_period(delegator(), 1, NOW).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(ledger.config().lock_period, 100);
    }

    #[test]
    fn test_update_era_period_event() {
        let mut ledger = ledger();
        ledger.update_era_period(owner(), 10).unwrap();
        assert_eq!(
            ledger.drain_events(),
            vec![LedgerEvent::EraPeriodUpdate { era: 0, period: 10 }]
        );
        assert_eq!(ledger.era_period(), 10);
    }
}
