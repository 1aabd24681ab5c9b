// crates/strata-daemon/src/scheduler.rs
//
// Era keeper: the periodic external trigger the ledger relies on.
//
// Each tick, under one write lock:
//   1. start a new era if the current one has expired
//   2. apply queued stake snapshots that became active
//   3. mint inflation in capped batches until no era is left uninflated
//   4. collect and distribute rewards for every active indexer
//   5. drain the ledger's events and log them as JSON
//
// The loop stops on Ctrl-C or after `max_ticks` ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use strata_core::{Account, Amount, EraNumber, StrataError};
use strata_economics::Ledger;

use crate::clock::ClockSource;

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Era started by this tick, if any.
    pub new_era: Option<EraNumber>,
    pub stake_changes_applied: usize,
    pub inflated_eras: u64,
    pub minted: Amount,
    /// Number of (indexer, era) settlements.
    pub eras_settled: usize,
    pub events: usize,
}

pub struct EraKeeper {
    ledger: Arc<RwLock<Ledger>>,
    clock: ClockSource,
    caller: Account,
    tick_interval: Duration,
}

impl EraKeeper {
    pub fn new(
        ledger: Arc<RwLock<Ledger>>,
        clock: ClockSource,
        caller: Account,
        tick_interval: Duration,
    ) -> Self {
        Self {
            ledger,
            clock,
            caller,
            tick_interval,
        }
    }

    /// Run ticks until Ctrl-C or `max_ticks`. Returns the number of ticks run.
    ///
    /// A failed tick is logged and the loop continues.
    pub async fn run(&mut self, max_ticks: Option<u64>) -> u64 {
        tracing::info!(
            "Era keeper started (tick_interval={:?}, max_ticks={:?})",
            self.tick_interval,
            max_ticks
        );

        let mut ticks = 0u64;
        while max_ticks.map_or(true, |max| ticks < max) {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Era keeper received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.tick_interval) => {
                    if let Err(e) = self.tick().await {
                        tracing::error!("Keeper tick failed: {}", e);
                    }
                    ticks += 1;
                }
            }
        }

        tracing::info!(ticks, "Era keeper stopped");
        ticks
    }

    /// Perform one keeper pass at the clock's current time, then advance the clock.
    pub async fn tick(&mut self) -> Result<TickReport, StrataError> {
        let now = self.clock.now();
        let result = {
            let mut ledger = self.ledger.write().await;
            keep(&mut ledger, self.caller, now)
        };
        self.clock.advance();
        result
    }
}

fn keep(ledger: &mut Ledger, caller: Account, now: u64) -> Result<TickReport, StrataError> {
    let mut report = TickReport::default();

    match ledger.start_new_era(caller, now) {
        Ok(era) => {
            tracing::info!("=== ERA {} START === (now {})", era, now);
            report.new_era = Some(era);
        }
        Err(e @ StrataError::EraStillActive { .. }) => {
            tracing::trace!("{}", e);
        }
        Err(e) => return Err(e),
    }

    report.stake_changes_applied = ledger.apply_pending_stake_changes(caller, now)?;

    while ledger.get_not_inflated_eras() > 0 {
        let mint = ledger.mint_inflated_tokens(caller, now)?;
        report.inflated_eras += mint.eras;
        report.minted = report
            .minted
            .checked_add(mint.amount)
            .ok_or(StrataError::Overflow("keeper mint total"))?;
    }

    let indexers: Vec<Account> = ledger.staking().active_indexers().copied().collect();
    for indexer in indexers {
        report.eras_settled += ledger
            .collect_and_distribute_rewards(caller, indexer, now)?
            .len();
    }

    for event in ledger.drain_events() {
        report.events += 1;
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(event = event.name(), "{}", json),
            Err(e) => tracing::warn!(event = event.name(), "event not serializable: {}", e),
        }
    }

    tracing::debug!(?report, "keeper tick");
    Ok(report)
}
