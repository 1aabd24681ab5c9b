// crates/strata-daemon/src/genesis.rs
//
// Builds the genesis ledger from the daemon config: creates the ledger,
// funds and self-stakes every configured indexer, then funds and places the
// configured delegations. All participant tokens come out of the owner's
// genesis balance.

use strata_core::{Account, StrataError, Timestamp};
use strata_economics::{GenesisAccounts, Ledger};

use crate::config::DaemonConfig;

/// Accounts derived from the config's labels.
pub fn genesis_accounts(config: &DaemonConfig) -> GenesisAccounts {
    GenesisAccounts {
        owner: Account::from_label(&config.owner),
        registrar: Account::from_label(&config.registrar),
        inflation_destination: Account::from_label(&config.inflation_destination),
    }
}

/// Create the ledger and apply the configured participants at `now`.
pub fn bootstrap(config: &DaemonConfig, now: Timestamp) -> Result<Ledger, StrataError> {
    let accounts = genesis_accounts(config);
    let mut ledger = Ledger::genesis(config.ledger.clone(), accounts)?;

    for indexer in &config.indexers {
        let account = Account::from_label(&indexer.label);
        ledger.transfer(accounts.owner, account, indexer.self_stake)?;
        ledger.stake(accounts.registrar, account, indexer.self_stake, now)?;
        tracing::info!(indexer = %indexer.label, self_stake = indexer.self_stake, "genesis indexer staked");
    }

    for delegation in &config.delegations {
        let delegator = Account::from_label(&delegation.delegator);
        let indexer = Account::from_label(&delegation.indexer);
        ledger.transfer(accounts.owner, delegator, delegation.amount)?;
        ledger.delegate(delegator, indexer, delegation.amount, now)?;
        tracing::info!(
            delegator = %delegation.delegator,
            indexer = %delegation.indexer,
            amount = delegation.amount,
            "genesis delegation queued"
        );
    }

    Ok(ledger)
}
