// crates/strata-economics/src/token.rs
//
// The ledger token: balances, supply, minting, and burning.
//
// The smallest unit is the base unit; 1 STRA = 10^18 base units. All internal
// accounting uses base units to avoid floating-point precision issues. Staking
// escrow and the reward pool are ordinary accounts on this ledger, so
// conservation of supply can be checked by summing balances.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use strata_core::{Account, Amount, Authority, Role, StrataError};

/// Number of base units in one STRA.
pub const UNITS_PER_TOKEN: Amount = 1_000_000_000_000_000_000;

/// Genesis supply: 10 billion STRA, credited to the ledger owner.
pub const GENESIS_SUPPLY: Amount = 10_000_000_000 * UNITS_PER_TOKEN;

/// A token amount, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tokens(pub Amount);

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{} STRA", whole)
        } else {
            // Up to 18 decimal places, trailing zeros trimmed
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} STRA", whole, trimmed)
        }
    }
}

/// Balances of every account plus total supply.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    balances: HashMap<Account, Amount>,
    total_supply: Amount,
    minter: Authority,
}

impl TokenLedger {
    /// Create a ledger with `supply` credited to `holder`.
    ///
    /// Only `minter` may issue new supply afterwards.
    pub fn with_genesis(holder: Account, supply: Amount, minter: Account) -> Self {
        let mut balances = HashMap::new();
        if supply > 0 {
            balances.insert(holder, supply);
        }
        Self {
            balances,
            total_supply: supply,
            minter: Authority::new(minter, Role::Minter),
        }
    }

    pub fn balance_of(&self, account: &Account) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn minter(&self) -> Account {
        self.minter.holder()
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// Returns `StrataError::InsufficientBalance` if `from` holds less than `amount`.
    pub fn transfer(&mut self, from: &Account, to: &Account, amount: Amount) -> Result<(), StrataError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(StrataError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(StrataError::Overflow("token transfer"))?;
        self.set_balance(*from, available - amount);
        self.set_balance(*to, credited);
        Ok(())
    }

    /// Issue `amount` new units to `to`.
    ///
    /// # Errors
    /// Returns `StrataError::Unauthorized` unless `caller` is the minter.
    pub fn mint(&mut self, caller: &Account, to: &Account, amount: Amount) -> Result<(), StrataError> {
        self.minter.ensure(caller)?;
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(StrataError::Overflow("token supply"))?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(StrataError::Overflow("token mint"))?;
        self.total_supply = supply;
        self.set_balance(*to, credited);
        Ok(())
    }

    /// Destroy `amount` units held by `from`.
    pub fn burn(&mut self, from: &Account, amount: Amount) -> Result<(), StrataError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(StrataError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        self.set_balance(*from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    fn set_balance(&mut self, account: Account, balance: Amount) {
        if balance == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }
}
