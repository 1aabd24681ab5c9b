// crates/strata-economics/src/inflation.rs
//
// Per-era compounding inflation.
//
// Every started era owes one inflation step of `rate_bp` basis points on the
// total supply. Steps are minted lazily by `mint_inflated_tokens`, which
// catches up at most ten eras per call and compounds them one at a time:
//   supply_{k+1} = supply_k * (10000 + rate_bp) / 10000
// Truncation happens at every step, so the result differs from a closed-form
// power and callers that want to predict the mint must iterate the same way.
//
// The scheduler's account is the token minter; nobody else can issue supply.

use serde::{Deserialize, Serialize};

use strata_core::{
    ensure_rate_bp, Account, Amount, Authority, EraNumber, Role, StrataError, BASIS_POINTS,
};

use crate::token::TokenLedger;

/// Default inflation rate per era, in basis points.
pub const DEFAULT_INFLATION_RATE_BP: u32 = 10;

/// Maximum number of eras inflated by a single mint.
pub const MAX_INFLATION_ERAS_PER_CALL: u64 = 10;

/// Label of the module account allowed to mint.
pub const INFLATION_MINTER_LABEL: &str = "strata/inflation";

/// Inflation parameters and progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflationState {
    pub rate_bp: u32,
    pub destination: Account,
    pub last_inflated_era: EraNumber,
}

/// Outcome of one `mint_inflated_tokens` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflationMint {
    /// Number of eras covered by this mint.
    pub eras: u64,
    pub amount: Amount,
    pub destination: Account,
}

#[derive(Debug, Clone)]
pub struct InflationScheduler {
    state: InflationState,
    owner: Authority,
    minter: Account,
}

impl InflationScheduler {
    /// Create a scheduler that has inflated up to `last_inflated_era`.
    pub fn new(
        owner: Account,
        destination: Account,
        rate_bp: u32,
        last_inflated_era: EraNumber,
    ) -> Result<Self, StrataError> {
        Ok(Self {
            state: InflationState {
                rate_bp: ensure_rate_bp(rate_bp)?,
                destination,
                last_inflated_era,
            },
            owner: Authority::new(owner, Role::Owner),
            minter: Self::minter_account(),
        })
    }

    /// Account the token ledger must accept as minter.
    pub fn minter_account() -> Account {
        Account::from_label(INFLATION_MINTER_LABEL)
    }

    pub fn state(&self) -> InflationState {
        self.state
    }

    pub fn inflation_rate_bp(&self) -> u32 {
        self.state.rate_bp
    }

    pub fn inflation_destination(&self) -> Account {
        self.state.destination
    }

    pub fn get_last_inflated_era(&self) -> EraNumber {
        self.state.last_inflated_era
    }

    /// Eras started since the last mint. Not capped.
    pub fn get_not_inflated_eras(&self, current_era: EraNumber) -> u64 {
        current_era.saturating_sub(self.state.last_inflated_era)
    }

    /// # Errors
    /// `RateOutOfRange` above 10000 BP. Zero is allowed.
    pub fn set_inflation_rate_bp(&mut self, caller: &Account, rate_bp: u32) -> Result<(), StrataError> {
        self.owner.ensure(caller)?;
        self.state.rate_bp = ensure_rate_bp(rate_bp)?;
        Ok(())
    }

    pub fn set_inflation_destination(&mut self, caller: &Account, destination: Account) -> Result<(), StrataError> {
        self.owner.ensure(caller)?;
        self.state.destination = destination;
        Ok(())
    }

    /// Mint inflation for up to ten pending eras.
    ///
    /// # Errors
    /// `AlreadyMinted` if every started era has been inflated.
    pub fn mint_inflated_tokens(
        &mut self,
        tokens: &mut TokenLedger,
        current_era: EraNumber,
    ) -> Result<InflationMint, StrataError> {
        let pending = self.get_not_inflated_eras(current_era);
        if pending == 0 {
            return Err(StrataError::AlreadyMinted);
        }
        let eras = pending.min(MAX_INFLATION_ERAS_PER_CALL);
        let supply = tokens.total_supply();
        let amount = compound(supply, self.state.rate_bp, eras)? - supply;

        if amount > 0 {
            tokens.mint(&self.minter, &self.state.destination, amount)?;
        }
        self.state.last_inflated_era += eras;
        tracing::info!(
            eras,
            amount,
            last_inflated_era = self.state.last_inflated_era,
            destination = %self.state.destination,
            "inflation minted"
        );
        Ok(InflationMint {
            eras,
            amount,
            destination: self.state.destination,
        })
    }
}

/// Apply `steps` truncating compounding steps of `rate_bp` to `supply`.
pub fn compound(supply: Amount, rate_bp: u32, steps: u64) -> Result<Amount, StrataError> {
    let factor = Amount::from(BASIS_POINTS + rate_bp);
    let denominator = Amount::from(BASIS_POINTS);
    (0..steps).try_fold(supply, |s, _| {
        s.checked_mul(factor)
            .map(|v| v / denominator)
            .ok_or(StrataError::Overflow("inflation compounding"))
    })
}
