// crates/strata-economics/src/config.rs
//
// Genesis parameters of a Strata ledger.
// Deserialized from the `[ledger]` table of the daemon config, or built from
// defaults that match a fresh deployment.

use serde::{Deserialize, Serialize};

use strata_core::{Amount, Seconds, StrataError, BASIS_POINTS};

use crate::era::DEFAULT_ERA_PERIOD;
use crate::inflation::DEFAULT_INFLATION_RATE_BP;
use crate::staking::{
    StakingParams, DEFAULT_INDEXER_LEVERAGE_LIMIT, DEFAULT_LOCK_PERIOD, DEFAULT_UNBOND_FEE_RATE_BP,
};
use crate::token::GENESIS_SUPPLY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Era length in seconds.
    #[serde(default = "default_era_period")]
    pub era_period: Seconds,

    /// Unbonding lock period in seconds.
    #[serde(default = "default_lock_period")]
    pub lock_period: Seconds,

    /// Total delegation an indexer may accept, as a multiple of its self-stake.
    #[serde(default = "default_indexer_leverage_limit")]
    pub indexer_leverage_limit: u32,

    #[serde(default = "default_unbond_fee_rate_bp")]
    pub unbond_fee_rate_bp: u32,

    /// Per-era inflation in basis points.
    #[serde(default = "default_inflation_rate_bp")]
    pub inflation_rate_bp: u32,

    /// Base units credited to the owner at genesis. Written as a decimal
    /// string since TOML integers stop at i64.
    #[serde(default = "default_genesis_supply", with = "amount_string")]
    pub genesis_supply: Amount,
}

fn default_era_period() -> Seconds {
    DEFAULT_ERA_PERIOD
}

fn default_lock_period() -> Seconds {
    DEFAULT_LOCK_PERIOD
}

fn default_indexer_leverage_limit() -> u32 {
    DEFAULT_INDEXER_LEVERAGE_LIMIT
}

fn default_unbond_fee_rate_bp() -> u32 {
    DEFAULT_UNBOND_FEE_RATE_BP
}

fn default_inflation_rate_bp() -> u32 {
    DEFAULT_INFLATION_RATE_BP
}

fn default_genesis_supply() -> Amount {
    GENESIS_SUPPLY
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            era_period: default_era_period(),
            lock_period: default_lock_period(),
            indexer_leverage_limit: default_indexer_leverage_limit(),
            unbond_fee_rate_bp: default_unbond_fee_rate_bp(),
            inflation_rate_bp: default_inflation_rate_bp(),
            genesis_supply: default_genesis_supply(),
        }
    }
}

impl LedgerConfig {
    /// Reject values no ledger could run with.
    pub fn validate(&self) -> Result<(), StrataError> {
        if self.era_period == 0 {
            return Err(StrataError::InvalidConfig("era_period must be positive".to_string()));
        }
        if self.indexer_leverage_limit == 0 {
            return Err(StrataError::InvalidConfig(
                "indexer_leverage_limit must be positive".to_string(),
            ));
        }
        for (name, rate) in [
            ("unbond_fee_rate_bp", self.unbond_fee_rate_bp),
            ("inflation_rate_bp", self.inflation_rate_bp),
        ] {
            if rate > BASIS_POINTS {
                return Err(StrataError::InvalidConfig(format!(
                    "{} must be at most {}, got {}",
                    name, BASIS_POINTS, rate
                )));
            }
        }
        Ok(())
    }

    pub fn staking_params(&self) -> StakingParams {
        StakingParams {
            lock_period: self.lock_period,
            indexer_leverage_limit: self.indexer_leverage_limit,
            unbond_fee_rate_bp: self.unbond_fee_rate_bp,
        }
    }
}

/// Amounts as decimal strings; plain integers are accepted on input.
pub mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use strata_core::Amount;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(Amount::from(v)),
            Repr::Str(s) => s.replace('_', "").parse().map_err(serde::de::Error::custom),
        }
    }
}
