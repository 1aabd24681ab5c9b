// crates/strata-daemon/src/config.rs
//
// Runtime configuration for the Strata era keeper.
// Loaded from a TOML file or populated with defaults.

use serde::Deserialize;
use std::fs;

use strata_core::Amount;
use strata_economics::config::amount_string;
use strata_economics::LedgerConfig;

/// An indexer registered and self-staked at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenesisIndexer {
    /// Account label; the account is derived from it.
    pub label: String,
    /// Self-stake in base units, funded from the owner's genesis balance.
    #[serde(with = "amount_string")]
    pub self_stake: Amount,
}

/// A delegation made at genesis; active from era 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenesisDelegation {
    pub delegator: String,
    pub indexer: String,
    #[serde(with = "amount_string")]
    pub amount: Amount,
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Genesis ledger parameters.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Wall time between keeper ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ledger seconds simulated per tick. 0 uses the wall clock.
    #[serde(default)]
    pub seconds_per_tick: u64,

    /// First timestamp of the simulated clock.
    #[serde(default)]
    pub start_time: u64,

    /// Stop after this many ticks. Unset runs until Ctrl-C.
    #[serde(default)]
    pub max_ticks: Option<u64>,

    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_registrar")]
    pub registrar: String,

    #[serde(default = "default_inflation_destination")]
    pub inflation_destination: String,

    /// Label of the account the keeper signs its calls with.
    #[serde(default = "default_keeper")]
    pub keeper: String,

    #[serde(default)]
    pub indexers: Vec<GenesisIndexer>,

    #[serde(default)]
    pub delegations: Vec<GenesisDelegation>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_registrar() -> String {
    "registrar".to_string()
}

fn default_inflation_destination() -> String {
    "treasury".to_string()
}

fn default_keeper() -> String {
    "keeper".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            log_level: default_log_level(),
            tick_interval_ms: default_tick_interval_ms(),
            seconds_per_tick: 0,
            start_time: 0,
            max_ticks: None,
            owner: default_owner(),
            registrar: default_registrar(),
            inflation_destination: default_inflation_destination(),
            keeper: default_keeper(),
            indexers: Vec::new(),
            delegations: Vec::new(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        config.ledger.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.seconds_per_tick, 0);
        assert_eq!(config.max_ticks, None);
        assert_eq!(config.ledger, LedgerConfig::default());
        assert!(config.indexers.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = DaemonConfig::parse(
            r#"
            log_level = "debug"
            tick_interval_ms = 50
            seconds_per_tick = 3600
            max_ticks = 48

            [ledger]
            era_period = 7200
            inflation_rate_bp = 0
            genesis_supply = "1_000_000_000_000"

            [[indexers]]
            label = "indexer-a"
            self_stake = "1000000000"

            [[delegations]]
            delegator = "alice"
            indexer = "indexer-a"
            amount = 1000
            "#,
        )
        .unwrap();
        assert_eq!(config.max_ticks, Some(48));
        assert_eq!(config.ledger.era_period, 7200);
        assert_eq!(config.ledger.lock_period, 1000);
        assert_eq!(config.ledger.genesis_supply, 1_000_000_000_000);
        assert_eq!(
            config.indexers,
            vec![GenesisIndexer {
                label: "indexer-a".to_string(),
                self_stake: 1_000_000_000,
            }]
        );
        assert_eq!(config.delegations[0].amount, 1000);
    }

    #[test]
    fn test_invalid_ledger_section_rejected() {
        assert!(DaemonConfig::parse("[ledger]\nera_period = 0\n").is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(DaemonConfig::load("/nonexistent/strata/config.toml").is_err());
    }
}
