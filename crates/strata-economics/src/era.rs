// crates/strata-economics/src/era.rs
//
// Era lifecycle for the Strata ledger.
//
// An era is a fixed-length window (default one day) during which stake and
// reward rates are frozen for settlement. The clock only advances when some
// caller asks it to; there is no background timer. Every other component
// reads the era number from here and never looks at time directly.

use serde::{Deserialize, Serialize};

use strata_core::{Account, Authority, EraNumber, Role, Seconds, StrataError, Timestamp};

/// Default era length: one day.
pub const DEFAULT_ERA_PERIOD: Seconds = 60 * 60 * 24;

/// Owns the current era number, its start time, and the era length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EraClock {
    number: EraNumber,
    start_time: Timestamp,
    period: Seconds,
    owner: Authority,
}

impl EraClock {
    /// Genesis clock: era 0 starting at time 0.
    pub fn new(owner: Account, period: Seconds) -> Self {
        Self {
            number: 0,
            start_time: 0,
            period,
            owner: Authority::new(owner, Role::Owner),
        }
    }

    pub fn era_number(&self) -> EraNumber {
        self.number
    }

    pub fn era_start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn era_period(&self) -> Seconds {
        self.period
    }

    /// Earliest time at which the next era may start.
    pub fn era_end(&self) -> Timestamp {
        self.start_time.saturating_add(self.period)
    }

    /// Whether the current era has run its full period at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.era_end()
    }

    /// Start the next era.
    ///
    /// # Errors
    /// Returns `StrataError::EraStillActive` unless `now >= start_time + period`.
    pub fn start_new_era(&mut self, now: Timestamp) -> Result<EraNumber, StrataError> {
        if !self.is_expired(now) {
            return Err(StrataError::EraStillActive {
                era: self.number,
                ends_at: self.era_end(),
                now,
            });
        }
        self.number += 1;
        self.start_time = now;
        tracing::info!(era = self.number, start_time = now, "new era started");
        Ok(self.number)
    }

    /// Advance by one era if the current one has expired, then return the era.
    ///
    /// Never fails on timing; components call this before reading era state
    /// so a caller never observes an expired era.
    pub fn safe_update_and_get_era(&mut self, now: Timestamp) -> EraNumber {
        if self.is_expired(now) {
            self.number += 1;
            self.start_time = now;
            tracing::debug!(era = self.number, start_time = now, "era advanced lazily");
        }
        self.number
    }

    /// Change the era length. Takes effect for the current era's boundary check.
    ///
    /// # Errors
    /// Returns `StrataError::Unauthorized` unless `caller` is the owner, and
    /// `StrataError::InvalidAmount` for a zero period.
    pub fn update_era_period(&mut self, caller: &Account, period: Seconds) -> Result<(), StrataError> {
        self.owner.ensure(caller)?;
        if period == 0 {
            return Err(StrataError::InvalidAmount("era period must be positive".to_string()));
        }
        self.period = period;
        Ok(())
    }

    pub fn owner(&self) -> Account {
        self.owner.holder()
    }
}
