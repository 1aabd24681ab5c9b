// crates/strata-daemon/src/clock.rs
//
// Time source for the keeper. The ledger never reads a clock itself; the
// keeper passes `now` into every call, either wall-clock Unix seconds or a
// simulated time that advances a fixed step per tick.

use strata_core::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockSource {
    Wall,
    Simulated { now: Timestamp, step: u64 },
}

impl ClockSource {
    /// Wall clock when `seconds_per_tick` is 0, simulated otherwise.
    pub fn from_config(start_time: Timestamp, seconds_per_tick: u64) -> Self {
        if seconds_per_tick == 0 {
            ClockSource::Wall
        } else {
            ClockSource::Simulated {
                now: start_time,
                step: seconds_per_tick,
            }
        }
    }

    pub fn now(&self) -> Timestamp {
        match self {
            ClockSource::Wall => u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0),
            ClockSource::Simulated { now, .. } => *now,
        }
    }

    /// Move simulated time forward one step. No-op for the wall clock.
    pub fn advance(&mut self) {
        if let ClockSource::Simulated { now, step } = self {
            *now = now.saturating_add(*step);
        }
    }
}
