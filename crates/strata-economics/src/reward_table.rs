// crates/strata-economics/src/reward_table.rs
//
// Era-indexed reward delta tables (a difference array).
//
// A reward stream of `r` per era over eras [a, b) is stored as two entries,
// `add[a] += r` and `remove[b] += r`, so the effective rate for era E is the
// prefix sum of `add - remove` up to and including E. Entries are never
// pruned: windowed reads stay valid after the eras have been settled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use strata_core::{Amount, EraNumber, StrataError};

/// A constant reward of `rate` per era over `[from, until)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardStream {
    pub from: EraNumber,
    pub until: EraNumber,
    pub rate: Amount,
}

impl RewardStream {
    pub fn is_empty(&self) -> bool {
        self.rate == 0 || self.until <= self.from
    }

    /// Total paid out over the stream's lifetime.
    pub fn total(&self) -> Option<Amount> {
        if self.is_empty() {
            return Some(0);
        }
        self.rate.checked_mul(Amount::from(self.until - self.from))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraRewardTable {
    add: BTreeMap<EraNumber, Amount>,
    remove: BTreeMap<EraNumber, Amount>,
}

impl EraRewardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stream of `rate` per era covering `[from, until)`.
    pub fn add_stream(&mut self, from: EraNumber, until: EraNumber, rate: Amount) -> Result<(), StrataError> {
        self.add_streams(&[RewardStream { from, until, rate }])
    }

    /// Record several streams at once. Nothing is written if any cell would overflow.
    pub fn add_streams(&mut self, streams: &[RewardStream]) -> Result<(), StrataError> {
        let mut add_cells = BTreeMap::new();
        let mut remove_cells = BTreeMap::new();
        for stream in streams.iter().filter(|s| !s.is_empty()) {
            bump(&mut add_cells, &self.add, stream.from, stream.rate, "reward add table")?;
            bump(&mut remove_cells, &self.remove, stream.until, stream.rate, "reward remove table")?;
        }
        self.add.extend(add_cells);
        self.remove.extend(remove_cells);
        Ok(())
    }

    pub fn add_at(&self, era: EraNumber) -> Amount {
        self.add.get(&era).copied().unwrap_or(0)
    }

    pub fn remove_at(&self, era: EraNumber) -> Amount {
        self.remove.get(&era).copied().unwrap_or(0)
    }

    /// `count` add deltas starting at `from`, zero-filled.
    pub fn add_window(&self, from: EraNumber, count: usize) -> Vec<Amount> {
        window(&self.add, from, count)
    }

    /// `count` remove deltas starting at `from`, zero-filled.
    pub fn remove_window(&self, from: EraNumber, count: usize) -> Vec<Amount> {
        window(&self.remove, from, count)
    }

    /// Effective reward rate of `era`: prefix sum of add minus remove.
    pub fn rate_at(&self, era: EraNumber) -> Amount {
        let added: Amount = self.add.range(..=era).map(|(_, v)| *v).sum();
        let removed: Amount = self.remove.range(..=era).map(|(_, v)| *v).sum();
        added.saturating_sub(removed)
    }
}

fn bump(
    cells: &mut BTreeMap<EraNumber, Amount>,
    table: &BTreeMap<EraNumber, Amount>,
    era: EraNumber,
    rate: Amount,
    what: &'static str,
) -> Result<(), StrataError> {
    let current = cells.get(&era).or_else(|| table.get(&era)).copied().unwrap_or(0);
    let next = current.checked_add(rate).ok_or(StrataError::Overflow(what))?;
    cells.insert(era, next);
    Ok(())
}

fn window(table: &BTreeMap<EraNumber, Amount>, from: EraNumber, count: usize) -> Vec<Amount> {
    (0..count as u64)
        .map(|offset| table.get(&(from + offset)).copied().unwrap_or(0))
        .collect()
}
