// crates/strata-economics/src/indexer_set.rs
//
// Active indexer set with O(1) membership and O(1) swap-removal.
//
// `slots` is the dense enumeration order; `positions` maps an account back to
// its slot. Both are updated together on every insert and remove.

use std::collections::HashMap;

use strata_core::Account;

/// Dense, gap-free set of active indexers.
#[derive(Debug, Clone, Default)]
pub struct IndexerSet {
    slots: Vec<Account>,
    positions: HashMap<Account, usize>,
}

impl IndexerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `indexer`. Returns `false` if it was already present.
    pub fn insert(&mut self, indexer: Account) -> bool {
        if self.positions.contains_key(&indexer) {
            return false;
        }
        self.positions.insert(indexer, self.slots.len());
        self.slots.push(indexer);
        true
    }

    /// Remove `indexer`, moving the last element into its slot.
    ///
    /// Returns `false` if it was not present.
    pub fn remove(&mut self, indexer: &Account) -> bool {
        let Some(slot) = self.positions.remove(indexer) else {
            return false;
        };
        self.slots.swap_remove(slot);
        if let Some(moved) = self.slots.get(slot) {
            self.positions.insert(*moved, slot);
        }
        true
    }

    pub fn contains(&self, indexer: &Account) -> bool {
        self.positions.contains_key(indexer)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Indexer at enumeration slot `index`.
    pub fn get(&self, index: usize) -> Option<Account> {
        self.slots.get(index).copied()
    }

    /// Slot of `indexer`, if active.
    pub fn position(&self, indexer: &Account) -> Option<usize> {
        self.positions.get(indexer).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.slots.iter()
    }
}
