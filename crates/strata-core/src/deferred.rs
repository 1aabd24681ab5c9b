// crates/strata-core/src/deferred.rs
//
// Deferred-effect values: a write in era E becomes the active value from era
// E+1 onwards.
//
// The record keeps the active value (`value_at`), the pending value
// (`value_after`), and the era in which it was last rolled. Rolling is lazy:
// the first read or write in a later era promotes `value_after` into
// `value_at`. Every accessor takes the current era and rolls before looking,
// so no caller can read a stale `value_at` after writing `value_after` in the
// same call.

use serde::{Deserialize, Serialize};

use crate::types::EraNumber;

/// A quantity whose writes take effect starting with the next era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeferredValue<T> {
    value_at: T,
    value_after: T,
    era_last_applied: EraNumber,
}

impl<T: Copy> DeferredValue<T> {
    /// Create a record whose active and pending values are both `value`.
    pub fn new(value: T, era: EraNumber) -> Self {
        Self {
            value_at: value,
            value_after: value,
            era_last_applied: era,
        }
    }

    /// The record as it looks from `era`, without mutating storage.
    pub fn view(&self, era: EraNumber) -> Self {
        let mut rolled = *self;
        rolled.roll(era);
        rolled
    }

    /// Promote the pending value if `era` is later than the last roll.
    pub fn roll(&mut self, era: EraNumber) {
        if era > self.era_last_applied {
            self.value_at = self.value_after;
            self.era_last_applied = era;
        }
    }

    /// Active value as of `era`.
    pub fn value_at(&self, era: EraNumber) -> T {
        self.view(era).value_at
    }

    /// Pending value; becomes active at the next era boundary.
    pub fn value_after(&self) -> T {
        self.value_after
    }

    pub fn era_last_applied(&self) -> EraNumber {
        self.era_last_applied
    }

    /// Write a new pending value computed from the current one.
    ///
    /// The record is left untouched if `f` fails.
    pub fn update_after<E>(
        &mut self,
        era: EraNumber,
        f: impl FnOnce(T) -> Result<T, E>,
    ) -> Result<(), E> {
        let mut next = self.view(era);
        next.value_after = f(next.value_after)?;
        *self = next;
        Ok(())
    }

    /// Apply `f` to both the active and the pending value, effective immediately.
    ///
    /// The record is left untouched if `f` fails on either value.
    pub fn update_now<E>(
        &mut self,
        era: EraNumber,
        f: impl Fn(T) -> Result<T, E>,
    ) -> Result<(), E> {
        let mut next = self.view(era);
        next.value_at = f(next.value_at)?;
        next.value_after = f(next.value_after)?;
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(delta: u128) -> impl Fn(u128) -> Result<u128, ()> {
        move |v| v.checked_add(delta).ok_or(())
    }

    #[test]
    fn test_deferred_write_visible_next_era() {
        let mut v = DeferredValue::<u128>::default();
        v.update_after(3, add(1000)).unwrap();

        assert_eq!(v.value_at(3), 0);
        assert_eq!(v.value_after(), 1000);
        assert_eq!(v.value_at(4), 1000);
    }

    #[test]
    fn test_roll_happens_before_write_in_same_call() {
        let mut v = DeferredValue::<u128>::default();
        v.update_after(1, add(500)).unwrap();
        // First touch in era 2 must promote 500 before adding the new delta.
        v.update_after(2, add(200)).unwrap();

        assert_eq!(v.value_at(2), 500);
        assert_eq!(v.value_after(), 700);
        assert_eq!(v.era_last_applied(), 2);
    }

    #[test]
    fn test_update_now_is_immediate() {
        let mut v = DeferredValue::<u128>::default();
        v.update_now(1, add(1_000_000_000)).unwrap();

        assert_eq!(v.value_at(1), 1_000_000_000);
        assert_eq!(v.value_after(), 1_000_000_000);
    }

    #[test]
    fn test_update_now_keeps_pending_delta() {
        let mut v = DeferredValue::<u128>::default();
        v.update_after(1, add(10)).unwrap();
        v.update_now(1, add(5)).unwrap();

        assert_eq!(v.value_at(1), 5);
        assert_eq!(v.value_after(), 15);
    }

    #[test]
    fn test_failed_update_leaves_record_unchanged() {
        let mut v = DeferredValue::<u128>::new(7, 1);
        v.update_after(1, add(3)).unwrap();
        let before = v;

        let result = v.update_after(5, |_| Err::<u128, ()>(()));
        assert!(result.is_err());
        assert_eq!(v, before);
    }

    #[test]
    fn test_view_does_not_mutate() {
        let mut v = DeferredValue::<u128>::default();
        v.update_after(1, add(9)).unwrap();
        let snapshot = v.view(8);

        assert_eq!(snapshot.value_at(8), 9);
        assert_eq!(v.era_last_applied(), 1);
    }
}
