// crates/strata-economics/src/unbonding.rs
//
// Per-account unbonding queue.
//
// Requests are append-only and indexed by creation order. Settling marks a
// request as withdrawn but never removes it, so indices stay stable for
// hosts that reference them in events.

use serde::{Deserialize, Serialize};

use strata_core::{Account, Amount, Seconds, Timestamp};

/// Hard cap on requests settled by a single withdraw call.
pub const MAX_WITHDRAWALS_PER_CALL: usize = 10;

/// A request to release stake back to `source` after the lock period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingRequest {
    /// Account that will receive the funds.
    pub source: Account,
    /// Indexer the stake was unbonded from.
    pub indexer: Account,
    /// Amount before the unbond fee.
    pub amount: Amount,
    /// Time the request was made; funds unlock at `start_time + lock_period`.
    pub start_time: Timestamp,
    pub settled: bool,
}

impl UnbondingRequest {
    pub fn is_matured(&self, now: Timestamp, lock_period: Seconds) -> bool {
        now >= self.start_time.saturating_add(lock_period)
    }
}

/// Ordered unbonding requests of one account.
#[derive(Debug, Clone, Default)]
pub struct UnbondingQueue {
    requests: Vec<UnbondingRequest>,
    withdrawn: u64,
    /// Every request before this index is settled.
    first_unsettled: usize,
}

impl UnbondingQueue {
    /// Append a request and return its index.
    pub fn push(&mut self, request: UnbondingRequest) -> u64 {
        self.requests.push(request);
        (self.requests.len() - 1) as u64
    }

    /// Total number of requests ever made.
    pub fn len(&self) -> u64 {
        self.requests.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Number of settled requests.
    pub fn withdrawn_len(&self) -> u64 {
        self.withdrawn
    }

    pub fn get(&self, index: u64) -> Option<&UnbondingRequest> {
        usize::try_from(index).ok().and_then(|i| self.requests.get(i))
    }

    pub fn requests(&self) -> &[UnbondingRequest] {
        &self.requests
    }

    /// Sum of all requests not yet settled.
    pub fn pending_amount(&self) -> Amount {
        self.requests[self.first_unsettled..]
            .iter()
            .filter(|r| !r.settled)
            .map(|r| r.amount)
            .sum()
    }

    /// Indices of unsettled requests matured at `now`, oldest first, at most `limit`.
    pub fn matured(&self, now: Timestamp, lock_period: Seconds, limit: usize) -> Vec<u64> {
        self.requests
            .iter()
            .enumerate()
            .skip(self.first_unsettled)
            .filter(|(_, r)| !r.settled && r.is_matured(now, lock_period))
            .take(limit)
            .map(|(i, _)| i as u64)
            .collect()
    }

    /// Mark the given requests settled. Unknown or already-settled indices are ignored.
    pub fn mark_settled(&mut self, indices: &[u64]) {
        for &index in indices {
            if let Some(request) = usize::try_from(index)
                .ok()
                .and_then(|i| self.requests.get_mut(i))
            {
                if !request.settled {
                    request.settled = true;
                    self.withdrawn += 1;
                }
            }
        }
        while self
            .requests
            .get(self.first_unsettled)
            .is_some_and(|r| r.settled)
        {
            self.first_unsettled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: Seconds = 1000;

    fn request(start_time: Timestamp, amount: Amount) -> UnbondingRequest {
        UnbondingRequest {
            source: Account::from_label("delegator"),
            indexer: Account::from_label("indexer"),
            amount,
            start_time,
            settled: false,
        }
    }

    #[test]
    fn test_push_returns_sequential_indices() {
        let mut queue = UnbondingQueue::default();
        assert_eq!(queue.push(request(0, 1)), 0);
        assert_eq!(queue.push(request(0, 2)), 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.get(1).unwrap().amount, 2);
        assert!(queue.get(2).is_none());
    }

    #[test]
    fn test_matured_respects_lock_and_limit() {
        let mut queue = UnbondingQueue::default();
        for _ in 0..12 {
            queue.push(request(100, 500));
        }
        queue.push(request(900, 500));

        assert!(queue.matured(100 + LOCK - 1, LOCK, 10).is_empty());
        let ready = queue.matured(100 + LOCK, LOCK, MAX_WITHDRAWALS_PER_CALL);
        assert_eq!(ready, (0..10).collect::<Vec<u64>>());
    }

    #[test]
    fn test_mark_settled_advances_cursor() {
        let mut queue = UnbondingQueue::default();
        for _ in 0..3 {
            queue.push(request(0, 10));
        }
        queue.mark_settled(&[0, 1]);
        queue.mark_settled(&[1]);

        assert_eq!(queue.withdrawn_len(), 2);
        assert_eq!(queue.pending_amount(), 10);
        assert_eq!(queue.matured(LOCK, LOCK, 10), vec![2]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_settled_requests_are_kept() {
        let mut queue = UnbondingQueue::default();
        queue.push(request(0, 10));
        queue.mark_settled(&[0]);
        assert!(queue.get(0).unwrap().settled);
        assert_eq!(queue.requests().len(), 1);
    }
}
