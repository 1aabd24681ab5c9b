// crates/strata-daemon/src/shared.rs
//
// DaemonSharedState: the ledger shared between the keeper and any other
// daemon task. The ledger is a serialized state machine, so every
// transaction takes the write lock for its whole duration.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use strata_economics::Ledger;

#[derive(Clone)]
pub struct DaemonSharedState {
    pub ledger: Arc<RwLock<Ledger>>,
    /// Daemon start time for uptime reporting.
    pub start_time: Instant,
}

impl DaemonSharedState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            start_time: Instant::now(),
        }
    }
}
