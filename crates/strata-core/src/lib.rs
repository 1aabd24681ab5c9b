// crates/strata-core/src/lib.rs
//
// strata-core: Core types, errors, and primitives for the Strata era ledger.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines accounts, amount/era/time aliases, the deferred-effect value
// type, capability-gated authorities, ledger events, and the protocol error.

pub mod access;
pub mod account;
pub mod deferred;
pub mod error;
pub mod events;
pub mod types;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use strata_core::Account;`

pub use access::{Authority, Role};
pub use account::Account;
pub use deferred::DeferredValue;
pub use error::{ErrorKind, StrataError};
pub use events::LedgerEvent;
pub use types::{bp_of, ensure_rate_bp, Amount, EraNumber, Seconds, Timestamp, BASIS_POINTS};
