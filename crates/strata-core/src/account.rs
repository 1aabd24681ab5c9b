// crates/strata-core/src/account.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A ledger participant: indexer, delegator, module escrow, or authority.
///
/// Accounts are opaque 32-byte identifiers. The ledger never verifies
/// signatures; the host authenticates callers and passes the resulting
/// account in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account(pub [u8; 32]);

impl Account {
    /// The all-zero account. Never a valid caller.
    pub const ZERO: Account = Account([0u8; 32]);

    /// Derive a deterministic account from a human-readable label.
    ///
    /// Used for module accounts (staking escrow, reward pool) and for
    /// configuration files that name participants instead of listing raw keys.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Account(bytes)
    }

    /// Parse a 64-character hex string (optional `0x` prefix).
    pub fn from_hex(s: &str) -> Option<Self> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(raw).ok()?;
        let bytes: [u8; 32] = decoded.try_into().ok()?;
        Some(Account(bytes))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
