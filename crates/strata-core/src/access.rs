// crates/strata-core/src/access.rs
//
// Capability-gated privileged operations.
//
// Each component holds its own `Authority`: one designated account that may
// call that component's privileged setters. There is no role hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::Account;
use crate::error::StrataError;

/// The class of privileged operations an `Authority` unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Configuration setters of a component.
    Owner,
    /// Indexer registry: self-stake, unstake, unregister.
    Registrar,
    /// Token issuance.
    Minter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Registrar => write!(f, "registrar"),
            Role::Minter => write!(f, "minter"),
        }
    }
}

/// A single designated account allowed to perform a class of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    holder: Account,
    role: Role,
}

impl Authority {
    pub fn new(holder: Account, role: Role) -> Self {
        Self { holder, role }
    }

    pub fn holder(&self) -> Account {
        self.holder
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Fail with `Unauthorized` unless `caller` holds this capability.
    pub fn ensure(&self, caller: &Account) -> Result<(), StrataError> {
        if *caller != self.holder {
            return Err(StrataError::Unauthorized(format!(
                "caller {} is not the {}",
                caller, self.role
            )));
        }
        Ok(())
    }

    /// Hand the capability to another account. Only the current holder may do this.
    pub fn transfer(&mut self, caller: &Account, new_holder: Account) -> Result<(), StrataError> {
        self.ensure(caller)?;
        self.holder = new_holder;
        Ok(())
    }
}
