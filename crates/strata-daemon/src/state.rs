// crates/strata-daemon/src/state.rs
//
// Lifecycle state machine for the era keeper.
//
// Valid transitions:
//   Initializing -> Bootstrapping -> Running
//   Any state -> ShuttingDown

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeeperState {
    /// Loading configuration.
    Initializing,
    /// Building the genesis ledger.
    Bootstrapping,
    /// Ticking.
    Running,
    ShuttingDown,
}

impl fmt::Display for KeeperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeeperState::Initializing => write!(f, "Initializing"),
            KeeperState::Bootstrapping => write!(f, "Bootstrapping"),
            KeeperState::Running => write!(f, "Running"),
            KeeperState::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

pub struct KeeperStateMachine {
    pub current: KeeperState,
}

impl KeeperStateMachine {
    pub fn new() -> Self {
        Self {
            current: KeeperState::Initializing,
        }
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns an error if the transition is not valid.
    pub fn transition(&mut self, new_state: KeeperState) -> Result<(), String> {
        let valid = matches!(
            (&self.current, &new_state),
            (_, KeeperState::ShuttingDown)
                | (KeeperState::Initializing, KeeperState::Bootstrapping)
                | (KeeperState::Bootstrapping, KeeperState::Running)
        );
        if !valid {
            return Err(format!(
                "Invalid state transition: {} -> {}",
                self.current, new_state
            ));
        }
        tracing::info!("State transition: {} -> {}", self.current, new_state);
        self.current = new_state;
        Ok(())
    }
}

impl Default for KeeperStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
