//! The managed state value.
//!
//! The machine has exactly three states and cycles through them in a fixed
//! order. `State` is `Copy` so snapshots can be handed out freely without
//! borrowing from the cell that owns the live value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current position of the state machine.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::State;
///
/// let state = State::default();
/// assert_eq!(state, State::Idle);
/// assert_eq!(state.name(), "Idle");
/// assert_eq!(state.to_string(), "Idle");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum State {
    /// Waiting for work. Initial state of every manager.
    #[default]
    Idle,
    /// Work has been started but not completed.
    Processing,
    /// Work finished; a reset returns the machine to `Idle`.
    Completed,
}

impl State {
    /// All states in cycle order.
    pub const ALL: [State; 3] = [State::Idle, State::Processing, State::Completed];

    /// Get the state's name for display/logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
