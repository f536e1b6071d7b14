//! The fixed transition table.
//!
//! ```text
//! Idle       --start-->    Processing
//! Processing --complete--> Completed   (simulated work first)
//! Completed  --reset-->    Idle
//! ```
//!
//! Any other (state, event) pair is rejected with
//! [`FsmError::InvalidTransition`] and leaves the state unchanged.

use super::state::State;
use crate::error::FsmError;
use crate::work::WorkSimulator;
use std::sync::Arc;
use std::time::Duration;

/// Event that moves `Idle` to `Processing`.
pub const START: &str = "start";
/// Event that moves `Processing` to `Completed`.
pub const COMPLETE: &str = "complete";
/// Event that moves `Completed` back to `Idle`.
pub const RESET: &str = "reset";

/// Outcome of a valid transition lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// State to commit once any work is done.
    pub next: State,
    /// Work to perform before committing, if any.
    pub work: Option<Duration>,
}

/// Maps `(current state, event name)` to the next step.
#[derive(Clone)]
pub struct TransitionTable {
    work: Arc<dyn WorkSimulator>,
}

impl TransitionTable {
    pub fn new(work: Arc<dyn WorkSimulator>) -> Self {
        Self { work }
    }

    /// Look up the transition for `event` from `current`.
    ///
    /// Only `Processing --complete-->` carries work; its duration is drawn
    /// from the simulator on every call.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statekeeper::core::{State, TransitionTable};
    /// use statekeeper::work::NoWork;
    /// use std::sync::Arc;
    ///
    /// let table = TransitionTable::new(Arc::new(NoWork));
    ///
    /// let step = table.apply(State::Idle, "start").unwrap();
    /// assert_eq!(step.next, State::Processing);
    /// assert!(step.work.is_none());
    ///
    /// assert!(table.apply(State::Idle, "reset").is_err());
    /// ```
    pub fn apply(&self, current: State, event: &str) -> Result<Step, FsmError> {
        match (current, event) {
            (State::Idle, START) => Ok(Step {
                next: State::Processing,
                work: None,
            }),
            (State::Processing, COMPLETE) => Ok(Step {
                next: State::Completed,
                work: Some(self.work.duration()),
            }),
            (State::Completed, RESET) => Ok(Step {
                next: State::Idle,
                work: None,
            }),
            _ => Err(FsmError::InvalidTransition {
                state: current,
                event: event.to_string(),
            }),
        }
    }

    /// The one event name accepted from `state`.
    pub fn accepted_event(state: State) -> &'static str {
        match state {
            State::Idle => START,
            State::Processing => COMPLETE,
            State::Completed => RESET,
        }
    }
}

impl std::fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionTable").finish_non_exhaustive()
    }
}
