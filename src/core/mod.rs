//! Core state machine types and logic.
//!
//! This module contains the synchronous core of the state machine:
//! - The `State` value
//! - The fixed transition table
//! - Bounded history tracking
//!
//! Nothing here spawns tasks or waits; the `manager` module wraps these
//! types in the single-writer runtime.

mod history;
mod state;
mod table;

pub use history::{StateHistory, StateTransition};
pub use state::State;
pub use table::{Step, TransitionTable, COMPLETE, RESET, START};
