//! The shared state cell.
//!
//! Written only by the event processor; read by any number of callers. The
//! lock keeps readers from seeing a state without its matching sequence
//! number and history entry.

use crate::core::{State, StateHistory, StateTransition};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct CellData {
    state: State,
    seq: u64,
    history: StateHistory,
}

#[derive(Debug)]
pub(crate) struct StateCell {
    data: RwLock<CellData>,
}

impl StateCell {
    pub(crate) fn new(history_limit: usize) -> Self {
        Self {
            data: RwLock::new(CellData {
                state: State::Idle,
                seq: 0,
                history: StateHistory::new(history_limit),
            }),
        }
    }

    pub(crate) fn state(&self) -> State {
        self.read().state
    }

    pub(crate) fn seq(&self) -> u64 {
        self.read().seq
    }

    pub(crate) fn history(&self) -> StateHistory {
        self.read().history.clone()
    }

    /// Make `transition.to` the current state and record the transition.
    pub(crate) fn commit(&self, transition: StateTransition) {
        let mut data = self.write();
        data.state = transition.to;
        data.seq = transition.seq;
        data.history.record(transition);
    }

    // Every write leaves CellData consistent, so a poisoned lock still
    // guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, CellData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CellData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}
