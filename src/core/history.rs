//! State transition history tracking.
//!
//! The processor appends one record per committed transition. The log is
//! bounded: once `limit` records are held, the oldest is evicted, so a
//! long-running manager keeps a window of recent transitions rather than an
//! ever-growing list.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::{State, StateTransition};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let transition = StateTransition {
///     seq: 1,
///     from: State::Idle,
///     to: State::Processing,
///     event: "start".to_string(),
///     started_at: now,
///     committed_at: now,
///     work: None,
/// };
/// assert_eq!(transition.elapsed(), std::time::Duration::ZERO);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// 1-based position among all transitions committed by the manager
    pub seq: u64,
    /// The state being transitioned from
    pub from: State,
    /// The state being transitioned to
    pub to: State,
    /// Name of the event that caused the transition
    pub event: String,
    /// When the processor began handling the event
    pub started_at: DateTime<Utc>,
    /// When the new state became visible to readers
    pub committed_at: DateTime<Utc>,
    /// Simulated work performed before committing
    pub work: Option<Duration>,
}

impl StateTransition {
    /// Time from picking up the event to committing it.
    pub fn elapsed(&self) -> Duration {
        self.committed_at
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Bounded, ordered history of transitions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    limit: usize,
    transitions: VecDeque<StateTransition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new(StateHistory::DEFAULT_LIMIT)
    }
}

impl StateHistory {
    pub const DEFAULT_LIMIT: usize = 64;

    /// Create an empty history holding at most `limit` records.
    ///
    /// A limit of zero disables recording.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            transitions: VecDeque::with_capacity(limit.min(Self::DEFAULT_LIMIT)),
        }
    }

    /// Append a transition, evicting the oldest record when full.
    pub fn record(&mut self, transition: StateTransition) {
        if self.limit == 0 {
            return;
        }
        while self.transitions.len() >= self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the oldest retained record followed by
    /// the `to` state of every record.
    pub fn get_path(&self) -> Vec<State> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(first.from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Wall time covered by the retained records.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.committed_at
            .signed_duration_since(first.started_at)
            .to_std()
            .ok()
    }

    /// Get all retained transitions, oldest first.
    pub fn transitions(&self) -> Vec<StateTransition> {
        self.transitions.iter().cloned().collect()
    }

    /// Most recently committed transition.
    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
