//! Latest-value notification channel between the processor and the monitor.
//!
//! The channel holds at most one unconsumed [`StateChange`]. Publishing never
//! blocks: a value the subscriber has not read yet is replaced by the newer
//! one, so observers always catch up to the most recent state but may skip
//! intermediate ones.
//!
//! The channel closes when the [`Publisher`] is dropped. A subscriber still
//! receives the last unseen value after that, then `None`.

mod observer;

pub use observer::{NoopObserver, StateObserver, TracingObserver};

use crate::core::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A committed state change as seen by observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// 1-based sequence number of the committed transition
    pub seq: u64,
    pub from: State,
    pub to: State,
    /// Event that caused the change
    pub event: String,
    /// Commit time
    pub at: DateTime<Utc>,
}

/// Create a connected publisher/subscriber pair.
pub fn channel() -> (Publisher, Subscriber) {
    let (tx, rx) = watch::channel(None);
    (Publisher { tx }, Subscriber { rx })
}

/// Writing half. Owned by the event processor.
#[derive(Debug)]
pub struct Publisher {
    tx: watch::Sender<Option<StateChange>>,
}

impl Publisher {
    /// Publish a change without waiting, replacing any unconsumed value.
    ///
    /// Succeeds even if the subscriber is gone.
    pub fn publish(&self, change: StateChange) {
        self.tx.send_replace(Some(change));
    }
}

/// Reading half. Owned by the state monitor.
#[derive(Debug)]
pub struct Subscriber {
    rx: watch::Receiver<Option<StateChange>>,
}

impl Subscriber {
    /// Wait for the newest unseen change.
    ///
    /// Returns `None` once the publisher is dropped and every published
    /// value has been seen.
    pub async fn next(&mut self) -> Option<StateChange> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(change) = self.rx.borrow_and_update().clone() {
                return Some(change);
            }
        }
    }
}
