//! Observer collaborators fed by the state monitor.

use super::StateChange;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

/// Sink for committed state changes.
///
/// Called from the monitor task, once per change it sees. Changes may be
/// coalesced when the observer is slower than the processor, but the last
/// change before shutdown is always delivered.
#[async_trait]
pub trait StateObserver: Send + 'static {
    async fn observe(&mut self, change: StateChange);
}

/// Logs every observed change at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[async_trait]
impl StateObserver for TracingObserver {
    async fn observe(&mut self, change: StateChange) {
        info!(
            seq = change.seq,
            from = %change.from,
            event = %change.event,
            "State changed to: {}",
            change.to
        );
    }
}

/// Discards every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

#[async_trait]
impl StateObserver for NoopObserver {
    async fn observe(&mut self, _change: StateChange) {}
}

/// Forwards changes into a channel; a dropped receiver is ignored.
#[async_trait]
impl StateObserver for mpsc::UnboundedSender<StateChange> {
    async fn observe(&mut self, change: StateChange) {
        let _ = self.send(change);
    }
}
