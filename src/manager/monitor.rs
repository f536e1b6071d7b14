//! The state monitor: forwards notifications to the observer on its own task.

use tracing::debug;

use crate::notify::{StateObserver, Subscriber};

pub(crate) struct StateMonitor {
    subscriber: Subscriber,
    observer: Box<dyn StateObserver>,
}

impl StateMonitor {
    pub(crate) fn new(subscriber: Subscriber, observer: Box<dyn StateObserver>) -> Self {
        Self {
            subscriber,
            observer,
        }
    }

    /// Deliver changes until the channel closes.
    ///
    /// The channel closes when the processor exits, so the last change it
    /// published is still delivered before this returns.
    pub(crate) async fn run(mut self) {
        debug!("StateMonitor::run: started");

        let mut delivered = 0u64;
        let mut last_seq = 0u64;
        while let Some(change) = self.subscriber.next().await {
            if change.seq > last_seq + 1 {
                debug!(
                    skipped = change.seq - last_seq - 1,
                    seq = change.seq,
                    "StateMonitor: coalesced intermediate changes"
                );
            }
            last_seq = change.seq;
            self.observer.observe(change).await;
            delivered += 1;
        }

        debug!(delivered, last_seq, "StateMonitor::run: channel closed, exiting");
    }
}
