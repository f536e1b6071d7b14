//! The event processor: sole writer of the managed state.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cell::StateCell;
use super::event::Event;
use crate::core::{State, StateTransition, TransitionTable};
use crate::error::FsmError;
use crate::notify::{Publisher, StateChange};

/// Applies queued events one at a time, in arrival order.
///
/// Holds its own copy of the current state and sequence number; as the only
/// writer it never needs to read them back from the cell.
pub(crate) struct EventProcessor {
    table: TransitionTable,
    cell: Arc<StateCell>,
    publisher: Publisher,
    events: mpsc::Receiver<Event>,
    shutdown: CancellationToken,
    current: State,
    seq: u64,
}

impl EventProcessor {
    pub(crate) fn new(
        table: TransitionTable,
        cell: Arc<StateCell>,
        publisher: Publisher,
        events: mpsc::Receiver<Event>,
        shutdown: CancellationToken,
    ) -> Self {
        let current = cell.state();
        let seq = cell.seq();
        Self {
            table,
            cell,
            publisher,
            events,
            shutdown,
            current,
            seq,
        }
    }

    /// Process events until shutdown or until every sender is gone.
    ///
    /// Consumes the processor; dropping its publisher on return closes the
    /// notification channel.
    pub(crate) async fn run(mut self) {
        debug!("EventProcessor::run: started");

        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!("EventProcessor::run: shutdown signal received");
                    break;
                }
                event = self.events.recv() => match event {
                    Some(event) => event,
                    None => {
                        debug!("EventProcessor::run: queue closed");
                        break;
                    }
                },
            };
            self.handle(event).await;
        }

        self.reject_pending();
        info!(transitions = self.seq, state = %self.current, "EventProcessor stopped");
    }

    async fn handle(&mut self, event: Event) {
        let started = Instant::now();
        let started_at = Utc::now();
        debug!(event_id = %event.id, event = %event.name, state = %self.current, "handle: called");

        let step = match self.table.apply(self.current, &event.name) {
            Ok(step) => step,
            Err(err) => {
                debug!(event_id = %event.id, error = %err, "handle: rejected");
                if !event.respond(Err(err)) {
                    debug!("handle: submitter gone before rejection was delivered");
                }
                return;
            }
        };

        if let Some(work) = step.work.filter(|work| !work.is_zero()) {
            debug!(event_id = %event.id, ?work, "handle: simulating work");
            tokio::time::sleep(work).await;
        }

        let from = self.current;
        self.current = step.next;
        self.seq += 1;
        let committed_at = Utc::now();

        self.cell.commit(StateTransition {
            seq: self.seq,
            from,
            to: step.next,
            event: event.name.clone(),
            started_at,
            committed_at,
            work: step.work,
        });
        self.publisher.publish(StateChange {
            seq: self.seq,
            from,
            to: step.next,
            event: event.name.clone(),
            at: committed_at,
        });

        info!(
            event_id = %event.id,
            seq = self.seq,
            from = %from,
            to = %step.next,
            "Transition '{}' took: {:?}",
            event.name,
            started.elapsed()
        );

        if !event.respond(Ok(())) {
            debug!(seq = self.seq, "handle: submitter gone before reply was delivered");
        }
    }

    /// Answer everything still queued so no accepted event goes unanswered.
    fn reject_pending(&mut self) {
        self.events.close();

        let mut rejected = 0usize;
        while let Ok(event) = self.events.try_recv() {
            event.respond(Err(FsmError::ShuttingDown));
            rejected += 1;
        }
        if rejected > 0 {
            debug!(rejected, "reject_pending: answered queued events with ShuttingDown");
        }
    }
}
