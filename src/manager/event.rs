//! Events submitted to the processor.

use crate::error::FsmError;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Result delivered on an event's reply slot
pub type EventResponse = Result<(), FsmError>;

/// A named request plus the single-use slot its result is delivered on.
#[derive(Debug)]
pub(crate) struct Event {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    reply: oneshot::Sender<EventResponse>,
}

impl Event {
    /// Create an event and the receiver its submitter waits on.
    pub(crate) fn new(name: String) -> (Self, oneshot::Receiver<EventResponse>) {
        let (reply, rx) = oneshot::channel();
        let event = Self {
            id: Uuid::new_v4(),
            name,
            reply,
        };
        (event, rx)
    }

    /// Deliver the result. Consumes the event so it can only answer once.
    ///
    /// Returns `false` if the submitter stopped waiting.
    pub(crate) fn respond(self, response: EventResponse) -> bool {
        self.reply.send(response).is_ok()
    }
}
