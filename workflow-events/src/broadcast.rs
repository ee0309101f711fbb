//! Fan-out sink backing `workflow-api`'s websocket stream, the same shape
//! as `atomic-api`'s `ServerState` connection registry but using a broadcast
//! channel instead of per-connection mpsc senders, since every subscriber
//! wants every event.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::event::EventEnvelope;
use crate::sink::EventSink;

pub struct BroadcastEventSink {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, event: EventEnvelope) {
        // No receivers is the common case between websocket clients; the
        // send error just means nobody is listening right now.
        let _ = self.sender.send(event);
    }
}
