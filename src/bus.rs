use crate::events::NoteEvent;
use crossbeam::channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

/// Fans decoded notes out from the active device callback to every view
/// that subscribed. Events arrive in delivery order per subscriber.
#[derive(Clone, Default)]
pub struct NoteBus {
    subscribers: Arc<Mutex<Vec<Sender<NoteEvent>>>>,
}

impl NoteBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<NoteEvent> {
        let (tx, rx) = crossbeam::channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Dropped receivers are pruned here.
    pub fn publish(&self, event: NoteEvent) {
        self.subscribers.lock().retain(|tx| tx.send(event).is_ok());
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
