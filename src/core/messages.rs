//! Presentation message bus
//!
//! Widgets that need to hear about presentation changes (fullscreen toggles,
//! slide changes) subscribe to a `MessageBus` handed to them at construction.
//! There is no process-wide instance.

use crate::core::position::SlidePosition;
use tokio::sync::broadcast::{self, error::TryRecvError};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    /// The presentation entered (true) or left (false) fullscreen
    FullscreenChanged(bool),
    SlideChanged(SlidePosition),
    Quit,
}

impl PresentationEvent {
    /// Topic name, used for logging
    pub fn topic(&self) -> &'static str {
        match self {
            Self::FullscreenChanged(_) => "slidecontroller:fullscreenchange",
            Self::SlideChanged(_) => "slidecontroller:slidechange",
            Self::Quit => "slidecontroller:quit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<PresentationEvent>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Broadcast to every current subscriber. Having none is fine.
    pub fn publish(&self, event: PresentationEvent) {
        let topic = event.topic();
        match self.tx.send(event) {
            Ok(receivers) => tracing::trace!(topic, receivers, "published"),
            Err(_) => tracing::trace!(topic, "published with no subscribers"),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of the bus; only sees events published after it was created
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<PresentationEvent>,
}

impl Subscription {
    /// Take every pending event without blocking
    pub fn drain(&mut self) -> Vec<PresentationEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged, oldest events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        events
    }
}
