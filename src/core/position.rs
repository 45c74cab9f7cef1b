//! Slide position shared between the deck navigation and the timers.
//!
//! The navigation side owns a `PositionPublisher`; anything that needs to know
//! how far through the deck we are holds a cheap `PositionHandle`.

use tokio::sync::watch;

/// Progress bar reading: current slide index (zero-based) against the last
/// slide index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlidePosition {
    pub value: usize,
    pub max: usize,
}

impl SlidePosition {
    pub fn new(value: usize, max: usize) -> Self {
        Self { value, max }
    }

    /// Position for slide `index` in a deck of `count` slides
    pub fn for_slide(index: usize, count: usize) -> Self {
        Self {
            value: index,
            max: count.saturating_sub(1),
        }
    }

    /// `floor(100 * value / max)`, 0 for an empty range, capped at 100
    pub fn slides_percent(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        let percent = (self.value as u128 * 100) / self.max as u128;
        percent.min(100) as u32
    }
}

#[derive(Debug)]
pub struct PositionPublisher {
    tx: watch::Sender<SlidePosition>,
}

/// Read side of the slide position
#[derive(Debug, Clone)]
pub struct PositionHandle {
    rx: watch::Receiver<SlidePosition>,
}

pub fn position_channel(initial: SlidePosition) -> (PositionPublisher, PositionHandle) {
    let (tx, rx) = watch::channel(initial);
    (PositionPublisher { tx }, PositionHandle { rx })
}

impl PositionPublisher {
    pub fn publish(&self, position: SlidePosition) {
        // send_replace never fails, even with every handle dropped
        self.tx.send_replace(position);
    }

    pub fn current(&self) -> SlidePosition {
        *self.tx.borrow()
    }
}

impl PositionHandle {
    pub fn current(&self) -> SlidePosition {
        *self.rx.borrow()
    }
}
