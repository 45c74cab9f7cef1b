//! Frame scheduling and time sources
//!
//! Widgets never sleep or spawn; they ask a `Scheduler` to run a callback on
//! the next frame and read time through a `Clock`. The app loop drives the
//! real `FrameScheduler` once per frame; tests drive it by hand together with
//! a `ManualClock`.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Work to run on the next frame. Receives the target and the scheduler so it
/// can reschedule itself.
pub type FrameCallback<T> = Box<dyn FnOnce(&mut T, &mut dyn Scheduler<T>)>;

pub trait Scheduler<T> {
    /// Queue `callback` for the next frame
    fn schedule_next_tick(&mut self, callback: FrameCallback<T>);
}

/// Queue of pending frame callbacks
pub struct FrameScheduler<T> {
    pending: VecDeque<FrameCallback<T>>,
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Run everything that was queued before this frame started.
    ///
    /// Callbacks queued while the frame runs wait for the next one.
    /// Returns the number of callbacks executed.
    pub fn run_frame(&mut self, target: &mut T) -> usize {
        let due = std::mem::take(&mut self.pending);
        let count = due.len();
        for callback in due {
            callback(target, self);
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> for FrameScheduler<T> {
    fn schedule_next_tick(&mut self, callback: FrameCallback<T>) {
        self.pending.push_back(callback);
    }
}

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
