//! Core presentation logic
//!
//! Evaluator, meter, timer, scheduling and the presentation state.
//! NO imports of rendering code; frontends read from here and render.

pub mod app_core;
pub mod messages;
pub mod meter;
pub mod position;
pub mod progress;
pub mod scheduler;
pub mod timer;

pub use app_core::AppCore;
