//! Frontend abstraction layer
//!
//! The `Frontend` trait separates drawing and input polling from the
//! presentation core. The only implementation today is the ratatui TUI.

pub mod events;
pub mod tui;

use crate::core::AppCore;
use anyhow::Result;
pub use events::FrontendEvent;
pub use tui::TuiFrontend;

pub trait Frontend {
    /// Return all pending input events (empty if none)
    fn poll_events(&mut self) -> Result<Vec<FrontendEvent>>;

    /// Draw one frame from the current core state
    fn render(&mut self, app: &AppCore) -> Result<()>;

    /// Restore the terminal before exit
    fn cleanup(&mut self) -> Result<()>;
}
