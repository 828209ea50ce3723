//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard dispatch per input context
//! - `events` - Background and screen event processing
//! - `render` - Layout and top-level drawing
//! - `feed` - Post list widget
//! - `sidebar` - Navigation sidebar widget
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay
//! - `offline` - Offline overview overlay

mod events;
mod feed;
mod help;
mod input;
mod loop_runner;
mod offline;
mod render;
mod sidebar;
mod status;

pub use loop_runner::{run, Action};
