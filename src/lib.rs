//! slide: a terminal Reddit front page.
//!
//! The screen core (`subreddits`, `paging`, `chrome`, `scheduler`, `session`,
//! `screen`) is terminal- and network-free and reaches everything else through
//! the traits in [`screen::ports`]. The remaining modules are the terminal
//! shell that wires those traits to real implementations.

pub mod app;
pub mod chrome;
pub mod config;
pub mod host;
pub mod keybindings;
pub mod paging;
pub mod reachability;
pub mod reddit;
pub mod scheduler;
pub mod screen;
pub mod session;
pub mod subreddits;
pub mod theme;
pub mod ui;
pub mod util;
