//! Collaborator seams used by the front page.
//!
//! Everything the screen talks to that it does not own is reached through one
//! of these traits. The binary wires them to real implementations; tests use
//! recording fakes.

use crate::config::{AppMode, Config};
use crate::paging::Page;
use crate::subreddits::{ShortcutItem, SubredditList};
use crate::theme::Theme;
use chrono::Timelike;

/// Subscribed subreddits and the pinned subset, read as snapshots.
pub trait SubscriptionStore {
    fn subscribed(&self) -> Vec<String>;
    fn pinned(&self) -> Vec<String>;
}

/// One subreddit feed shown by the pager.
pub trait FeedScreen: Page {
    fn subreddit(&self) -> &str;
    fn is_loaded(&self) -> bool;
    /// Start loading. `reset` discards anything already fetched.
    fn load(&mut self, reset: bool);
    /// Reload an already loaded feed.
    fn refresh(&mut self);
    fn retheme(&mut self, theme: &Theme);
    /// Bring back any UI hidden while the layout changed.
    fn show_ui(&mut self);
}

/// Builds feed screens for subreddits the pager has not cached.
pub trait FeedFactory {
    type Screen: FeedScreen;

    fn make(&mut self, subreddit: &str) -> Self::Screen;
}

/// Opens reddit paths ("/r/name", "/u/name") somewhere other than the pager.
pub trait LinkRouter {
    fn open(&mut self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Online,
    Offline,
}

pub trait ReachabilityProbe {
    fn status(&self) -> Reachability;
}

pub trait Presenter {
    /// Show the offline overview for the subreddits on the front page.
    fn present_offline(&mut self, subs: &SubredditList);
    /// Spoken or status-line announcement.
    fn announce(&mut self, text: &str);
}

pub trait ShortcutRegistry {
    /// Replace the registered shortcuts.
    fn register(&mut self, items: Vec<ShortcutItem>);
    /// Record that the user opened a subreddit.
    fn record_activity(&mut self, subreddit: &str);
}

/// Local wall-clock hour, 0-23.
pub trait Clock {
    fn hour(&self) -> u32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

/// All non-feed collaborators of one screen.
pub struct Collaborators {
    pub store: Box<dyn SubscriptionStore>,
    pub router: Box<dyn LinkRouter>,
    pub presenter: Box<dyn Presenter>,
    pub shortcuts: Box<dyn ShortcutRegistry>,
    pub clock: Box<dyn Clock>,
}

/// Display settings the screen reads on every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Tab bar shown and swiping between neighbors enabled.
    pub list_bar: bool,
    pub reduce_color: bool,
    pub fully_hide_header: bool,
    pub app_mode: AppMode,
    pub page_cache_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            list_bar: config.list_bar,
            reduce_color: config.reduce_color,
            fully_hide_header: config.fully_hide_header,
            app_mode: config.app_mode,
            page_cache_size: config.page_cache_size,
        }
    }
}
