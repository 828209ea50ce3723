//! Collaborators the terminal shell hands to the front page.
//!
//! Each one forwards to the app over the event channel with `try_send`, so a
//! screen callback never waits on the UI loop that is running it.

use crate::app::AppEvent;
use crate::screen::ports::{LinkRouter, Presenter, ShortcutRegistry, SubscriptionStore};
use crate::subreddits::{ShortcutItem, SubredditList};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::mpsc;

fn forward(events: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if let Err(e) = events.try_send(event) {
        tracing::warn!(error = %e, "Dropping app event");
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Default)]
struct Subscriptions {
    subscribed: Vec<String>,
    pinned: Vec<String>,
}

/// In-memory subscription store shared between the app (which edits it) and
/// the front page (which reads snapshots).
#[derive(Debug, Clone, Default)]
pub struct SharedSubscriptions {
    inner: Rc<RefCell<Subscriptions>>,
}

impl SharedSubscriptions {
    /// Pinned names missing from `subscribed` are subscribed too.
    pub fn new(subscribed: Vec<String>, pinned: Vec<String>) -> Self {
        let mut subs = Subscriptions { subscribed, pinned };
        for name in &subs.pinned {
            if !contains_ci(&subs.subscribed, name) {
                subs.subscribed.push(name.clone());
            }
        }
        Self {
            inner: Rc::new(RefCell::new(subs)),
        }
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        contains_ci(&self.inner.borrow().subscribed, name)
    }

    pub fn is_pinned(&self, name: &str) -> bool {
        contains_ci(&self.inner.borrow().pinned, name)
    }

    /// Returns false when already subscribed.
    pub fn subscribe(&self, name: &str) -> bool {
        let mut subs = self.inner.borrow_mut();
        if contains_ci(&subs.subscribed, name) {
            return false;
        }
        subs.subscribed.push(name.to_string());
        tracing::info!(subreddit = %name, "Subscribed");
        true
    }

    /// Unsubscribing also unpins. Returns false when not subscribed.
    pub fn unsubscribe(&self, name: &str) -> bool {
        let mut subs = self.inner.borrow_mut();
        let before = subs.subscribed.len();
        subs.subscribed.retain(|s| !s.eq_ignore_ascii_case(name));
        subs.pinned.retain(|s| !s.eq_ignore_ascii_case(name));
        let removed = subs.subscribed.len() != before;
        if removed {
            tracing::info!(subreddit = %name, "Unsubscribed");
        }
        removed
    }

    /// Pin a subscribed subreddit at the end of the pinned list, or unpin it.
    /// Returns whether it is pinned afterwards.
    pub fn toggle_pin(&self, name: &str) -> bool {
        let mut subs = self.inner.borrow_mut();
        if contains_ci(&subs.pinned, name) {
            subs.pinned.retain(|s| !s.eq_ignore_ascii_case(name));
            return false;
        }
        if !contains_ci(&subs.subscribed, name) {
            subs.subscribed.push(name.to_string());
        }
        subs.pinned.push(name.to_string());
        true
    }
}

impl SubscriptionStore for SharedSubscriptions {
    fn subscribed(&self) -> Vec<String> {
        self.inner.borrow().subscribed.clone()
    }

    fn pinned(&self) -> Vec<String> {
        self.inner.borrow().pinned.clone()
    }
}

fn contains_ci(list: &[String], name: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(name))
}

// ============================================================================
// Channel-backed ports
// ============================================================================

/// Sends routed paths back to the app, which opens `/r/` paths in a detached
/// feed and everything else in the browser.
pub struct ChannelRouter {
    events: mpsc::Sender<AppEvent>,
}

impl ChannelRouter {
    pub fn new(events: mpsc::Sender<AppEvent>) -> Self {
        Self { events }
    }
}

impl LinkRouter for ChannelRouter {
    fn open(&mut self, path: &str) {
        forward(&self.events, AppEvent::OpenLink(path.to_string()));
    }
}

pub struct ChannelPresenter {
    events: mpsc::Sender<AppEvent>,
}

impl ChannelPresenter {
    pub fn new(events: mpsc::Sender<AppEvent>) -> Self {
        Self { events }
    }
}

impl Presenter for ChannelPresenter {
    fn present_offline(&mut self, subs: &SubredditList) {
        forward(&self.events, AppEvent::OfflineOverview(subs.as_slice().to_vec()));
    }

    fn announce(&mut self, text: &str) {
        forward(&self.events, AppEvent::Announce(text.to_string()));
    }
}

/// Forwards registered shortcuts and visited subreddits.
pub struct ChannelShortcuts {
    events: mpsc::Sender<AppEvent>,
}

impl ChannelShortcuts {
    pub fn new(events: mpsc::Sender<AppEvent>) -> Self {
        Self { events }
    }
}

impl ShortcutRegistry for ChannelShortcuts {
    fn register(&mut self, items: Vec<ShortcutItem>) {
        forward(&self.events, AppEvent::Shortcuts(items));
    }

    fn record_activity(&mut self, subreddit: &str) {
        forward(&self.events, AppEvent::Visited(subreddit.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pinned_are_subscribed() {
        let subs = SharedSubscriptions::new(names(&["aww"]), names(&["pics"]));
        assert_eq!(subs.subscribed(), names(&["aww", "pics"]));
        assert!(subs.is_pinned("PICS"));
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let subs = SharedSubscriptions::new(names(&["aww"]), Vec::new());
        assert!(subs.subscribe("rust"));
        assert!(!subs.subscribe("Rust"));
        assert!(subs.is_subscribed("rust"));

        subs.toggle_pin("rust");
        assert!(subs.unsubscribe("RUST"));
        assert!(!subs.is_pinned("rust"));
        assert!(!subs.unsubscribe("rust"));
    }

    #[test]
    fn test_toggle_pin_appends_and_removes() {
        let subs = SharedSubscriptions::new(names(&["a", "b"]), names(&["b"]));
        assert!(subs.toggle_pin("a"));
        assert_eq!(subs.pinned(), names(&["b", "a"]));
        assert!(!subs.toggle_pin("b"));
        assert_eq!(subs.pinned(), names(&["a"]));
    }

    #[test]
    fn test_clones_share_state() {
        let subs = SharedSubscriptions::new(Vec::new(), Vec::new());
        let other = subs.clone();
        other.subscribe("pics");
        assert!(subs.is_subscribed("pics"));
    }

    #[tokio::test]
    async fn test_channel_ports_forward_events() {
        let (tx, mut rx) = mpsc::channel(8);
        ChannelRouter::new(tx.clone()).open("/r/rust");
        ChannelPresenter::new(tx.clone()).announce("Viewing rust");
        ChannelShortcuts::new(tx).record_activity("rust");

        assert!(matches!(rx.recv().await, Some(AppEvent::OpenLink(p)) if p == "/r/rust"));
        assert!(matches!(rx.recv().await, Some(AppEvent::Announce(t)) if t == "Viewing rust"));
        assert!(matches!(rx.recv().await, Some(AppEvent::Visited(s)) if s == "rust"));
    }

    #[test]
    fn test_full_channel_drops_without_panicking() {
        let (tx, _rx) = mpsc::channel(1);
        let mut router = ChannelRouter::new(tx);
        router.open("/r/a");
        router.open("/r/b");
    }
}
