//! Application event handling.
//!
//! Applies background results and screen port notifications to the app.

use crate::app::{App, AppEvent};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::FeedLoaded(loaded) => app.apply_feed_loaded(loaded),
        AppEvent::OpenLink(path) => app.open_link(&path),
        AppEvent::OfflineOverview(subs) => {
            tracing::info!(subreddits = subs.len(), "Showing offline overview");
            app.offline_overview = Some(subs);
        }
        AppEvent::Announce(text) => app.set_status(text),
        AppEvent::Shortcuts(items) => {
            tracing::debug!(count = items.len(), "Shortcuts registered");
            app.shortcuts = items;
        }
        AppEvent::Visited(subreddit) => app.record_visit(subreddit),
    }
}
