//! A subreddit feed page backed by the listing client.
//!
//! Loads run as tokio tasks and report back through the app event channel,
//! tagged with a generation so results from superseded loads are dropped.

use crate::app::AppEvent;
use crate::paging::Page;
use crate::reddit::client::{FetchError, RedditClient, Sort};
use crate::reddit::listing::{Listing, Post};
use crate::screen::ports::{FeedFactory, FeedScreen};
use crate::theme::Theme;
use ratatui::style::Color;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Result of a background listing load.
#[derive(Debug)]
pub struct FeedLoaded {
    pub subreddit: String,
    pub generation: u64,
    /// Next page for an existing listing rather than a replacement.
    pub append: bool,
    pub result: Result<Listing, FetchError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

pub struct RedditFeed {
    subreddit: String,
    sort: Sort,
    posts: Vec<Post>,
    after: Option<String>,
    selected: usize,
    status: FeedStatus,
    generation: u64,
    /// Shared by every feed from one factory, so a replacement feed never
    /// reuses a generation still in flight for the page it replaced.
    generations: Arc<AtomicU64>,
    accent: Color,
    header: Color,
    ui_hidden: bool,
    client: Arc<RedditClient>,
    events: mpsc::Sender<AppEvent>,
    task: Option<JoinHandle<()>>,
}

impl RedditFeed {
    pub fn new(
        subreddit: &str,
        sort: Sort,
        client: Arc<RedditClient>,
        events: mpsc::Sender<AppEvent>,
        generations: Arc<AtomicU64>,
    ) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            sort,
            posts: Vec::new(),
            after: None,
            selected: 0,
            status: FeedStatus::Idle,
            generation: 0,
            generations,
            accent: Color::Reset,
            header: Color::Reset,
            ui_hidden: false,
            client,
            events,
            task: None,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn accent(&self) -> Color {
        self.accent
    }

    /// Header color the front page adopts once this feed has loaded.
    pub fn header_color(&self) -> Color {
        self.header
    }

    pub fn ui_hidden(&self) -> bool {
        self.ui_hidden
    }

    pub fn has_more(&self) -> bool {
        self.after.is_some()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.posts.len() {
            self.selected += 1;
            self.ui_hidden = true;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        if self.selected == 0 {
            self.ui_hidden = false;
        }
    }

    /// Change sort and reload from the first page.
    pub fn set_sort(&mut self, sort: Sort) {
        if self.sort != sort {
            self.sort = sort;
            self.load(true);
        }
    }

    /// Fetch the page after the last one loaded.
    pub fn load_more(&mut self) -> bool {
        if self.status == FeedStatus::Loading {
            return false;
        }
        let Some(after) = self.after.clone() else {
            return false;
        };
        self.spawn_fetch(Some(after), true);
        true
    }

    fn spawn_fetch(&mut self, after: Option<String>, append: bool) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
        self.generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        self.status = FeedStatus::Loading;

        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let subreddit = self.subreddit.clone();
        let sort = self.sort;
        let generation = self.generation;

        tracing::debug!(subreddit = %subreddit, sort = sort.as_str(), append, "Loading feed");
        self.task = Some(tokio::spawn(async move {
            let result = client.fetch_listing(&subreddit, sort, after.as_deref()).await;
            let event = AppEvent::FeedLoaded(FeedLoaded {
                subreddit,
                generation,
                append,
                result,
            });
            if events.send(event).await.is_err() {
                tracing::debug!("Event channel closed before feed load finished");
            }
        }));
    }

    /// Apply a finished load. Returns false for stale results.
    pub fn apply(&mut self, loaded: FeedLoaded) -> bool {
        if loaded.generation != self.generation {
            tracing::debug!(
                subreddit = %self.subreddit,
                generation = loaded.generation,
                current = self.generation,
                "Dropping stale feed result"
            );
            return false;
        }
        self.task = None;
        match loaded.result {
            Ok(listing) => {
                if loaded.append {
                    self.posts.extend(listing.posts);
                } else {
                    self.posts = listing.posts;
                    self.selected = 0;
                }
                self.after = listing.after;
                self.selected = self.selected.min(self.posts.len().saturating_sub(1));
                self.status = FeedStatus::Loaded;
            }
            Err(e) => {
                tracing::warn!(subreddit = %self.subreddit, error = %e, "Feed load failed");
                self.status = FeedStatus::Failed(e.to_string());
            }
        }
        true
    }
}

impl Drop for RedditFeed {
    fn drop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }
}

impl Page for RedditFeed {
    fn key(&self) -> &str {
        &self.subreddit
    }
}

impl FeedScreen for RedditFeed {
    fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// A load was started and has not failed.
    fn is_loaded(&self) -> bool {
        matches!(self.status, FeedStatus::Loading | FeedStatus::Loaded)
    }

    fn load(&mut self, reset: bool) {
        if reset {
            self.posts.clear();
            self.after = None;
            self.selected = 0;
            self.ui_hidden = false;
        }
        let after = if reset { None } else { self.after.clone() };
        self.spawn_fetch(after, !reset);
    }

    fn refresh(&mut self) {
        self.spawn_fetch(None, false);
    }

    fn retheme(&mut self, theme: &Theme) {
        self.accent = theme.accent_for_sub(&self.subreddit);
        self.header = theme.color_for_sub(&self.subreddit);
    }

    fn show_ui(&mut self) {
        self.ui_hidden = false;
    }
}

/// Builds [`RedditFeed`] pages sharing one client and event channel.
pub struct RedditFeeds {
    client: Arc<RedditClient>,
    generations: Arc<AtomicU64>,
    events: mpsc::Sender<AppEvent>,
    sort: Sort,
    theme: Theme,
}

impl RedditFeeds {
    pub fn new(
        client: Arc<RedditClient>,
        events: mpsc::Sender<AppEvent>,
        sort: Sort,
        theme: Theme,
    ) -> Self {
        Self {
            client,
            generations: Arc::new(AtomicU64::new(0)),
            events,
            sort,
            theme,
        }
    }

    /// Continue numbering loads from `generations`, so feeds from a factory
    /// that replaced this one never collide with results still queued.
    pub fn with_generations(mut self, generations: Arc<AtomicU64>) -> Self {
        self.generations = generations;
        self
    }

    pub fn client(&self) -> &RedditClient {
        &self.client
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// Sort used for feeds built from now on.
    pub fn set_sort(&mut self, sort: Sort) {
        self.sort = sort;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }
}

impl FeedFactory for RedditFeeds {
    type Screen = RedditFeed;

    fn make(&mut self, subreddit: &str) -> RedditFeed {
        let mut feed = RedditFeed::new(
            subreddit,
            self.sort,
            Arc::clone(&self.client),
            self.events.clone(),
            Arc::clone(&self.generations),
        );
        feed.retheme(&self.theme);
        feed
    }
}

// ============================================================================
// Tests
// ============================================================================
