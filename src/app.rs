//! Application state for the terminal shell: the front page plus the prompts,
//! overlays and status line around it.

use crate::config::Config;
use crate::host::{ChannelPresenter, ChannelRouter, ChannelShortcuts, SharedSubscriptions};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::reddit::{FeedLoaded, FetchError, RedditClient, RedditFeed, RedditFeeds, Sort};
use crate::screen::ports::{
    Collaborators, FeedFactory, FeedScreen, ReachabilityProbe, Settings, SystemClock,
};
use crate::screen::FrontPage;
use crate::session::Session;
use crate::subreddits::ShortcutItem;
use crate::theme::{Theme, ThemeSchedule};
use crate::util::{normalize_name, MAX_INPUT_LENGTH};
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Visited subreddits remembered for the help overlay.
const RECENT_LIMIT: usize = 10;

// ============================================================================
// Events
// ============================================================================

/// Events delivered to the UI loop from background tasks and screen ports.
#[derive(Debug)]
pub enum AppEvent {
    FeedLoaded(FeedLoaded),
    /// A path the front page could not show itself.
    OpenLink(String),
    /// Subreddits to list while offline.
    OfflineOverview(Vec<String>),
    Announce(String),
    Shortcuts(Vec<ShortcutItem>),
    Visited(String),
}

// ============================================================================
// Prompt
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    GoToSubreddit,
    GoToUser,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::GoToSubreddit => "Go to r/",
            Self::GoToUser => "Go to u/",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

// ============================================================================
// Screen construction
// ============================================================================

/// Everything needed to build a front page, kept so a hard reset can build a
/// fresh one around the surviving session.
struct ScreenParts {
    client: Arc<RedditClient>,
    events: mpsc::Sender<AppEvent>,
    subscriptions: SharedSubscriptions,
    schedule: ThemeSchedule,
    /// Load generations survive a hard reset.
    generations: Arc<AtomicU64>,
}

impl ScreenParts {
    fn front_page(
        &self,
        settings: Settings,
        theme: Theme,
        sort: Sort,
        session: Session,
    ) -> FrontPage<RedditFeeds> {
        let factory = RedditFeeds::new(
            Arc::clone(&self.client),
            self.events.clone(),
            sort,
            theme.clone(),
        )
        .with_generations(Arc::clone(&self.generations));
        let ports = Collaborators {
            store: Box::new(self.subscriptions.clone()),
            router: Box::new(ChannelRouter::new(self.events.clone())),
            presenter: Box::new(ChannelPresenter::new(self.events.clone())),
            shortcuts: Box::new(ChannelShortcuts::new(self.events.clone())),
            clock: Box::new(SystemClock),
        };
        FrontPage::new(factory, ports, settings, theme, self.schedule, session)
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub screen: FrontPage<RedditFeeds>,
    pub subscriptions: SharedSubscriptions,
    pub keybindings: KeybindingRegistry,

    pub prompt: Option<Prompt>,
    /// Feed for a routed `/r/` link that is not on the front page.
    pub detached: Option<RedditFeed>,
    /// Set while the offline overview is shown.
    pub offline_overview: Option<Vec<String>>,
    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub shortcuts: Vec<ShortcutItem>,
    pub recent: VecDeque<String>,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,

    accounts: Vec<String>,
    probe: Box<dyn ReachabilityProbe>,
    parts: ScreenParts,
}

impl App {
    /// Build the shell and present the front page.
    ///
    /// Subscriptions, theme, night schedule and sort come from `config`.
    /// Keybinding overrides that do not apply are logged and skipped. The
    /// front page goes through load and appearance before this returns, so
    /// the first settle task is already queued and the offline overview has
    /// been posted when `probe` reports offline.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration
    /// * `client` - Listing client shared by every feed
    /// * `events` - Sender that feed loads and screen ports report through
    /// * `probe` - Reachability check run on each appearance
    pub fn new(
        config: &Config,
        client: Arc<RedditClient>,
        events: mpsc::Sender<AppEvent>,
        probe: Box<dyn ReachabilityProbe>,
    ) -> Self {
        let subscriptions =
            SharedSubscriptions::new(config.subscriptions.clone(), config.pinned.clone());
        let theme = Theme::from_config(config);
        let day = theme.variant();
        let parts = ScreenParts {
            client,
            events,
            subscriptions: subscriptions.clone(),
            schedule: ThemeSchedule::from_config(day, &config.night),
            generations: Arc::new(AtomicU64::new(0)),
        };
        let sort = Sort::from_str_name(&config.sort).unwrap_or_default();
        let screen = parts.front_page(
            Settings::from_config(config),
            theme,
            sort,
            Session::new(config.account.clone()),
        );

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        let mut app = Self {
            screen,
            subscriptions,
            keybindings,
            prompt: None,
            detached: None,
            offline_overview: None,
            show_help: false,
            help_scroll_offset: 0,
            shortcuts: Vec::new(),
            recent: VecDeque::with_capacity(RECENT_LIMIT),
            status_message: None,
            needs_redraw: true,
            accounts: config.accounts.clone(),
            probe,
            parts,
        };
        app.present();
        app
    }

    /// Run the front page's load and appearance callbacks.
    fn present(&mut self) {
        self.screen.view_did_load();
        self.screen.view_will_appear(self.probe.as_ref());
        self.screen.view_did_appear();
    }

    pub fn style(&self, role: &str) -> Style {
        self.screen.theme().style(role)
    }

    /// Input context for key dispatch, innermost first.
    pub fn context(&self) -> Context {
        if self.prompt.is_some() {
            Context::Prompt
        } else if self.offline_overview.is_some() {
            Context::Offline
        } else if self.screen.chrome().sidebar_expanded() {
            Context::Sidebar
        } else {
            Context::Feed
        }
    }

    /// The feed keys act on: a detached feed when one is open.
    pub fn active_feed(&self) -> Option<&RedditFeed> {
        self.detached.as_ref().or_else(|| self.screen.current_feed())
    }

    pub fn active_feed_mut(&mut self) -> Option<&mut RedditFeed> {
        match self.detached.as_mut() {
            Some(feed) => Some(feed),
            None => self.screen.current_feed_mut(),
        }
    }

    pub fn active_subreddit(&self) -> Option<String> {
        self.active_feed().map(|feed| feed.subreddit().to_string())
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Screen plumbing
    // ========================================================================

    /// Run due screen tasks and pending account events. Returns true when a
    /// task ran.
    pub fn run_screen_tasks(&mut self) -> bool {
        let ran = self.screen.run_due(std::time::Instant::now());
        self.screen.poll_account_events();
        ran > 0
    }

    /// Hand a finished load to the feed that asked for it.
    pub fn apply_feed_loaded(&mut self, loaded: FeedLoaded) {
        let failure = match &loaded.result {
            Err(FetchError::RateLimited(secs)) => {
                Some(format!("Rate limited, retry in {}s", secs))
            }
            Err(e) => Some(format!("Failed to load r/{}: {}", loaded.subreddit, e)),
            Ok(_) => None,
        };
        let subreddit = loaded.subreddit.clone();

        let detached = self
            .detached
            .as_ref()
            .is_some_and(|feed| feed.subreddit() == subreddit);
        let target = if detached {
            self.detached.as_mut()
        } else {
            self.screen.feed_mut(&subreddit)
        };
        let Some(feed) = target else {
            tracing::debug!(subreddit = %subreddit, "Feed gone before its load finished");
            return;
        };
        let header = feed.header_color();
        if !feed.apply(loaded) {
            return;
        }
        match failure {
            Some(msg) => self.set_status(msg),
            // The shown front-page feed now owns the header color.
            None if !detached && self.screen.current_title() == subreddit => {
                self.screen.color_changed(header);
            }
            None => {}
        }
    }

    /// Open a path the front page routed away.
    pub fn open_link(&mut self, path: &str) {
        if let Some(name) = path.strip_prefix("/r/") {
            let name = normalize_name(name);
            if name.is_empty() {
                return;
            }
            let mut feed = self.screen.factory_mut().make(&name);
            feed.load(true);
            self.detached = Some(feed);
            self.set_status(format!("r/{} is not subscribed (+ to subscribe)", name));
            return;
        }
        let url = self.parts.client.web_url(path);
        match url {
            Some(url) => self.open_url(url.as_str()),
            None => self.set_status(format!("Cannot open {}", path)),
        }
    }

    pub fn open_url(&mut self, url: &str) {
        match open::that(url) {
            Ok(()) => self.set_status("Opened in browser"),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to open browser");
                self.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }

    pub fn record_visit(&mut self, subreddit: String) {
        self.recent.retain(|s| !s.eq_ignore_ascii_case(&subreddit));
        self.recent.push_front(subreddit);
        self.recent.truncate(RECENT_LIMIT);
    }

    /// Tear the front page down and build a fresh one around its session.
    pub fn hard_reset(&mut self) {
        let settings = self.screen.settings().clone();
        let theme = self.screen.theme().clone();
        let sort = self.screen.factory().sort();
        let session = self.screen.take_session();

        self.detached = None;
        self.screen = self.parts.front_page(settings, theme, sort, session);
        self.present();
        tracing::info!("Front page rebuilt");
    }

    // ========================================================================
    // Actions
    // ========================================================================

    pub fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt {
            kind,
            input: String::new(),
        });
    }

    pub fn prompt_push(&mut self, c: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            if prompt.input.len() < MAX_INPUT_LENGTH && !c.is_control() {
                prompt.input.push(c);
            }
        }
    }

    pub fn prompt_pop(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.input.pop();
        }
    }

    pub fn confirm_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let name = normalize_name(&prompt.input);
        if name.is_empty() {
            return;
        }
        match prompt.kind {
            PromptKind::GoToSubreddit => self.go_to_subreddit(&name),
            PromptKind::GoToUser => self.screen.go_to_user(&name),
        }
    }

    /// Show a subreddit, closing any detached feed first.
    pub fn go_to_subreddit(&mut self, name: &str) {
        self.detached = None;
        self.screen.go_to_subreddit(name);
    }

    pub fn close_detached(&mut self) -> bool {
        self.detached.take().is_some()
    }

    pub fn cycle_sort(&mut self) {
        let Some(next) = self.active_feed().map(|feed| feed.sort().next()) else {
            return;
        };
        if self.detached.is_none() {
            self.screen.factory_mut().set_sort(next);
        }
        if let Some(feed) = self.active_feed_mut() {
            feed.set_sort(next);
        }
        self.set_status(format!("Sorted by {}", next.as_str()));
    }

    /// Cycle guest, then each configured account.
    pub fn switch_account(&mut self) {
        let current = self.screen.session().account().map(str::to_string);
        let next = match &current {
            None => self.accounts.first().cloned(),
            Some(name) => self
                .accounts
                .iter()
                .position(|a| a == name)
                .and_then(|i| self.accounts.get(i + 1))
                .cloned(),
        };
        if next == current {
            self.set_status("No other accounts configured");
            return;
        }
        let label = next.clone().unwrap_or_else(|| "guest".to_string());
        self.screen.session_mut().switch_account(next);
        self.screen.poll_account_events();
        self.set_status(format!("Switched to {}", label));
    }

    pub fn cycle_theme(&mut self) {
        let next = self.screen.theme().variant().next();
        self.parts.schedule.set_day(next);
        self.screen.set_day_theme(next);
        self.screen.view_will_appear_actions(true);
        let theme = self.screen.theme().clone();
        self.screen.factory_mut().set_theme(theme);
        self.set_status(format!("Theme: {}", self.screen.theme().variant().name()));
    }

    pub fn toggle_list_bar(&mut self) {
        let enabled = !self.screen.settings().list_bar;
        self.screen.set_list_bar(enabled);
        self.screen.view_will_appear(self.probe.as_ref());
        self.set_status(if enabled {
            "Tab bar on"
        } else {
            "Tab bar off"
        });
    }

    /// Page to a neighbor subreddit.
    pub fn swipe(&mut self, offset: isize) {
        if self.detached.is_some() {
            return;
        }
        if !self.screen.swipe(offset) && !self.screen.settings().list_bar {
            self.set_status("Paging needs the tab bar (b)");
        }
    }

    pub fn toggle_pin(&mut self) {
        let Some(sub) = self.active_subreddit() else {
            return;
        };
        let pinned = self.subscriptions.toggle_pin(&sub);
        self.subscriptions_changed();
        self.set_status(if pinned {
            format!("Pinned r/{}", sub)
        } else {
            format!("Unpinned r/{}", sub)
        });
    }

    pub fn subscribe(&mut self) {
        let Some(sub) = self.active_subreddit() else {
            return;
        };
        if !self.subscriptions.subscribe(&sub) {
            self.set_status(format!("Already subscribed to r/{}", sub));
            return;
        }
        self.detached = None;
        self.subscriptions_changed();
        self.screen.go_to_subreddit(&sub);
        self.set_status(format!("Subscribed to r/{}", sub));
    }

    pub fn unsubscribe(&mut self) {
        let Some(sub) = self.active_subreddit() else {
            return;
        };
        if !self.subscriptions.unsubscribe(&sub) {
            self.set_status(format!("Not subscribed to r/{}", sub));
            return;
        }
        self.subscriptions_changed();
        self.set_status(format!("Unsubscribed from r/{}", sub));
    }

    fn subscriptions_changed(&mut self) {
        self.screen.session_mut().reorder_changed = true;
        self.screen.view_will_appear_actions(false);
    }

    pub fn refresh(&mut self) {
        if let Some(feed) = self.active_feed_mut() {
            feed.refresh();
        }
    }

    pub fn load_more(&mut self) {
        let started = self.active_feed_mut().is_some_and(|feed| feed.load_more());
        if !started {
            self.set_status("No more posts");
        }
    }

    pub fn select_next_post(&mut self) {
        if let Some(feed) = self.active_feed_mut() {
            feed.select_next();
            if feed.selected() + 1 >= feed.posts().len() && feed.has_more() {
                feed.load_more();
            }
        }
    }

    pub fn select_prev_post(&mut self) {
        if let Some(feed) = self.active_feed_mut() {
            feed.select_prev();
        }
    }

    pub fn open_selected_link(&mut self) {
        let Some(url) = self
            .active_feed()
            .and_then(|feed| feed.selected_post())
            .map(|post| post.url.clone())
        else {
            return;
        };
        self.open_url(&url);
    }

    pub fn open_selected_comments(&mut self) {
        let url = self
            .active_feed()
            .and_then(|feed| feed.selected_post())
            .and_then(|post| self.parts.client.web_url(&post.permalink));
        if let Some(url) = url {
            self.open_url(url.as_str());
        }
    }

    pub fn toggle_sidebar(&mut self) {
        if self.screen.chrome().sidebar_expanded() {
            self.screen.chrome_mut().dismiss_sidebar();
        } else {
            self.screen.show_drawer();
        }
    }

    /// Go to the sidebar's selection (or typed search text).
    pub fn sidebar_select(&mut self) {
        let selection = self
            .screen
            .chrome()
            .sidebar
            .as_ref()
            .and_then(|sidebar| sidebar.selection(self.screen.subs()));
        if let Some(name) = selection {
            self.go_to_subreddit(&normalize_name(&name));
        }
    }

    pub fn sidebar_move(&mut self, delta: isize) {
        let count = self
            .screen
            .chrome()
            .sidebar
            .as_ref()
            .map(|sidebar| sidebar.matches(self.screen.subs()).len())
            .unwrap_or(0);
        if let Some(sidebar) = self.screen.chrome_mut().sidebar.as_mut() {
            sidebar.move_cursor(delta, count);
        }
    }

    pub fn retry_online(&mut self) {
        if self.screen.retry_online(self.probe.as_ref()) {
            self.offline_overview = None;
            self.set_status("Back online");
        } else {
            self.set_status("Still offline");
        }
    }

    /// The terminal was resized.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen
            .will_transition((width, height), std::time::Instant::now());
    }

    /// Leave the screen: the disappearance callbacks run and pending work is
    /// cancelled.
    pub fn shutdown(&mut self) {
        self.screen.view_will_disappear();
        self.screen.view_did_disappear();
        self.screen.teardown();
        self.detached = None;
    }
}

// ============================================================================
// Tests
// ============================================================================
