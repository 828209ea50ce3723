//! The front page: a pager of subreddit feeds with its tab bar, sidebar and
//! toolbars kept in sync.
//!
//! All methods run on the UI task. Work that must happen after the current
//! turn (a page settling, a relayout after resize) is posted to the screen's
//! own [`MainQueue`] and executed by [`FrontPage::run_due`].

pub mod ports;

use std::time::{Duration, Instant};

use crate::chrome::{Chrome, Sidebar, TabBar};
use crate::config::AppMode;
use crate::paging::{NavigationDirection, PageFactory, PageSource, Pager};
use crate::scheduler::{MainQueue, TaskId};
use crate::session::{AccountEvent, AccountSubscription, Session};
use crate::subreddits::{build_list, needs_rebuild, shortcut_items, SubredditList};
use crate::theme::{Theme, ThemeSchedule, ThemeSnapshot, ThemeVariant};
use ratatui::style::Color;

use ports::{Collaborators, FeedFactory, FeedScreen, Reachability, ReachabilityProbe, Settings};

/// Delay between a resize and the relayout that restores the sidebar.
pub const RELAYOUT_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Loaded, first page not settled yet.
    Initializing,
    Ready,
    /// A page change or rebuild is waiting for its settle task.
    Transitioning,
    /// Reachability failed at appearance.
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScreenTask {
    SettlePage { index: usize },
    Relayout { restore_sidebar: bool, width: u16 },
}

#[derive(Debug, Clone, Copy)]
struct PendingRelayout {
    id: TaskId,
    restore_sidebar: bool,
}

impl PageSource for SubredditList {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_name(&self, index: usize) -> Option<&str> {
        self.get(index)
    }
}

/// Lends a [`FeedFactory`] to the pager as its page factory.
struct FeedPages<'a, F>(&'a mut F);

impl<F: FeedFactory> PageFactory for FeedPages<'_, F> {
    type Page = F::Screen;

    fn make_page(&mut self, name: &str) -> F::Screen {
        tracing::debug!(subreddit = %name, "Building feed screen");
        self.0.make(name)
    }
}

pub struct FrontPage<F: FeedFactory> {
    factory: F,
    ports: Collaborators,
    settings: Settings,
    theme: Theme,
    schedule: ThemeSchedule,
    session: Session,
    account_events: Option<AccountSubscription>,

    subs: SubredditList,
    pager: Pager<F::Screen>,
    chrome: Chrome,
    snapshot: ThemeSnapshot,
    current_title: String,
    /// The pending page change came from the tab bar itself.
    tab_selected: bool,

    state: ScreenState,
    queue: MainQueue<ScreenTask>,
    relayout: Option<PendingRelayout>,
    first_appearance: bool,
}

impl<F: FeedFactory> FrontPage<F> {
    pub fn new(
        factory: F,
        ports: Collaborators,
        settings: Settings,
        theme: Theme,
        schedule: ThemeSchedule,
        session: Session,
    ) -> Self {
        let background = theme.background();
        Self {
            factory,
            ports,
            pager: Pager::new(settings.page_cache_size),
            chrome: Chrome::new(background, theme.toolbar_color()),
            snapshot: ThemeSnapshot {
                primary: background,
                secondary: background,
            },
            settings,
            theme,
            schedule,
            session,
            account_events: None,
            subs: SubredditList::new(),
            current_title: String::new(),
            tab_selected: false,
            state: ScreenState::Initializing,
            queue: MainQueue::new(),
            relayout: None,
            first_appearance: true,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn subs(&self) -> &SubredditList {
        &self.subs
    }

    pub fn current_index(&self) -> usize {
        self.pager.current_index()
    }

    pub fn current_feed(&self) -> Option<&F::Screen> {
        self.pager.current()
    }

    pub fn current_feed_mut(&mut self) -> Option<&mut F::Screen> {
        self.pager.current_mut()
    }

    /// A displayed or cached feed, for delivering background results.
    pub fn feed_mut(&mut self, subreddit: &str) -> Option<&mut F::Screen> {
        self.pager.page_mut(subreddit)
    }

    pub fn pager(&self) -> &Pager<F::Screen> {
        &self.pager
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn chrome_mut(&mut self) -> &mut Chrome {
        &mut self.chrome
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        self.snapshot
    }

    pub fn current_title(&self) -> &str {
        &self.current_title
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.next_deadline()
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn relayout_pending(&self) -> bool {
        self.relayout.is_some()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn view_did_load(&mut self) {
        let background = self.theme.background();
        self.snapshot = ThemeSnapshot {
            primary: background,
            secondary: background,
        };

        self.restart();
        self.do_buttons();

        self.chrome.header = if self.settings.list_bar {
            self.header_color(&self.current_title)
        } else {
            None
        };

        self.account_events = Some(self.session.subscribe());
        tracing::info!(subreddits = self.subs.len(), "Front page loaded");
    }

    /// Reconcile theme and subscriptions before the screen is shown.
    /// `override_retheme` applies a theme change immediately instead of only
    /// flagging it.
    pub fn view_will_appear_actions(&mut self, override_retheme: bool) {
        self.chrome.header = self.header_color(&self.current_title);

        let desired = self.schedule.desired(self.ports.clock.hour());
        if self.session.reorder_changed || desired != self.theme.variant() {
            let subscribed = self.ports.store.subscribed();
            let pinned = self.ports.store.pinned();
            let subs_changed = needs_rebuild(&self.subs, &subscribed, &pinned);

            if desired != self.theme.variant() {
                tracing::info!(theme = desired.name(), "Switching theme variant");
                self.theme.set_variant(desired);
                self.session.needs_retheme = true;
                if override_retheme {
                    self.do_retheme();
                }
            }

            if subs_changed || self.session.reorder_changed {
                self.subs = build_list(&subscribed, &pinned);
                self.session.reorder_changed = false;
                self.redo_subs();
            }
        }

        self.chrome.toolbar_bg = self.theme.toolbar_color();
        let shown = self
            .pager
            .current()
            .map(|feed| feed.subreddit().to_string())
            .unwrap_or_default();
        self.chrome.nav_bar_tint = self.theme.color_for_sub(&shown);
    }

    pub fn view_will_appear(&mut self, probe: &dyn ReachabilityProbe) {
        self.view_will_appear_actions(false);

        if probe.status() == Reachability::Offline {
            self.enter_offline();
        }

        if self.session.needs_restart {
            self.session.needs_restart = false;
            self.rebuild_tab_bar();
        } else if self.session.needs_retheme {
            self.do_retheme();
        }
    }

    pub fn view_did_appear(&mut self) {
        if !self.first_appearance {
            if self.session.is_logged_in() {
                self.session.request_account_refresh();
            }
            if let Some(sidebar) = self.chrome.sidebar.as_mut() {
                sidebar.animate_in();
            }
        }
        self.first_appearance = false;
    }

    pub fn view_will_disappear(&mut self) {
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            sidebar.hide();
        }
    }

    pub fn view_did_disappear(&mut self) {
        self.chrome.dismiss_sidebar();
    }

    /// Cancel pending work and stop listening for account events.
    pub fn teardown(&mut self) {
        self.queue.cancel_all();
        self.relayout = None;
        self.account_events = None;
        self.chrome.dismiss_sidebar();
        tracing::debug!("Front page torn down");
    }

    /// Hard reset: tear down and hand the session to a replacement screen.
    pub fn into_session(mut self) -> Session {
        self.teardown();
        self.session
    }

    /// Hard reset for an owner that cannot give the screen up by value: tear
    /// down and move the session out, leaving a guest session behind. The
    /// screen is unusable afterwards and should be replaced.
    pub fn take_session(&mut self) -> Session {
        self.teardown();
        std::mem::take(&mut self.session)
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Run every queued task due at `now`. Returns how many ran.
    pub fn run_due(&mut self, now: Instant) -> usize {
        let due = self.queue.take_due(now);
        let count = due.len();
        for task in due {
            match task {
                ScreenTask::SettlePage { index } => {
                    self.advance_to_page(index);
                    self.finish_transition();
                }
                ScreenTask::Relayout {
                    restore_sidebar,
                    width,
                } => self.relayout(restore_sidebar, width),
            }
        }
        count
    }

    /// Handle account events posted since the last poll.
    pub fn poll_account_events(&mut self) {
        let events = match self.account_events.as_mut() {
            Some(sub) => sub.drain(),
            None => return,
        };
        for event in events {
            self.on_account_event(event);
        }
    }

    pub fn on_account_event(&mut self, event: AccountEvent) {
        tracing::debug!(?event, "Front page account event");
        match event {
            AccountEvent::RefreshRequested => {
                self.chrome.set_account(self.session.account());
            }
            AccountEvent::Changed { .. } | AccountEvent::ChangedToGuest => {
                self.restart();
            }
        }
    }

    fn begin_transition(&mut self) {
        if self.state == ScreenState::Ready {
            self.state = ScreenState::Transitioning;
        }
    }

    fn finish_transition(&mut self) {
        if matches!(
            self.state,
            ScreenState::Initializing | ScreenState::Transitioning
        ) {
            self.state = ScreenState::Ready;
        }
    }

    // ========================================================================
    // Page Coordination
    // ========================================================================

    /// Show `name` if it is on the front page, otherwise open it elsewhere.
    pub fn go_to_subreddit(&mut self, name: &str) {
        self.chrome.dismiss_sidebar();

        let Some(index) = self.subs.index_of(name) else {
            let path = format!("/r/{}", name.replace(' ', ""));
            tracing::info!(path = %path, "Subreddit not on front page, routing");
            self.ports.router.open(&path);
            return;
        };

        let page = self.pager.page_for(name, &mut FeedPages(&mut self.factory));
        self.ports.shortcuts.record_activity(name);
        self.snapshot = self.snapshot_for(name);

        let direction = NavigationDirection::between(self.pager.current_index(), index);
        self.begin_transition();
        self.pager.set_page(page, direction, self.settings.list_bar);
        self.queue.post(ScreenTask::SettlePage { index });
    }

    pub fn go_to_user(&mut self, profile: &str) {
        self.chrome.dismiss_sidebar();
        let path = format!("/u/{}", profile.replace(' ', ""));
        self.ports.router.open(&path);
    }

    /// Tab-bar selection.
    pub fn select_tab(&mut self, index: usize) {
        let Some(name) = self.subs.get(index).map(str::to_string) else {
            return;
        };
        self.tab_selected = true;
        if let Some(tabs) = self.chrome.tab_bar.as_mut() {
            tabs.select(index);
        }
        self.go_to_subreddit(&name);
    }

    /// Page to a neighbor. Only available while the list bar is on.
    pub fn swipe(&mut self, offset: isize) -> bool {
        let Some(target) = self
            .pager
            .swipe(&self.subs, &mut FeedPages(&mut self.factory), offset)
        else {
            return false;
        };
        if let Some(name) = self.subs.get(target) {
            self.snapshot = self.snapshot_for(name);
        }
        self.begin_transition();
        self.queue.post(ScreenTask::SettlePage { index: target });
        true
    }

    /// Commit the page at `index` as current and sync everything to it.
    pub fn advance_to_page(&mut self, index: usize) {
        if index >= self.subs.len() {
            tracing::debug!(index, len = self.subs.len(), "Ignoring out-of-range page");
            return;
        }
        let Some(sub) = self.pager.current().map(|f| f.subreddit().to_string()) else {
            return;
        };

        self.pager
            .set_current_index(self.subs.index_of(&sub).unwrap_or(index));
        self.session.current_subreddit = sub.clone();
        self.ports.presenter.announce(&format!("Viewing {sub}"));
        self.current_title = sub.clone();

        let color = self.theme.color_for_sub(&sub);
        let accent = self.theme.accent_for_sub(&sub);
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            sidebar.set_subreddit(&sub);
            sidebar.set_colors(color, accent);
            sidebar.clear_search();
        }
        self.chrome.nav_bar_tint = color;
        self.chrome.header = self.header_color(&sub);

        let list_bar = self.settings.list_bar;
        if let Some(feed) = self.pager.current_mut() {
            if !feed.is_loaded() {
                feed.load(true);
            } else if !list_bar {
                feed.refresh();
            }
        }

        self.chrome.set_account(self.session.account());

        let selected = self.subs.index_of(&sub);
        if let Some(tabs) = self.chrome.tab_bar.as_mut() {
            tabs.tint = accent;
            if !self.tab_selected {
                if let Some(pos) = selected {
                    tabs.select(pos);
                }
            }
        }
        self.tab_selected = false;

        tracing::debug!(subreddit = %sub, "Page settled");
    }

    /// Full reset of the front page.
    ///
    /// Rebuilds the subreddit list from the store, registers shortcuts, and
    /// rebuilds the sidebar, buttons and tab bar. The shown subreddit is kept
    /// when it survives the rebuild, otherwise the first entry is shown.
    ///
    /// The feed for the resolved subreddit is always built fresh, so it loads
    /// again when the settle task runs. Account switches and reconnects rely
    /// on this to replace a listing fetched under the old state.
    ///
    /// # State
    ///
    /// Moves to `Transitioning` (unless still `Initializing`) and posts a
    /// settle task. An empty list clears the pager and settles immediately.
    pub fn restart(&mut self) {
        let saved = self
            .pager
            .current()
            .map(|feed| feed.subreddit().to_string())
            .unwrap_or_else(|| self.session.current_subreddit.clone());

        if self.state != ScreenState::Initializing {
            self.state = ScreenState::Transitioning;
        }

        self.chrome.background = self.theme.background();
        self.session.reorder_changed = false;

        let subscribed = self.ports.store.subscribed();
        let pinned = self.ports.store.pinned();
        self.subs = build_list(&subscribed, &pinned);

        self.session.is_offline = false;
        self.ports.shortcuts.register(shortcut_items(&self.subs));

        let index = self.subs.index_of(&saved).unwrap_or(0);
        match self.subs.get(index).map(str::to_string) {
            Some(name) => {
                self.pager.discard(&name);
                let page = self.pager.page_for(&name, &mut FeedPages(&mut self.factory));
                self.pager.set_page(page, NavigationDirection::Forward, true);
                let subs = &self.subs;
                self.pager.retain_cached(|key| subs.contains(key));
                self.snapshot = self.snapshot_for(&name);
                self.queue.post(ScreenTask::SettlePage { index });
                tracing::info!(subreddit = %name, index, "Restarted front page");
            }
            None => {
                tracing::warn!("No subreddits to show");
                self.pager.clear();
                self.session.current_subreddit.clear();
                self.current_title.clear();
                self.finish_transition();
            }
        }

        self.make_menu_nav();
        self.do_buttons();
        self.rebuild_tab_bar();
    }

    /// Sync list-derived chrome after the list was rebuilt in place.
    fn redo_subs(&mut self) {
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            sidebar.reload();
        }
        let subs = &self.subs;
        self.pager.retain_cached(|key| subs.contains(key));

        let shown = self.pager.current().map(|f| f.subreddit().to_string());
        match shown.as_deref().and_then(|s| self.subs.index_of(s)) {
            Some(index) => self.pager.set_current_index(index),
            None if self.subs.is_empty() => {
                self.pager.clear();
            }
            None => {
                let index = self.pager.current_index().min(self.subs.len() - 1);
                let name = self.subs[index].to_string();
                self.go_to_subreddit(&name);
            }
        }
        self.rebuild_tab_bar();
    }

    fn rebuild_tab_bar(&mut self) {
        self.chrome.tab_bar = None;
        if self.settings.list_bar {
            let accent = self.theme.accent_for_sub(&self.session.current_subreddit);
            self.chrome.tab_bar = Some(TabBar::new(
                &self.subs,
                self.pager.current_index(),
                accent,
            ));
            self.pager.set_swipe_enabled(true);
        } else {
            self.pager.set_swipe_enabled(false);
        }
    }

    // ========================================================================
    // Chrome
    // ========================================================================

    pub fn do_buttons(&mut self) {
        if self.chrome.has_drawer_button() && !self.session.needs_retheme {
            return;
        }
        self.chrome
            .rebuild_buttons(self.session.is_offline, self.session.account());
    }

    /// Recreate the sidebar selecting the session's current subreddit.
    pub fn make_menu_nav(&mut self) {
        let mut sidebar = Sidebar::new(&self.session.current_subreddit, self.theme.toolbar_color());
        sidebar.docked = self.settings.app_mode == AppMode::Split;
        self.chrome.sidebar = Some(sidebar);
    }

    pub fn do_retheme(&mut self) {
        if let Some(feed) = self.pager.current_mut() {
            feed.retheme(&self.theme);
        }

        self.chrome.tab_bar = None;
        if self.settings.list_bar {
            let accent = self.theme.accent_for_sub(&self.session.current_subreddit);
            self.chrome.tab_bar = Some(TabBar::new(
                &self.subs,
                self.pager.current_index(),
                accent,
            ));
        }

        self.chrome.background = self.theme.background();
        self.chrome.nav_bar_tint = self.theme.color_for_sub(&self.current_title);
        self.chrome.header = self.header_color(&self.current_title);
        self.snapshot = self.snapshot_for(&self.current_title);

        let toolbar = self.theme.toolbar_color();
        let (base, accent) = (self.theme.base_color(), self.theme.palette().accent);
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            sidebar.set_colors(base, accent);
            sidebar.toolbar_bg = toolbar;
        }
        self.chrome.toolbar_bg = toolbar;

        self.do_buttons();
        self.session.needs_retheme = false;
    }

    /// The current feed reported a new header color.
    pub fn color_changed(&mut self, color: Color) {
        let current = self.session.current_subreddit.clone();
        if let Some(tabs) = self.chrome.tab_bar.as_mut() {
            tabs.tint = self.theme.accent_for_sub(&current);
        }
        self.chrome.header = if self.settings.fully_hide_header {
            None
        } else if self.settings.reduce_color {
            Some(self.theme.background())
        } else {
            Some(color)
        };

        if let Some(name) = self.subs.get(self.pager.current_index()) {
            let (header, accent) = (self.theme.color_for_sub(name), self.theme.accent_for_sub(name));
            if let Some(sidebar) = self.chrome.sidebar.as_mut() {
                sidebar.set_colors(header, accent);
            }
        }
    }

    pub fn show_drawer(&mut self) {
        if self.chrome.sidebar.is_none() {
            self.make_menu_nav();
        }
        let current = &self.session.current_subreddit;
        let (header, accent) = (self.theme.color_for_sub(current), self.theme.accent_for_sub(current));
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            sidebar.set_colors(header, accent);
            sidebar.expand();
        }
    }

    /// The terminal is about to change size.
    pub fn will_transition(&mut self, size: (u16, u16), now: Instant) {
        self.chrome.header = None;
        self.do_buttons();

        let mut restore_sidebar = false;
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            if sidebar.visible {
                restore_sidebar = true;
                sidebar.hide();
            }
        }

        if let Some(previous) = self.relayout.take() {
            self.queue.cancel(previous.id);
            restore_sidebar |= previous.restore_sidebar;
        }

        let id = self.queue.post_after(
            now,
            RELAYOUT_DELAY,
            ScreenTask::Relayout {
                restore_sidebar,
                width: size.0,
            },
        );
        self.relayout = Some(PendingRelayout {
            id,
            restore_sidebar,
        });
    }

    fn relayout(&mut self, restore_sidebar: bool, width: u16) {
        self.relayout = None;
        let split = self.settings.app_mode == AppMode::Split;
        if let Some(sidebar) = self.chrome.sidebar.as_mut() {
            if restore_sidebar {
                sidebar.visible = true;
            }
            sidebar.rotate(width);
            if split {
                sidebar.did_slide_over();
            }
        }
        if let Some(feed) = self.pager.current_mut() {
            feed.show_ui();
        }
        self.chrome.header = self.header_color(&self.current_title);
    }

    // ========================================================================
    // Offline & Theme
    // ========================================================================

    fn enter_offline(&mut self) {
        self.session.is_offline = true;
        if self.state != ScreenState::Offline {
            tracing::warn!("Reachability check failed, entering offline mode");
            self.state = ScreenState::Offline;
            self.ports.presenter.present_offline(&self.subs);
        }
        self.chrome.invalidate_buttons();
        self.do_buttons();
    }

    /// Re-check reachability from offline mode. Resets the screen when the
    /// connection is back.
    pub fn retry_online(&mut self, probe: &dyn ReachabilityProbe) -> bool {
        if self.state != ScreenState::Offline {
            return true;
        }
        match probe.status() {
            Reachability::Online => {
                tracing::info!("Connection restored");
                self.restart();
                true
            }
            Reachability::Offline => false,
        }
    }

    /// Change the day theme. Takes effect on the next appearance check.
    pub fn set_day_theme(&mut self, variant: ThemeVariant) {
        self.schedule.set_day(variant);
    }

    pub fn set_list_bar(&mut self, enabled: bool) {
        if self.settings.list_bar != enabled {
            self.settings.list_bar = enabled;
            self.session.needs_restart = true;
        }
    }

    fn header_color(&self, sub: &str) -> Option<Color> {
        if self.settings.fully_hide_header {
            None
        } else {
            Some(self.theme.color_for_sub(sub))
        }
    }

    fn snapshot_for(&self, sub: &str) -> ThemeSnapshot {
        if self.settings.list_bar && !self.settings.reduce_color {
            ThemeSnapshot {
                primary: self.theme.base_color(),
                secondary: self.theme.color_for_sub(sub),
            }
        } else {
            let background = self.theme.background();
            ThemeSnapshot {
                primary: background,
                secondary: background,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::ports::*;
    use super::*;
    use crate::paging::Page;
    use crate::subreddits::ShortcutItem;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        routed: Vec<String>,
        offline_shown: usize,
        announced: Vec<String>,
        shortcuts: Vec<ShortcutItem>,
        loads: Vec<(String, bool)>,
        refreshes: Vec<String>,
        show_ui: usize,
    }

    type Shared = Rc<RefCell<Log>>;

    struct Store(Rc<RefCell<(Vec<String>, Vec<String>)>>);

    impl SubscriptionStore for Store {
        fn subscribed(&self) -> Vec<String> {
            self.0.borrow().0.clone()
        }

        fn pinned(&self) -> Vec<String> {
            self.0.borrow().1.clone()
        }
    }

    struct Router(Shared);

    impl LinkRouter for Router {
        fn open(&mut self, path: &str) {
            self.0.borrow_mut().routed.push(path.to_string());
        }
    }

    struct Present(Shared);

    impl Presenter for Present {
        fn present_offline(&mut self, _subs: &SubredditList) {
            self.0.borrow_mut().offline_shown += 1;
        }

        fn announce(&mut self, text: &str) {
            self.0.borrow_mut().announced.push(text.to_string());
        }
    }

    struct Shortcuts(Shared);

    impl ShortcutRegistry for Shortcuts {
        fn register(&mut self, items: Vec<ShortcutItem>) {
            self.0.borrow_mut().shortcuts = items;
        }

        fn record_activity(&mut self, _subreddit: &str) {}
    }

    struct FixedClock(Rc<Cell<u32>>);

    impl Clock for FixedClock {
        fn hour(&self) -> u32 {
            self.0.get()
        }
    }

    struct Probe(Reachability);

    impl ReachabilityProbe for Probe {
        fn status(&self) -> Reachability {
            self.0
        }
    }

    struct Feed {
        sub: String,
        loaded: bool,
        log: Shared,
    }

    impl Page for Feed {
        fn key(&self) -> &str {
            &self.sub
        }
    }

    impl FeedScreen for Feed {
        fn subreddit(&self) -> &str {
            &self.sub
        }

        fn is_loaded(&self) -> bool {
            self.loaded
        }

        fn load(&mut self, reset: bool) {
            self.loaded = true;
            self.log.borrow_mut().loads.push((self.sub.clone(), reset));
        }

        fn refresh(&mut self) {
            self.log.borrow_mut().refreshes.push(self.sub.clone());
        }

        fn retheme(&mut self, _theme: &Theme) {}

        fn show_ui(&mut self) {
            self.log.borrow_mut().show_ui += 1;
        }
    }

    struct Feeds(Shared);

    impl FeedFactory for Feeds {
        type Screen = Feed;

        fn make(&mut self, subreddit: &str) -> Feed {
            Feed {
                sub: subreddit.to_string(),
                loaded: false,
                log: self.0.clone(),
            }
        }
    }

    struct Harness {
        screen: FrontPage<Feeds>,
        log: Shared,
        store: Rc<RefCell<(Vec<String>, Vec<String>)>>,
        hour: Rc<Cell<u32>>,
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn harness(subscribed: &[&str], pinned: &[&str], settings: Settings) -> Harness {
        let log: Shared = Rc::default();
        let store = Rc::new(RefCell::new((strings(subscribed), strings(pinned))));
        let hour = Rc::new(Cell::new(12));
        let ports = Collaborators {
            store: Box::new(Store(store.clone())),
            router: Box::new(Router(log.clone())),
            presenter: Box::new(Present(log.clone())),
            shortcuts: Box::new(Shortcuts(log.clone())),
            clock: Box::new(FixedClock(hour.clone())),
        };
        let screen = FrontPage::new(
            Feeds(log.clone()),
            ports,
            settings,
            Theme::new(ThemeVariant::Dark),
            ThemeSchedule::fixed(ThemeVariant::Dark),
            Session::new(None),
        );
        Harness {
            screen,
            log,
            store,
            hour,
        }
    }

    fn loaded(subscribed: &[&str], pinned: &[&str]) -> Harness {
        let mut h = harness(subscribed, pinned, Settings::default());
        h.screen.view_did_load();
        h.screen.run_due(Instant::now());
        h
    }

    #[test]
    fn test_load_settles_on_first_page() {
        let mut h = harness(&["aww", "pics"], &["pics"], Settings::default());
        h.screen.view_did_load();
        assert_eq!(h.screen.state(), ScreenState::Initializing);

        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.state(), ScreenState::Ready);
        assert_eq!(h.screen.session().current_subreddit, "pics");
        assert_eq!(h.log.borrow().loads, vec![("pics".to_string(), true)]);
        assert_eq!(h.log.borrow().announced, vec!["Viewing pics".to_string()]);
    }

    #[test]
    fn test_go_to_subreddit_transitions_then_settles() {
        let mut h = loaded(&["aww", "pics", "rust"], &[]);
        h.screen.go_to_subreddit("rust");
        assert_eq!(h.screen.state(), ScreenState::Transitioning);
        let transition = h.screen.pager().last_transition().cloned().unwrap();
        assert_eq!(transition.direction, NavigationDirection::Forward);
        assert!(transition.animated);

        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.state(), ScreenState::Ready);
        assert_eq!(h.screen.current_index(), 2);
        assert_eq!(h.screen.chrome().tab_bar.as_ref().unwrap().selected, 2);
    }

    #[test]
    fn test_go_to_unknown_subreddit_routes_once() {
        let mut h = loaded(&["aww"], &[]);
        h.screen.go_to_subreddit("ask science");
        assert_eq!(h.log.borrow().routed, vec!["/r/askscience".to_string()]);
        assert_eq!(h.screen.state(), ScreenState::Ready);
        assert!(!h.screen.has_pending_tasks());
    }

    #[test]
    fn test_go_to_user_strips_spaces() {
        let mut h = loaded(&["aww"], &[]);
        h.screen.show_drawer();
        h.screen.go_to_user("some one");
        assert_eq!(h.log.borrow().routed, vec!["/u/someone".to_string()]);
        assert!(!h.screen.chrome().sidebar_expanded());
    }

    #[test]
    fn test_advance_out_of_range_is_noop() {
        let mut h = loaded(&["aww", "pics"], &[]);
        let announced = h.log.borrow().announced.len();
        h.screen.advance_to_page(2);
        assert_eq!(h.log.borrow().announced.len(), announced);
        assert_eq!(h.screen.current_index(), 0);
    }

    #[test]
    fn test_without_list_bar_loaded_feed_refreshes() {
        let settings = Settings {
            list_bar: false,
            ..Settings::default()
        };
        let mut h = harness(&["aww", "pics"], &[], settings);
        h.screen.view_did_load();
        h.screen.run_due(Instant::now());
        assert!(h.screen.chrome().tab_bar.is_none());
        assert!(!h.screen.swipe(1));

        h.screen.advance_to_page(0);
        assert_eq!(h.log.borrow().refreshes, vec!["aww".to_string()]);
        let transition = h.screen.pager().last_transition().cloned().unwrap();
        assert!(transition.animated);

        h.screen.go_to_subreddit("pics");
        assert!(!h.screen.pager().last_transition().unwrap().animated);
    }

    #[test]
    fn test_swipe_moves_to_neighbor() {
        let mut h = loaded(&["aww", "pics"], &[]);
        assert!(h.screen.swipe(1));
        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.session().current_subreddit, "pics");
        assert!(!h.screen.swipe(1));
    }

    #[test]
    fn test_tab_selection_not_overwritten() {
        let mut h = loaded(&["aww", "pics", "rust"], &[]);
        h.screen.select_tab(1);
        assert_eq!(h.screen.chrome().tab_bar.as_ref().unwrap().selected, 1);
        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.session().current_subreddit, "pics");
        assert_eq!(h.screen.chrome().tab_bar.as_ref().unwrap().selected, 1);
    }

    #[test]
    fn test_restart_keeps_shown_subreddit() {
        let mut h = loaded(&["aww", "pics", "rust"], &[]);
        h.screen.go_to_subreddit("rust");
        h.screen.run_due(Instant::now());

        h.store.borrow_mut().0 = strings(&["rust", "zebra"]);
        h.screen.restart();
        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.current_index(), 0);
        assert_eq!(h.screen.session().current_subreddit, "rust");

        h.store.borrow_mut().0 = strings(&["aww", "news", "zebra"]);
        h.screen.restart();
        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.current_index(), 0);
        assert_eq!(h.screen.session().current_subreddit, "aww");
    }

    #[test]
    fn test_restart_registers_shortcuts() {
        let h = loaded(&["aww", "pics", "rust"], &[]);
        assert_eq!(
            h.log.borrow().shortcuts,
            vec![
                ShortcutItem::OpenLink,
                ShortcutItem::Subreddit("pics".to_string()),
                ShortcutItem::Subreddit("aww".to_string()),
            ]
        );
    }

    #[test]
    fn test_restart_with_empty_list() {
        let mut h = loaded(&[], &[]);
        assert!(h.screen.current_feed().is_none());
        assert_eq!(h.screen.state(), ScreenState::Ready);
        h.screen.advance_to_page(0);
    }

    #[test]
    fn test_offline_presented_once_then_retry() {
        let mut h = loaded(&["aww"], &[]);
        let offline = Probe(Reachability::Offline);
        h.screen.view_will_appear(&offline);
        h.screen.view_will_appear(&offline);
        assert_eq!(h.screen.state(), ScreenState::Offline);
        assert_eq!(h.log.borrow().offline_shown, 1);
        assert!(h.screen.session().is_offline);
        assert_eq!(h.screen.chrome().bottom_toolbar.len(), 4);

        assert!(!h.screen.retry_online(&offline));
        assert_eq!(h.screen.state(), ScreenState::Offline);

        assert!(h.screen.retry_online(&Probe(Reachability::Online)));
        h.screen.run_due(Instant::now());
        assert_eq!(h.screen.state(), ScreenState::Ready);
        assert!(!h.screen.session().is_offline);
        assert!(h.screen.chrome().has_drawer_button());
    }

    #[test]
    fn test_do_buttons_noop_when_drawer_present() {
        let mut h = loaded(&["aww"], &[]);
        h.screen.chrome_mut().nav_items.clear();
        h.screen.do_buttons();
        assert!(h.screen.chrome().nav_items.is_empty());

        h.screen.session_mut().needs_retheme = true;
        h.screen.do_buttons();
        assert_eq!(h.screen.chrome().nav_items.len(), 2);
    }

    #[test]
    fn test_resize_hides_sidebar_and_relayout_restores() {
        let mut h = loaded(&["aww"], &[]);
        let start = Instant::now();
        h.screen.will_transition((100, 40), start);
        assert!(h.screen.chrome().header.is_none());
        assert!(!h.screen.chrome().sidebar.as_ref().unwrap().visible);

        h.screen.run_due(start + Duration::from_millis(100));
        assert!(h.screen.relayout_pending());

        h.screen.run_due(start + RELAYOUT_DELAY);
        let sidebar = h.screen.chrome().sidebar.as_ref().unwrap();
        assert!(sidebar.visible);
        assert_eq!(sidebar.width, 100);
        assert_eq!(h.log.borrow().show_ui, 1);
        assert!(h.screen.chrome().header.is_some());
    }

    #[test]
    fn test_newer_resize_supersedes_pending_relayout() {
        let mut h = loaded(&["aww"], &[]);
        let start = Instant::now();
        h.screen.will_transition((100, 40), start);
        h.screen
            .will_transition((120, 40), start + Duration::from_millis(200));

        h.screen.run_due(start + RELAYOUT_DELAY);
        assert_eq!(h.log.borrow().show_ui, 0);

        h.screen
            .run_due(start + Duration::from_millis(200) + RELAYOUT_DELAY);
        assert_eq!(h.log.borrow().show_ui, 1);
        let sidebar = h.screen.chrome().sidebar.as_ref().unwrap();
        assert!(sidebar.visible);
        assert_eq!(sidebar.width, 120);
    }

    #[test]
    fn test_teardown_cancels_relayout() {
        let mut h = loaded(&["aww"], &[]);
        let start = Instant::now();
        h.screen.will_transition((100, 40), start);
        h.screen.teardown();
        h.screen.run_due(start + Duration::from_secs(1));
        assert_eq!(h.log.borrow().show_ui, 0);
        assert!(!h.screen.relayout_pending());
    }

    #[test]
    fn test_night_theme_flags_retheme() {
        let mut h = harness(&["aww"], &[], Settings::default());
        h.screen.schedule = ThemeSchedule::from_config(
            ThemeVariant::Dark,
            &crate::config::NightConfig {
                enabled: true,
                theme: "light".to_string(),
                start_hour: 21,
                end_hour: 7,
            },
        );
        h.screen.view_did_load();
        h.screen.run_due(Instant::now());

        h.hour.set(23);
        h.screen.view_will_appear_actions(false);
        assert_eq!(h.screen.theme().variant(), ThemeVariant::Light);
        assert!(h.screen.session().needs_retheme);

        h.screen.view_will_appear(&Probe(Reachability::Online));
        assert!(!h.screen.session().needs_retheme);
    }

    #[test]
    fn test_reorder_rebuilds_list_on_appear() {
        let mut h = loaded(&["aww", "pics"], &[]);
        h.store.borrow_mut().1 = strings(&["pics"]);
        h.screen.session_mut().reorder_changed = true;
        h.screen.view_will_appear_actions(false);

        let names: Vec<&str> = h.screen.subs().iter().collect();
        assert_eq!(names, vec!["pics", "aww"]);
        assert_eq!(h.screen.current_index(), 1);
        assert!(!h.screen.session().reorder_changed);
    }

    #[test]
    fn test_account_change_restarts() {
        let mut h = loaded(&["aww", "pics"], &[]);
        h.store.borrow_mut().0 = strings(&["aww", "pics", "rust"]);
        h.screen
            .session_mut()
            .switch_account(Some("spez".to_string()));
        h.screen.poll_account_events();
        assert_eq!(h.screen.subs().len(), 3);
        assert_eq!(h.screen.chrome().nav_items[1].label(), "spez");
    }

    #[test]
    fn test_account_change_reloads_shown_feed() {
        let mut h = loaded(&["aww", "pics"], &[]);
        h.screen
            .session_mut()
            .switch_account(Some("spez".to_string()));
        h.screen.poll_account_events();
        h.screen.run_due(Instant::now());

        assert_eq!(
            h.log.borrow().loads,
            vec![("aww".to_string(), true), ("aww".to_string(), true)]
        );
        assert!(h.log.borrow().refreshes.is_empty());
    }

    #[test]
    fn test_reconnect_reloads_shown_feed() {
        let mut h = loaded(&["aww", "pics"], &[]);
        h.screen.go_to_subreddit("pics");
        h.screen.run_due(Instant::now());
        h.screen.view_will_appear(&Probe(Reachability::Offline));

        assert!(h.screen.retry_online(&Probe(Reachability::Online)));
        h.screen.run_due(Instant::now());

        let pics_loads = h
            .log
            .borrow()
            .loads
            .iter()
            .filter(|(sub, reset)| sub == "pics" && *reset)
            .count();
        assert_eq!(pics_loads, 2);
        assert_eq!(h.screen.session().current_subreddit, "pics");
    }

    #[test]
    fn test_snapshot_tints_with_list_bar() {
        let mut h = loaded(&["aww", "pics"], &[]);
        let pics = Color::Rgb(0x12, 0x34, 0x56);
        h.screen.theme.set_sub_color("pics", pics);

        h.screen.go_to_subreddit("pics");
        assert_eq!(
            h.screen.snapshot(),
            ThemeSnapshot {
                primary: h.screen.theme().base_color(),
                secondary: pics,
            }
        );
    }

    #[test]
    fn test_snapshot_flat_with_reduce_color() {
        let settings = Settings {
            reduce_color: true,
            ..Settings::default()
        };
        let mut h = harness(&["aww", "pics"], &[], settings);
        h.screen.theme.set_sub_color("pics", Color::Rgb(0x12, 0x34, 0x56));
        h.screen.view_did_load();
        h.screen.run_due(Instant::now());

        h.screen.go_to_subreddit("pics");
        let background = h.screen.theme().background();
        assert_eq!(
            h.screen.snapshot(),
            ThemeSnapshot {
                primary: background,
                secondary: background,
            }
        );
    }

    #[test]
    fn test_color_changed_respects_header_settings() {
        let reported = Color::Rgb(0xaa, 0x00, 0x00);

        let mut h = loaded(&["aww"], &[]);
        h.screen.color_changed(reported);
        assert_eq!(h.screen.chrome().header, Some(reported));

        let mut h = harness(
            &["aww"],
            &[],
            Settings {
                fully_hide_header: true,
                ..Settings::default()
            },
        );
        h.screen.view_did_load();
        h.screen.color_changed(reported);
        assert_eq!(h.screen.chrome().header, None);

        let mut h = harness(
            &["aww"],
            &[],
            Settings {
                reduce_color: true,
                ..Settings::default()
            },
        );
        h.screen.view_did_load();
        h.screen.color_changed(reported);
        assert_eq!(h.screen.chrome().header, Some(h.screen.theme().background()));
    }

    #[test]
    fn test_retheme_rebuilds_chrome() {
        let mut h = loaded(&["aww", "pics"], &[]);
        h.screen.chrome_mut().tab_bar = None;
        h.screen.chrome_mut().nav_items.clear();

        h.screen.theme.set_variant(ThemeVariant::Light);
        h.screen.session_mut().needs_retheme = true;
        h.screen.do_retheme();

        let light = ThemeVariant::Light.palette();
        let chrome = h.screen.chrome();
        let tabs = chrome.tab_bar.as_ref().unwrap();
        assert_eq!(tabs.items.len(), 2);
        assert_eq!(chrome.background, light.background);
        assert_eq!(chrome.toolbar_bg, light.toolbar);
        assert_eq!(chrome.sidebar.as_ref().unwrap().toolbar_bg, light.toolbar);
        assert_eq!(chrome.nav_items.len(), 2);
        assert_eq!(h.screen.snapshot().primary, light.base);
        assert!(!h.screen.session().needs_retheme);
    }

    #[test]
    fn test_take_session_tears_down() {
        let mut h = loaded(&["aww"], &[]);
        let start = Instant::now();
        h.screen.will_transition((100, 40), start);

        let session = h.screen.take_session();
        assert_eq!(session.current_subreddit, "aww");
        assert_eq!(session.subscriber_count(), 0);
        assert!(!h.screen.relayout_pending());
        assert!(h.screen.session().current_subreddit.is_empty());
    }

    #[test]
    fn test_into_session_drops_subscription() {
        let h = loaded(&["aww"], &[]);
        assert_eq!(h.screen.session().subscriber_count(), 1);
        let session = h.screen.into_session();
        assert_eq!(session.subscriber_count(), 0);
        assert_eq!(session.current_subreddit, "aww");
    }
}
