//! Front-page chrome: toolbar buttons, tab bar, header strip and the
//! navigation sidebar.
//!
//! These are plain view-state values. The screen decides when to build or
//! destroy them; the terminal renderer only reads them.

use crate::subreddits::SubredditList;
use ratatui::style::Color;

// ============================================================================
// Buttons
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarButton {
    Sort,
    /// Current account, or None when browsing as a guest.
    Account { name: Option<String> },
    Search,
    /// Shown while offline; activating it retries the connection.
    Offline,
    /// Opens the navigation sidebar.
    Drawer,
    /// Subreddit options.
    More,
    FlexibleSpace,
}

impl ToolbarButton {
    pub fn account(name: Option<&str>) -> Self {
        Self::Account {
            name: name.map(str::to_string),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Sort => "sort",
            Self::Account { name: Some(name) } => name,
            Self::Account { name: None } => "guest",
            Self::Search => "search",
            Self::Offline => "offline",
            Self::Drawer => "navigate",
            Self::More => "options",
            Self::FlexibleSpace => "",
        }
    }
}

// ============================================================================
// Tab Bar
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBar {
    pub items: Vec<String>,
    pub selected: usize,
    pub tint: Color,
}

impl TabBar {
    pub fn new(list: &SubredditList, selected: usize, tint: Color) -> Self {
        let items: Vec<String> = list.iter().map(str::to_string).collect();
        let selected = selected.min(items.len().saturating_sub(1));
        Self {
            items,
            selected,
            tint,
        }
    }

    /// Select a tab. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = index;
        }
    }
}

// ============================================================================
// Sidebar
// ============================================================================

/// Navigation sidebar: a collapsed strip along the bottom that expands into a
/// searchable subreddit list.
#[derive(Debug, Clone)]
pub struct Sidebar {
    subreddit: String,
    search: String,
    cursor: usize,
    /// Buttons in the sidebar's own toolbar.
    pub toolbar: Vec<ToolbarButton>,
    pub toolbar_bg: Color,
    pub accent: Color,
    pub header: Color,
    pub visible: bool,
    pub expanded: bool,
    /// Pinned beside the content instead of overlaying it.
    pub docked: bool,
    /// Width the sidebar lays out at, set on rotation.
    pub width: u16,
    reloads: u32,
}

impl Sidebar {
    pub fn new(subreddit: &str, toolbar_bg: Color) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            search: String::new(),
            cursor: 0,
            toolbar: Vec::new(),
            toolbar_bg,
            accent: Color::Reset,
            header: Color::Reset,
            visible: true,
            expanded: false,
            docked: false,
            width: 0,
            reloads: 0,
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn set_subreddit(&mut self, subreddit: &str) {
        self.subreddit = subreddit.to_string();
    }

    pub fn set_colors(&mut self, header: Color, accent: Color) {
        self.header = header;
        self.accent = accent;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn push_search(&mut self, c: char) {
        self.search.push(c);
        self.cursor = 0;
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
        self.cursor = 0;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.cursor = 0;
    }

    /// Names matching the search text, case-insensitively.
    pub fn matches<'a>(&self, list: &'a SubredditList) -> Vec<&'a str> {
        let needle = self.search.to_lowercase();
        list.iter()
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize, match_count: usize) {
        if match_count == 0 {
            self.cursor = 0;
            return;
        }
        let max = match_count - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    /// Subreddit under the cursor, or the raw search text when nothing
    /// matches so unknown names can still be opened.
    pub fn selection(&self, list: &SubredditList) -> Option<String> {
        let matches = self.matches(list);
        match matches.get(self.cursor) {
            Some(name) => Some((*name).to_string()),
            None if !self.search.trim().is_empty() => Some(self.search.trim().to_string()),
            None => None,
        }
    }

    pub fn expand(&mut self) {
        self.visible = true;
        self.expanded = true;
    }

    pub fn dismiss(&mut self) {
        self.expanded = false;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Peek the collapsed strip back in after returning to the screen.
    pub fn animate_in(&mut self) {
        self.visible = true;
        self.expanded = false;
    }

    pub fn rotate(&mut self, width: u16) {
        self.width = width;
    }

    pub fn did_slide_over(&mut self) {
        self.docked = true;
    }

    /// The subreddit source changed; cursor positions are stale.
    pub fn reload(&mut self) {
        self.cursor = 0;
        self.reloads = self.reloads.wrapping_add(1);
    }

    pub fn reload_count(&self) -> u32 {
        self.reloads
    }
}

// ============================================================================
// Chrome
// ============================================================================

#[derive(Debug, Clone)]
pub struct Chrome {
    pub sidebar: Option<Sidebar>,
    pub tab_bar: Option<TabBar>,
    /// Header strip color; None when hidden or dropped for a relayout.
    pub header: Option<Color>,
    pub nav_bar_tint: Color,
    /// Items in the header bar (sort, account).
    pub nav_items: Vec<ToolbarButton>,
    /// Bottom toolbar, populated only while offline.
    pub bottom_toolbar: Vec<ToolbarButton>,
    pub toolbar_bg: Color,
    pub background: Color,
}

impl Chrome {
    pub fn new(background: Color, toolbar_bg: Color) -> Self {
        Self {
            sidebar: None,
            tab_bar: None,
            header: None,
            nav_bar_tint: background,
            nav_items: Vec::new(),
            bottom_toolbar: Vec::new(),
            toolbar_bg,
            background,
        }
    }

    /// Whether the drawer button is mounted in the sidebar toolbar.
    pub fn has_drawer_button(&self) -> bool {
        self.sidebar
            .as_ref()
            .is_some_and(|s| s.toolbar.contains(&ToolbarButton::Drawer))
    }

    /// Rebuild every button. Online, the sidebar toolbar carries drawer and
    /// options; offline, the bottom toolbar carries search, account and the
    /// offline indicator.
    pub fn rebuild_buttons(&mut self, offline: bool, account: Option<&str>) {
        self.nav_items = vec![ToolbarButton::Sort, ToolbarButton::account(account)];

        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.toolbar.clear();
        }

        if offline {
            self.bottom_toolbar = vec![
                ToolbarButton::Search,
                ToolbarButton::account(account),
                ToolbarButton::FlexibleSpace,
                ToolbarButton::Offline,
            ];
        } else {
            self.bottom_toolbar.clear();
            if let Some(sidebar) = self.sidebar.as_mut() {
                sidebar.toolbar = vec![ToolbarButton::Drawer, ToolbarButton::More];
            }
        }
    }

    /// Replace the account shown on existing buttons without a full rebuild.
    pub fn set_account(&mut self, account: Option<&str>) {
        for button in self.nav_items.iter_mut().chain(self.bottom_toolbar.iter_mut()) {
            if let ToolbarButton::Account { name } = button {
                *name = account.map(str::to_string);
            }
        }
    }

    /// Force the next button pass to rebuild.
    pub fn invalidate_buttons(&mut self) {
        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.toolbar.clear();
        }
    }

    pub fn dismiss_sidebar(&mut self) {
        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.dismiss();
        }
    }

    pub fn sidebar_expanded(&self) -> bool {
        self.sidebar.as_ref().is_some_and(|s| s.expanded)
    }
}

// ============================================================================
// Tests
// ============================================================================
