//! Keybinding registry: maps keys to actions per input context, with user
//! overrides from config.toml.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NextPage,
    PrevPage,
    Select,
    Back,
    ToggleSidebar,
    SidebarSearch,
    GoToSubreddit,
    GoToUser,
    CycleSort,
    SwitchAccount,
    CycleTheme,
    ToggleListBar,
    Refresh,
    Restart,
    PinCurrent,
    Subscribe,
    Unsubscribe,
    OpenInBrowser,
    OpenComments,
    LoadMore,
    RetryOnline,
    ShowHelp,
    Confirm,
    Cancel,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NextPage => "Next subreddit",
            Self::PrevPage => "Previous subreddit",
            Self::Select => "Select / open",
            Self::Back => "Go back / dismiss",
            Self::ToggleSidebar => "Toggle navigation sidebar",
            Self::SidebarSearch => "Search subreddits",
            Self::GoToSubreddit => "Go to subreddit",
            Self::GoToUser => "Go to user",
            Self::CycleSort => "Cycle listing sort",
            Self::SwitchAccount => "Switch account",
            Self::CycleTheme => "Cycle theme",
            Self::ToggleListBar => "Toggle subreddit tab bar",
            Self::Refresh => "Refresh current feed",
            Self::Restart => "Rebuild front page",
            Self::PinCurrent => "Pin / unpin subreddit",
            Self::Subscribe => "Subscribe to subreddit",
            Self::Unsubscribe => "Unsubscribe from subreddit",
            Self::OpenInBrowser => "Open link in browser",
            Self::OpenComments => "Open comments in browser",
            Self::LoadMore => "Load more posts",
            Self::RetryOnline => "Retry connection",
            Self::ShowHelp => "Show help",
            Self::Confirm => "Confirm",
            Self::Cancel => "Cancel",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Feed,
    Sidebar,
    Prompt,
    Offline,
}

impl Context {
    /// Contexts where unbound printable keys are typed text, so Global
    /// bindings must not fire.
    pub fn takes_text(self) -> bool {
        matches!(self, Self::Sidebar | Self::Prompt)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Feed => "Feed",
            Self::Sidebar => "Sidebar",
            Self::Prompt => "Prompt",
            Self::Offline => "Offline",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right",
///   "Backspace", "PageUp", "PageDown", "Space"
/// - Modifier combos: "Ctrl+d"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "backspace" => Some(KeyCode::Backspace),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(&['F', 'f'][..])
        .and_then(|digits| digits.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Default Bindings
// ============================================================================

const DEFAULT_BINDINGS: &[(Context, KeySpec, Action)] = &[
    // Global
    (Context::Global, KeySpec::ch('q'), Action::Quit),
    (Context::Global, KeySpec::ch('?'), Action::ShowHelp),
    (Context::Global, KeySpec::ch('j'), Action::NavDown),
    (Context::Global, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Global, KeySpec::ch('k'), Action::NavUp),
    (Context::Global, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Global, KeySpec::ch('l'), Action::NextPage),
    (Context::Global, KeySpec::plain(KeyCode::Right), Action::NextPage),
    (Context::Global, KeySpec::ch('h'), Action::PrevPage),
    (Context::Global, KeySpec::plain(KeyCode::Left), Action::PrevPage),
    (Context::Global, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Global, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Global, KeySpec::plain(KeyCode::Tab), Action::ToggleSidebar),
    (Context::Global, KeySpec::ch('/'), Action::SidebarSearch),
    (Context::Global, KeySpec::ch('g'), Action::GoToSubreddit),
    (Context::Global, KeySpec::ch('u'), Action::GoToUser),
    (Context::Global, KeySpec::ch('a'), Action::SwitchAccount),
    (Context::Global, KeySpec::ch('T'), Action::CycleTheme),
    (Context::Global, KeySpec::ch('b'), Action::ToggleListBar),
    (Context::Global, KeySpec::ch('R'), Action::Restart),
    // Feed
    (Context::Feed, KeySpec::ch('s'), Action::CycleSort),
    (Context::Feed, KeySpec::ch('r'), Action::Refresh),
    (Context::Feed, KeySpec::ch('p'), Action::PinCurrent),
    (Context::Feed, KeySpec::ch('+'), Action::Subscribe),
    (Context::Feed, KeySpec::ch('-'), Action::Unsubscribe),
    (Context::Feed, KeySpec::ch('o'), Action::OpenInBrowser),
    (Context::Feed, KeySpec::ch('c'), Action::OpenComments),
    (Context::Feed, KeySpec::ch('m'), Action::LoadMore),
    (Context::Feed, KeySpec::ctrl('d'), Action::LoadMore),
    // Sidebar (search field has focus)
    (Context::Sidebar, KeySpec::plain(KeyCode::Down), Action::NavDown),
    (Context::Sidebar, KeySpec::plain(KeyCode::Up), Action::NavUp),
    (Context::Sidebar, KeySpec::plain(KeyCode::Enter), Action::Select),
    (Context::Sidebar, KeySpec::plain(KeyCode::Esc), Action::Back),
    (Context::Sidebar, KeySpec::plain(KeyCode::Tab), Action::ToggleSidebar),
    // Prompt
    (Context::Prompt, KeySpec::plain(KeyCode::Enter), Action::Confirm),
    (Context::Prompt, KeySpec::plain(KeyCode::Esc), Action::Cancel),
    // Offline
    (Context::Offline, KeySpec::ch('r'), Action::RetryOnline),
    (Context::Offline, KeySpec::plain(KeyCode::Enter), Action::RetryOnline),
];

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        for &(context, key, action) in DEFAULT_BINDINGS {
            registry.bind(context, key, action);
        }
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    /// Apply user overrides from the config keybindings map.
    ///
    /// Keys in the map are action names ("quit", "next_page"); values are key
    /// strings ("q", "Ctrl+d", "F5"). The new key replaces the action's
    /// default in every context it was bound in.
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a key in a context.
    ///
    /// Tries the specific context first, then falls back to Global unless the
    /// context takes typed text.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global && !context.takes_text() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// Keys bound to `action` in `context`, formatted for display.
    pub fn keys_for(&self, context: Context, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(c, _, a)| *c == context && *a == action)
            .map(|(_, key, _)| format_key(key))
            .collect()
    }

    /// All bindings for the help screen as (context, key, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action.
fn parse_action_name(name: &str) -> Option<Action> {
    let action = match name.to_lowercase().replace('-', "_").as_str() {
        "quit" => Action::Quit,
        "nav_down" | "down" => Action::NavDown,
        "nav_up" | "up" => Action::NavUp,
        "next_page" | "next" => Action::NextPage,
        "prev_page" | "previous_page" | "prev" => Action::PrevPage,
        "select" => Action::Select,
        "back" => Action::Back,
        "toggle_sidebar" | "sidebar" | "drawer" => Action::ToggleSidebar,
        "sidebar_search" | "search" => Action::SidebarSearch,
        "go_to_subreddit" | "goto" => Action::GoToSubreddit,
        "go_to_user" | "user" => Action::GoToUser,
        "cycle_sort" | "sort" => Action::CycleSort,
        "switch_account" | "account" => Action::SwitchAccount,
        "cycle_theme" | "theme" => Action::CycleTheme,
        "toggle_list_bar" | "list_bar" => Action::ToggleListBar,
        "refresh" => Action::Refresh,
        "restart" => Action::Restart,
        "pin" | "pin_current" => Action::PinCurrent,
        "subscribe" => Action::Subscribe,
        "unsubscribe" => Action::Unsubscribe,
        "open_in_browser" | "open" => Action::OpenInBrowser,
        "open_comments" | "comments" => Action::OpenComments,
        "load_more" | "more" => Action::LoadMore,
        "retry_online" | "retry" => Action::RetryOnline,
        "show_help" | "help" => Action::ShowHelp,
        "confirm" => Action::Confirm,
        "cancel" => Action::Cancel,
        _ => return None,
    };
    Some(action)
}

// ============================================================================
// Tests
// ============================================================================
