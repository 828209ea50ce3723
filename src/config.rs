//! Configuration file parser for ~/.config/slide/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings so typos are
//! visible in the log file.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// How the front page is hosted: a single full-width column or the
/// sidebar-beside-content split layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    #[default]
    Single,
    Split,
}

/// Optional night theme window. Hours are local, 0-23; a window whose start is
/// after its end wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NightConfig {
    pub enabled: bool,
    pub theme: String,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for NightConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            theme: "dark".to_string(),
            start_hour: 21,
            end_hour: 7,
        }
    }
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Day theme variant name ("dark" or "light").
    pub theme: String,

    /// Night theme schedule.
    pub night: NightConfig,

    /// Show the subreddit tab bar and allow swiping between pages.
    pub list_bar: bool,

    /// Use the background color instead of per-subreddit colors for chrome.
    pub reduce_color: bool,

    /// Never paint the header strip.
    pub fully_hide_header: bool,

    pub app_mode: AppMode,

    /// Subscribed subreddit names.
    pub subscriptions: Vec<String>,

    /// Ordered subset of subscriptions shown first.
    pub pinned: Vec<String>,

    /// Listing sort used when a feed loads ("hot", "new", "top", "rising").
    pub sort: String,

    /// Number of off-screen feeds kept alive (and loaded) by the pager.
    pub page_cache_size: usize,

    /// Active account name, shown on the account button.
    pub account: Option<String>,

    /// Accounts available for switching.
    pub accounts: Vec<String>,

    /// host:port used by the reachability probe.
    pub reachability_host: String,

    pub user_agent: String,

    /// Per-subreddit header colors, "#rrggbb".
    pub colors: HashMap<String, String>,

    /// Per-subreddit accent colors, "#rrggbb".
    pub accents: HashMap<String, String>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            night: NightConfig::default(),
            list_bar: true,
            reduce_color: false,
            fully_hide_header: false,
            app_mode: AppMode::Single,
            subscriptions: vec![
                "frontpage".to_string(),
                "all".to_string(),
                "popular".to_string(),
            ],
            pinned: vec!["frontpage".to_string(), "all".to_string()],
            sort: "hot".to_string(),
            page_cache_size: 8,
            account: None,
            accounts: Vec::new(),
            reachability_host: "www.reddit.com:443".to_string(),
            user_agent: concat!("slide/", env!("CARGO_PKG_VERSION")).to_string(),
            colors: HashMap::new(),
            accents: HashMap::new(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 17] = [
        "theme",
        "night",
        "list_bar",
        "reduce_color",
        "fully_hide_header",
        "app_mode",
        "subscriptions",
        "pinned",
        "sort",
        "page_cache_size",
        "account",
        "accounts",
        "reachability_host",
        "user_agent",
        "colors",
        "accents",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(content)?;
        if config.page_cache_size == 0 {
            tracing::warn!("page_cache_size must be at least 1, using 1");
            config.page_cache_size = 1;
        }
        tracing::info!(
            theme = %config.theme,
            subscriptions = config.subscriptions.len(),
            pinned = config.pinned.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("slide_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "dark");
        assert!(config.list_bar);
        assert!(!config.reduce_color);
        assert_eq!(config.app_mode, AppMode::Single);
        assert_eq!(config.pinned, vec!["frontpage", "all"]);
        assert_eq!(config.page_cache_size, 8);
        assert!(!config.night.enabled);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/slide_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = temp_config("whitespace", "   \n  \n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.sort, "hot");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r##"
theme = "light"
list_bar = false
reduce_color = true
fully_hide_header = true
app_mode = "split"
subscriptions = ["pics", "aww", "rust"]
pinned = ["rust"]
sort = "new"
page_cache_size = 3
account = "spez"
accounts = ["spez", "kn0thing"]

[night]
enabled = true
theme = "dark"
start_hour = 22
end_hour = 6

[colors]
rust = "#b7410e"

[keybindings]
quit = "Ctrl+q"
"##;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.theme, "light");
        assert!(!config.list_bar);
        assert!(config.reduce_color);
        assert!(config.fully_hide_header);
        assert_eq!(config.app_mode, AppMode::Split);
        assert_eq!(config.subscriptions.len(), 3);
        assert_eq!(config.pinned, vec!["rust"]);
        assert_eq!(config.sort, "new");
        assert_eq!(config.page_cache_size, 3);
        assert_eq!(config.account.as_deref(), Some("spez"));
        assert!(config.night.enabled);
        assert_eq!(config.night.start_hour, 22);
        assert_eq!(config.colors.get("rust").map(String::as_str), Some("#b7410e"));
        assert_eq!(
            config.keybindings.get("quit").map(String::as_str),
            Some("Ctrl+q")
        );
    }

    #[test]
    fn test_partial_night_table_uses_defaults() {
        let config = Config::parse("[night]\nenabled = true\n").unwrap();
        assert!(config.night.enabled);
        assert_eq!(config.night.start_hour, 21);
        assert_eq!(config.night.end_hour, 7);
    }

    #[test]
    fn test_zero_cache_size_clamped() {
        let config = Config::parse("page_cache_size = 0\n").unwrap();
        assert_eq!(config.page_cache_size, 1);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_app_mode_rejected() {
        assert!(Config::parse("app_mode = \"triple\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("theme = \"dark\"\nmystery = 42\n").unwrap();
        assert_eq!(config.theme, "dark");
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = temp_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
