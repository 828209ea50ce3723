//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values, the
//! per-subreddit header/accent colors used to tint chrome, and the day/night
//! schedule that decides which variant should be active.

use crate::config::{Config, NightConfig};
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Base colors plus a `Style` for every semantic UI role.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    pub background: Color,
    pub foreground: Color,
    /// Default header color for subreddits without a configured color.
    pub base: Color,
    /// Default accent for tab highlights.
    pub accent: Color,
    /// Toolbar color: the foreground shifted slightly toward contrast.
    pub toolbar: Color,

    // -- Tab bar --
    pub tab_active: Style,
    pub tab_inactive: Style,

    // -- Feed --
    pub post_title: Style,
    pub post_meta: Style,
    pub post_selected: Style,
    pub post_stickied: Style,
    pub post_nsfw: Style,

    // -- Sidebar --
    pub sidebar_item: Style,
    pub sidebar_selected: Style,
    pub sidebar_search: Style,

    // -- Chrome --
    pub header_text: Style,
    pub toolbar_button: Style,
    pub toolbar_offline: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub overlay_body: Style,
    pub overlay_heading: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            background: Color::Black,
            foreground: Color::Rgb(0x21, 0x21, 0x21),
            base: Color::Rgb(0x30, 0x30, 0x30),
            accent: Color::Rgb(0xff, 0x45, 0x00),
            toolbar: Color::Rgb(0x2e, 0x2e, 0x2e),

            tab_active: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            post_title: Style::default().add_modifier(Modifier::BOLD),
            post_meta: Style::default().fg(Color::DarkGray),
            post_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            post_stickied: Style::default().fg(Color::Green),
            post_nsfw: Style::default().fg(Color::Red),

            sidebar_item: Style::default(),
            sidebar_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            sidebar_search: Style::default().fg(Color::Yellow),

            header_text: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            toolbar_button: Style::default().fg(Color::White),
            toolbar_offline: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            overlay_body: Style::default(),
            overlay_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            background: Color::White,
            foreground: Color::Rgb(0xf5, 0xf5, 0xf5),
            base: Color::Rgb(0xe0, 0xe0, 0xe0),
            accent: Color::Rgb(0x00, 0x79, 0xd3),
            toolbar: Color::Rgb(0xe8, 0xe8, 0xe8),

            tab_active: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            post_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            post_meta: Style::default().fg(Color::DarkGray),
            post_selected: Style::default().bg(Color::Blue).fg(Color::White),
            post_stickied: Style::default().fg(Color::Green),
            post_nsfw: Style::default().fg(Color::Red),

            sidebar_item: Style::default().fg(Color::Black),
            sidebar_selected: Style::default().bg(Color::Blue).fg(Color::White),
            sidebar_search: Style::default().fg(Color::Magenta),

            header_text: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            toolbar_button: Style::default().fg(Color::Black),
            toolbar_offline: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            overlay_body: Style::default().fg(Color::Black),
            overlay_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup so widgets can resolve roles by name.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 19] = [
    "tab_active",
    "tab_inactive",
    "post_title",
    "post_meta",
    "post_selected",
    "post_stickied",
    "post_nsfw",
    "sidebar_item",
    "sidebar_selected",
    "sidebar_search",
    "header_text",
    "toolbar_button",
    "toolbar_offline",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "overlay_body",
    "overlay_heading",
    "toolbar",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 19] = [
            p.tab_active,
            p.tab_inactive,
            p.post_title,
            p.post_meta,
            p.post_selected,
            p.post_stickied,
            p.post_nsfw,
            p.sidebar_item,
            p.sidebar_selected,
            p.sidebar_search,
            p.header_text,
            p.toolbar_button,
            p.toolbar_offline,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.overlay_body,
            p.overlay_heading,
            Style::default().bg(p.toolbar),
        ];

        let map = ROLE_NAMES
            .iter()
            .zip(styles.iter())
            .map(|(name, style)| (*name, *style))
            .collect();

        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Theme Snapshot
// ============================================================================

/// The two colors the pager blends between while a page transition runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSnapshot {
    pub primary: Color,
    pub secondary: Color,
}

// ============================================================================
// Theme
// ============================================================================

/// Active theme: variant, palette, resolved styles and subreddit colors.
#[derive(Debug, Clone)]
pub struct Theme {
    variant: ThemeVariant,
    palette: ColorPalette,
    styles: StyleMap,
    sub_colors: HashMap<String, Color>,
    sub_accents: HashMap<String, Color>,
}

impl Theme {
    pub fn new(variant: ThemeVariant) -> Self {
        let palette = variant.palette();
        Self {
            variant,
            styles: StyleMap::from_palette(&palette),
            palette,
            sub_colors: HashMap::new(),
            sub_accents: HashMap::new(),
        }
    }

    /// Build the day theme and subreddit colors from config. Invalid color
    /// strings are logged and skipped.
    pub fn from_config(config: &Config) -> Self {
        let variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });
        let mut theme = Self::new(variant);
        theme.sub_colors = parse_color_map(&config.colors, "colors");
        theme.sub_accents = parse_color_map(&config.accents, "accents");
        theme
    }

    pub fn variant(&self) -> ThemeVariant {
        self.variant
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    pub fn set_variant(&mut self, variant: ThemeVariant) {
        self.variant = variant;
        self.palette = variant.palette();
        self.styles = StyleMap::from_palette(&self.palette);
    }

    pub fn style(&self, role: &str) -> Style {
        self.styles.resolve(role)
    }

    pub fn background(&self) -> Color {
        self.palette.background
    }

    pub fn foreground(&self) -> Color {
        self.palette.foreground
    }

    pub fn base_color(&self) -> Color {
        self.palette.base
    }

    pub fn toolbar_color(&self) -> Color {
        self.palette.toolbar
    }

    /// Header color for a subreddit; falls back to the palette base color.
    pub fn color_for_sub(&self, sub: &str) -> Color {
        self.sub_colors
            .get(&sub.to_lowercase())
            .copied()
            .unwrap_or(self.palette.base)
    }

    /// Accent for a subreddit: configured accent, then configured header
    /// color, then the palette accent.
    pub fn accent_for_sub(&self, sub: &str) -> Color {
        let key = sub.to_lowercase();
        self.sub_accents
            .get(&key)
            .or_else(|| self.sub_colors.get(&key))
            .copied()
            .unwrap_or(self.palette.accent)
    }

    pub fn set_sub_color(&mut self, sub: &str, color: Color) {
        self.sub_colors.insert(sub.to_lowercase(), color);
    }
}

fn parse_color_map(raw: &HashMap<String, String>, table: &str) -> HashMap<String, Color> {
    raw.iter()
        .filter_map(|(sub, value)| match parse_hex_color(value) {
            Some(color) => Some((sub.to_lowercase(), color)),
            None => {
                tracing::warn!(table, subreddit = %sub, value = %value, "Invalid color, ignoring");
                None
            }
        })
        .collect()
}

/// Parse "#rrggbb" (the leading '#' is optional).
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

// ============================================================================
// Day / Night Schedule
// ============================================================================

/// Decides which variant should be active at a given local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeSchedule {
    day: ThemeVariant,
    night: Option<NightWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NightWindow {
    variant: ThemeVariant,
    start_hour: u32,
    end_hour: u32,
}

impl ThemeSchedule {
    pub fn fixed(day: ThemeVariant) -> Self {
        Self { day, night: None }
    }

    pub fn from_config(day: ThemeVariant, night: &NightConfig) -> Self {
        let night = night.enabled.then(|| NightWindow {
            variant: ThemeVariant::from_str_name(&night.theme).unwrap_or(ThemeVariant::Dark),
            start_hour: night.start_hour % 24,
            end_hour: night.end_hour % 24,
        });
        Self { day, night }
    }

    /// Change the day variant (user cycled the theme).
    pub fn set_day(&mut self, day: ThemeVariant) {
        self.day = day;
    }

    pub fn is_night(&self, hour: u32) -> bool {
        let Some(night) = self.night else {
            return false;
        };
        let hour = hour % 24;
        if night.start_hour == night.end_hour {
            false
        } else if night.start_hour < night.end_hour {
            (night.start_hour..night.end_hour).contains(&hour)
        } else {
            hour >= night.start_hour || hour < night.end_hour
        }
    }

    pub fn desired(&self, hour: u32) -> ThemeVariant {
        match self.night {
            Some(night) if self.is_night(hour) => night.variant,
            _ => self.day,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_palette_selection_style() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.post_selected,
            Style::default().bg(Color::DarkGray).fg(Color::White)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.post_selected, light.post_selected);
        assert_ne!(dark.background, light.background);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("DARK"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = StyleMap::from_palette(&ThemeVariant::Dark.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn parse_hex_color_accepts_with_and_without_hash() {
        assert_eq!(parse_hex_color("#ff4500"), Some(Color::Rgb(0xff, 0x45, 0x00)));
        assert_eq!(parse_hex_color("00ff00"), Some(Color::Rgb(0, 0xff, 0)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn sub_colors_are_case_insensitive_and_fall_back() {
        let mut config = Config::default();
        config.colors.insert("Rust".to_string(), "#b7410e".to_string());
        config.colors.insert("broken".to_string(), "red".to_string());
        let theme = Theme::from_config(&config);

        assert_eq!(theme.color_for_sub("rust"), Color::Rgb(0xb7, 0x41, 0x0e));
        assert_eq!(theme.color_for_sub("RUST"), Color::Rgb(0xb7, 0x41, 0x0e));
        assert_eq!(theme.color_for_sub("broken"), theme.base_color());
        // accent falls back to the header color before the palette accent
        assert_eq!(theme.accent_for_sub("rust"), Color::Rgb(0xb7, 0x41, 0x0e));
        assert_eq!(theme.accent_for_sub("pics"), theme.palette().accent);
    }

    #[test]
    fn set_variant_rebuilds_styles() {
        let mut theme = Theme::new(ThemeVariant::Dark);
        let before = theme.style("post_selected");
        theme.set_variant(ThemeVariant::Light);
        assert_eq!(theme.variant(), ThemeVariant::Light);
        assert_ne!(theme.style("post_selected"), before);
    }

    #[test]
    fn schedule_without_night_is_fixed() {
        let schedule = ThemeSchedule::fixed(ThemeVariant::Light);
        assert_eq!(schedule.desired(23), ThemeVariant::Light);
        assert!(!schedule.is_night(2));
    }

    #[test]
    fn schedule_wraps_past_midnight() {
        let night = NightConfig {
            enabled: true,
            theme: "dark".to_string(),
            start_hour: 21,
            end_hour: 7,
        };
        let schedule = ThemeSchedule::from_config(ThemeVariant::Light, &night);
        assert_eq!(schedule.desired(22), ThemeVariant::Dark);
        assert_eq!(schedule.desired(3), ThemeVariant::Dark);
        assert_eq!(schedule.desired(7), ThemeVariant::Light);
        assert_eq!(schedule.desired(12), ThemeVariant::Light);
    }

    #[test]
    fn schedule_same_day_window() {
        let night = NightConfig {
            enabled: true,
            theme: "dark".to_string(),
            start_hour: 1,
            end_hour: 5,
        };
        let schedule = ThemeSchedule::from_config(ThemeVariant::Light, &night);
        assert!(schedule.is_night(1));
        assert!(schedule.is_night(4));
        assert!(!schedule.is_night(5));
        assert!(!schedule.is_night(0));
    }
}
