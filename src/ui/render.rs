//! Render functions for the TUI.
//!
//! Lays out the front page top to bottom: header strip, tab bar, feed (with
//! the sidebar docked beside it or overlaid on it), toolbar and status bar.

use crate::app::App;
use crate::chrome::ToolbarButton;
use crate::screen::ports::FeedScreen;
use crate::util::display_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};

use super::{feed, help, offline, sidebar, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Sidebar panel width when docked or expanded.
const SIDEBAR_WIDTH: u16 = 28;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chrome = app.screen.chrome();
    f.render_widget(
        Paragraph::new("").style(Style::default().bg(chrome.background)),
        area,
    );

    let tabs_height = u16::from(chrome.tab_bar.is_some() && app.detached.is_none());
    let toolbar_height = u16::from(!chrome.bottom_toolbar.is_empty());
    let strip_height = u16::from(chrome.sidebar.as_ref().is_some_and(|s| s.visible));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(tabs_height),
            Constraint::Min(0),
            Constraint::Length(strip_height),
            Constraint::Length(toolbar_height),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, rows[0]);
    render_tabs(f, app, rows[1]);
    render_body(f, app, rows[2]);
    if let Some(bar) = chrome.sidebar.as_ref().filter(|s| s.visible) {
        sidebar::render_strip(f, app, bar, rows[3]);
    }
    render_toolbar(f, app, &chrome.bottom_toolbar, rows[4]);
    status::render(f, app, rows[5]);

    if let Some(subs) = &app.offline_overview {
        offline::render(f, app, subs);
    }
    if app.show_help {
        help::render(f, app);
    }
}

/// Title on the header color, nav items on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let chrome = app.screen.chrome();
    let title = match &app.detached {
        Some(feed) => format!(" r/{} (not subscribed)", feed.subreddit()),
        None if app.screen.current_title().is_empty() => " slide".to_string(),
        None => format!(" r/{}", app.screen.current_title()),
    };

    let nav: Vec<String> = chrome
        .nav_items
        .iter()
        .map(|button| match button {
            ToolbarButton::Sort => app
                .active_feed()
                .map(|feed| feed.sort().as_str().to_string())
                .unwrap_or_else(|| button.label().to_string()),
            other => other.label().to_string(),
        })
        .collect();
    let nav = format!("{} ", nav.join(" · "));

    // A hidden header (resize, fully-hidden setting) blends into the page and
    // keeps only the tinted text.
    let style = match chrome.header {
        Some(bg) => app.style("header_text").bg(bg),
        None => app
            .style("header_text")
            .bg(app.screen.snapshot().primary)
            .fg(chrome.nav_bar_tint),
    };
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(display_width(&nav) as u16)])
        .split(area);
    f.render_widget(Paragraph::new(title).style(style), cols[0]);
    f.render_widget(
        Paragraph::new(nav).style(style).alignment(Alignment::Right),
        cols[1],
    );
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let Some(bar) = &app.screen.chrome().tab_bar else {
        return;
    };
    let snapshot = app.screen.snapshot();
    let titles: Vec<Line> = bar
        .items
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i < 9 {
                Line::from(format!("{} {}", i + 1, name))
            } else {
                Line::from(name.as_str())
            }
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(bar.selected)
        .style(app.style("tab_inactive").bg(snapshot.primary))
        .highlight_style(
            app.style("tab_active")
                .fg(bar.tint)
                .add_modifier(Modifier::UNDERLINED),
        )
        .divider(Span::styled("|", Style::default().fg(snapshot.secondary)));
    f.render_widget(tabs, area);
}

fn render_body(f: &mut Frame, app: &App, area: Rect) {
    let chrome = app.screen.chrome();
    let panel = chrome
        .sidebar
        .as_ref()
        .filter(|s| s.visible && (s.expanded || s.docked));

    let (feed_area, panel_area) = match panel {
        Some(bar) if bar.docked && area.width > SIDEBAR_WIDTH * 2 => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .split(area);
            (cols[1], Some(cols[0]))
        }
        Some(_) => {
            let width = SIDEBAR_WIDTH.min(area.width);
            (area, Some(Rect { width, ..area }))
        }
        None => (area, None),
    };

    match app.active_feed() {
        Some(current) => feed::render(f, app, current, feed_area),
        None => {
            let msg = Paragraph::new("No subreddits. Press g to open one.")
                .alignment(Alignment::Center)
                .style(app.style("post_meta"));
            f.render_widget(msg, feed_area);
        }
    }

    if let (Some(bar), Some(rect)) = (panel, panel_area) {
        sidebar::render_panel(f, app, bar, rect);
    }
}

fn render_toolbar(f: &mut Frame, app: &App, buttons: &[ToolbarButton], area: Rect) {
    if area.height == 0 || buttons.is_empty() {
        return;
    }
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut past_space = false;
    for button in buttons {
        let style = match button {
            ToolbarButton::Offline => app.style("toolbar_offline"),
            _ => app.style("toolbar_button"),
        };
        match button {
            ToolbarButton::FlexibleSpace => past_space = true,
            _ if past_space => right.push(Span::styled(format!(" [{}]", button.label()), style)),
            _ => left.push(Span::styled(format!(" [{}]", button.label()), style)),
        }
    }
    let right_width: usize = right.iter().map(|span| display_width(&span.content)).sum();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(right_width as u16)])
        .split(area);
    let bg = Style::default().bg(app.screen.chrome().toolbar_bg);
    f.render_widget(Paragraph::new(Line::from(left)).style(bg), cols[0]);
    f.render_widget(Paragraph::new(Line::from(right)).style(bg), cols[1]);
}
