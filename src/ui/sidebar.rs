use crate::app::App;
use crate::chrome::Sidebar;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Collapsed strip: current subreddit plus the sidebar's toolbar buttons.
pub fn render_strip(f: &mut Frame, app: &App, sidebar: &Sidebar, area: Rect) {
    if area.height < 1 {
        return;
    }
    let mut spans = vec![Span::styled(
        format!(" r/{} ", sidebar.subreddit()),
        Style::default().fg(sidebar.accent).bg(sidebar.toolbar_bg),
    )];
    for button in &sidebar.toolbar {
        spans.push(Span::styled(
            format!(" [{}]", button.label()),
            app.style("toolbar_button"),
        ));
    }
    let strip = Paragraph::new(Line::from(spans)).style(Style::default().bg(sidebar.toolbar_bg));
    f.render_widget(strip, area);
}

/// Expanded panel: search field over the filtered subreddit list.
pub fn render_panel(f: &mut Frame, app: &App, sidebar: &Sidebar, area: Rect) {
    if area.width < 8 || area.height < 4 {
        return;
    }
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(sidebar.accent))
        .title(" Subreddits ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let search = Paragraph::new(format!("/{}_", sidebar.search())).style(app.style("sidebar_search"));
    f.render_widget(search, rows[0]);

    let matches = sidebar.matches(app.screen.subs());
    let items: Vec<ListItem> = if matches.is_empty() {
        let hint = if sidebar.search().trim().is_empty() {
            "No subscriptions".to_string()
        } else {
            format!("Enter: go to r/{}", sidebar.search().trim())
        };
        vec![ListItem::new(hint)]
    } else {
        matches
            .iter()
            .map(|name| ListItem::new(format!("r/{}", name)).style(app.style("sidebar_item")))
            .collect()
    };

    let list = List::new(items).highlight_style(app.style("sidebar_selected"));
    let selected = (!matches.is_empty()).then_some(sidebar.cursor());
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, rows[1], &mut state);
}
