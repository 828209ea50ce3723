//! Offline overview: the front page's subreddits, shown when the
//! reachability check fails.

use crate::app::App;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::help::centered_rect;

pub fn render(f: &mut Frame, app: &App, subs: &[String]) {
    let overlay = centered_rect(60, 60, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }
    f.render_widget(Clear, overlay);

    let mut lines = vec![
        Line::from(Span::styled("You are offline", app.style("overlay_heading"))),
        Line::from(""),
    ];
    if subs.is_empty() {
        lines.push(Line::from("No subscriptions"));
    }
    lines.extend(subs.iter().map(|name| Line::from(format!("  r/{}", name))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "r: retry · Esc: dismiss",
        app.style("post_meta"),
    )));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .style(app.style("overlay_body"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("toolbar_offline"))
                .title(" Offline "),
        );
    f.render_widget(body, overlay);
}
