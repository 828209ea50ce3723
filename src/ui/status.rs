use crate::app::App;
use crate::keybindings::Context;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some(prompt) = &app.prompt {
        Cow::Owned(format!("{}{}_", prompt.kind.label(), prompt.input))
    } else if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg)
    } else {
        match app.context() {
            Context::Sidebar => Cow::Borrowed("Type to filter | ↑/↓ move | ENTER go | ESC close"),
            Context::Offline => Cow::Borrowed("[r]etry connection [Esc]dismiss [q]uit"),
            _ => Cow::Borrowed(
                "[h/l]page [j/k]move [o]pen [c]omments [s]ort [g]oto [Tab]sidebar [?]help [q]uit",
            ),
        }
    };

    f.render_widget(Paragraph::new(text).style(app.style("status_bar")), area);
}
