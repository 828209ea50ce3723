use crate::app::App;
use crate::reddit::{FeedStatus, Post, RedditFeed};
use crate::screen::ports::FeedScreen;
use crate::util::{compact_count, strip_control_chars, truncate_to_width};
use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

fn post_item<'a>(app: &App, post: &'a Post, width: usize) -> ListItem<'a> {
    let mut title_spans = Vec::new();
    if post.stickied {
        title_spans.push(Span::styled("▲ ", app.style("post_stickied")));
    }
    if post.nsfw {
        title_spans.push(Span::styled("nsfw ", app.style("post_nsfw")));
    }
    let title = strip_control_chars(&post.title);
    title_spans.push(Span::styled(
        truncate_to_width(&title, width.saturating_sub(6)).into_owned(),
        app.style("post_title"),
    ));

    let meta = format!(
        "  {} pts · {} comments · u/{} · r/{} · {}",
        compact_count(post.score),
        compact_count(i64::try_from(post.num_comments).unwrap_or(i64::MAX)),
        post.author,
        post.subreddit,
        post.age(Utc::now()),
    );
    let meta = Line::from(Span::styled(
        truncate_to_width(&meta, width).into_owned(),
        app.style("post_meta"),
    ));

    ListItem::new(vec![Line::from(title_spans), meta])
}

/// Render one feed: its posts, or its load state when there are none.
pub fn render(f: &mut Frame, app: &App, feed: &RedditFeed, area: Rect) {
    if area.width < 4 || area.height < 3 {
        return;
    }

    let title = format!(" r/{} · {} ", feed.subreddit(), feed.sort().as_str());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(feed.accent()))
        .title(title);

    if feed.posts().is_empty() {
        let text = match feed.status() {
            FeedStatus::Idle => "Not loaded".to_string(),
            FeedStatus::Loading => "Loading…".to_string(),
            FeedStatus::Loaded => "No posts".to_string(),
            FeedStatus::Failed(e) => format!("Failed to load: {}", e),
        };
        f.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let mut items: Vec<ListItem> = feed
        .posts()
        .iter()
        .map(|post| post_item(app, post, width))
        .collect();
    if feed.has_more() {
        let hint = if *feed.status() == FeedStatus::Loading {
            "Loading more…"
        } else {
            "[m] load more"
        };
        items.push(ListItem::new(Span::styled(hint, app.style("post_meta"))));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(app.style("post_selected"));
    let mut state = ListState::default().with_selected(Some(feed.selected()));
    f.render_stateful_widget(list, area, &mut state);
}
