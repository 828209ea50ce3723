//! Keyboard input handling.
//!
//! Keys resolve to an [`KbAction`] through the registry for the app's current
//! context. Unbound printable keys are typed text in the prompt and sidebar.

use crate::app::{App, PromptKind};
use crate::keybindings::{Action as KbAction, Context};
use crossterm::event::{KeyCode, KeyModifiers};

use super::loop_runner::Action;

/// Dispatch one key press.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if app.show_help {
        return handle_help_input(app, code);
    }

    let context = app.context();
    let action = app.keybindings.action_for_key(code, modifiers, context);

    match context {
        Context::Prompt => handle_prompt(app, code, action),
        Context::Sidebar => handle_sidebar(app, code, action),
        Context::Offline => handle_offline(app, action),
        Context::Feed | Context::Global => handle_feed(app, code, action),
    }
}

fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        _ => {}
    }
    Action::Continue
}

fn handle_prompt(app: &mut App, code: KeyCode, action: Option<KbAction>) -> Action {
    match (action, code) {
        (Some(KbAction::Confirm), _) => app.confirm_prompt(),
        (Some(KbAction::Cancel), _) => app.prompt = None,
        (_, KeyCode::Backspace) => app.prompt_pop(),
        (_, KeyCode::Char(c)) => app.prompt_push(c),
        _ => {}
    }
    Action::Continue
}

fn handle_sidebar(app: &mut App, code: KeyCode, action: Option<KbAction>) -> Action {
    match (action, code) {
        (Some(KbAction::NavDown), _) => app.sidebar_move(1),
        (Some(KbAction::NavUp), _) => app.sidebar_move(-1),
        (Some(KbAction::Select), _) => app.sidebar_select(),
        (Some(KbAction::Back), _) | (Some(KbAction::ToggleSidebar), _) => {
            app.screen.chrome_mut().dismiss_sidebar();
        }
        (_, KeyCode::Backspace) => {
            if let Some(sidebar) = app.screen.chrome_mut().sidebar.as_mut() {
                sidebar.pop_search();
            }
        }
        (_, KeyCode::Char(c)) => {
            if let Some(sidebar) = app.screen.chrome_mut().sidebar.as_mut() {
                sidebar.push_search(c);
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_offline(app: &mut App, action: Option<KbAction>) -> Action {
    match action {
        Some(KbAction::RetryOnline) => app.retry_online(),
        Some(KbAction::Back) => app.offline_overview = None,
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::ShowHelp) => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

fn handle_feed(app: &mut App, code: KeyCode, action: Option<KbAction>) -> Action {
    let Some(action) = action else {
        // 1-9 jump straight to a tab
        if let KeyCode::Char(c @ '1'..='9') = code {
            let index = c as usize - '1' as usize;
            app.detached = None;
            app.screen.select_tab(index);
        }
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::ShowHelp => app.show_help = true,
        KbAction::NavDown => app.select_next_post(),
        KbAction::NavUp => app.select_prev_post(),
        KbAction::NextPage => app.swipe(1),
        KbAction::PrevPage => app.swipe(-1),
        KbAction::Select | KbAction::OpenInBrowser => app.open_selected_link(),
        KbAction::OpenComments => app.open_selected_comments(),
        KbAction::Back => {
            if !app.close_detached() {
                app.screen.chrome_mut().dismiss_sidebar();
            }
        }
        KbAction::ToggleSidebar => app.toggle_sidebar(),
        KbAction::SidebarSearch => app.screen.show_drawer(),
        KbAction::GoToSubreddit => app.open_prompt(PromptKind::GoToSubreddit),
        KbAction::GoToUser => app.open_prompt(PromptKind::GoToUser),
        KbAction::CycleSort => app.cycle_sort(),
        KbAction::SwitchAccount => app.switch_account(),
        KbAction::CycleTheme => app.cycle_theme(),
        KbAction::ToggleListBar => app.toggle_list_bar(),
        KbAction::Refresh => app.refresh(),
        KbAction::Restart => app.hard_reset(),
        KbAction::PinCurrent => app.toggle_pin(),
        KbAction::Subscribe => app.subscribe(),
        KbAction::Unsubscribe => app.unsubscribe(),
        KbAction::LoadMore => app.load_more(),
        KbAction::RetryOnline => app.retry_online(),
        KbAction::Confirm | KbAction::Cancel => {}
    }
    Action::Continue
}
