use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::Input;

use crate::app::{AppState, PaletteCommand, UiMode};

/// Handle a key event and update app state accordingly.
///
/// While an overlay is open only that overlay sees keys; the global
/// shortcuts below are unreachable until it is dismissed.
pub fn handle_key(state: &mut AppState, key: KeyEvent, page_size: usize) {
    // Ctrl+C quits from anywhere, overlays included
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return;
    }

    match state.mode {
        UiMode::Normal => handle_normal_mode(state, key, page_size),
        UiMode::FilterPrompt(_) => handle_filter_prompt(state, key),
        UiMode::BookmarkList(_) => handle_bookmark_list(state, key),
        UiMode::CommandPalette(_) => handle_palette(state, key),
        UiMode::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Char('?')
            ) {
                state.close_overlay();
            }
        }
        UiMode::ExportView(_) => handle_export_view(state, key, page_size),
    }
}

fn handle_normal_mode(state: &mut AppState, key: KeyEvent, page_size: usize) {
    match key.code {
        // Quit
        KeyCode::Char('q') => {
            state.should_quit = true;
        }

        KeyCode::Char('h') | KeyCode::Char('?') => state.open_help(),
        KeyCode::Char('s') => state.toggle_auto_scroll(),
        KeyCode::Char('c') => state.clear_focused_view(),
        KeyCode::Char('/') => state.open_filter_prompt(false),
        KeyCode::Char('b') => state.bookmark_latest(),
        KeyCode::Char('B') => state.open_bookmark_list(),
        KeyCode::Char('p') => state.toggle_pause(),
        KeyCode::Char(':') => state.open_palette(),

        // Pages and focus
        KeyCode::Char('[') => state.go_to_page(-1),
        KeyCode::Char(']') => state.go_to_page(1),
        KeyCode::Tab => state.shift_focus(1),
        KeyCode::BackTab => state.shift_focus(-1),

        // Scrolling the focused panel
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(panel) = state.focused_panel_mut() {
                panel.scroll_up(1, page_size);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(panel) = state.focused_panel_mut() {
                panel.scroll_down(1, page_size);
            }
        }
        KeyCode::PageUp => {
            if let Some(panel) = state.focused_panel_mut() {
                panel.scroll_up(page_size, page_size);
            }
        }
        KeyCode::PageDown => {
            if let Some(panel) = state.focused_panel_mut() {
                panel.scroll_down(page_size, page_size);
            }
        }
        KeyCode::Char('g') => {
            if let Some(panel) = state.focused_panel_mut() {
                panel.scroll_to_top();
            }
        }
        KeyCode::Char('G') => {
            if let Some(panel) = state.focused_panel_mut() {
                panel.detached = false;
                panel.scroll_to_end();
            }
        }

        KeyCode::Esc => {
            state.status_message = None;
        }

        _ => {}
    }
}

fn handle_filter_prompt(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => state.submit_filter(),
        KeyCode::Esc => state.close_overlay(),
        _ => {
            if let UiMode::FilterPrompt(prompt) = &mut state.mode {
                // Forward all other keys to the textarea
                if prompt.textarea.input(Input::from(key)) {
                    prompt.error = None;
                }
            }
        }
    }
}

fn handle_bookmark_list(state: &mut AppState, key: KeyEvent) {
    let UiMode::BookmarkList(list) = &mut state.mode else {
        return;
    };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            list.selected = (list.selected + 1).min(list.row_count() - 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            list.selected = list.selected.saturating_sub(1);
        }
        KeyCode::Enter => state.select_bookmark(),
        KeyCode::Esc | KeyCode::Char('q') => state.close_overlay(),
        _ => {}
    }
}

fn handle_palette(state: &mut AppState, key: KeyEvent) {
    let UiMode::CommandPalette(palette) = &mut state.mode else {
        return;
    };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => {
            palette.selected = (palette.selected + 1) % PaletteCommand::ALL.len();
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => {
            palette.selected =
                (palette.selected + PaletteCommand::ALL.len() - 1) % PaletteCommand::ALL.len();
        }
        KeyCode::Enter => {
            let command = PaletteCommand::ALL[palette.selected];
            state.run_palette_command(command);
        }
        KeyCode::Esc => state.close_overlay(),
        _ => {}
    }
}

fn handle_export_view(state: &mut AppState, key: KeyEvent, page_size: usize) {
    let UiMode::ExportView(view) = &mut state.mode else {
        return;
    };
    let last = view.lines.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => view.scroll = (view.scroll + 1).min(last),
        KeyCode::Char('k') | KeyCode::Up => view.scroll = view.scroll.saturating_sub(1),
        KeyCode::PageDown => view.scroll = (view.scroll + page_size).min(last),
        KeyCode::PageUp => view.scroll = view.scroll.saturating_sub(page_size),
        _ => state.close_overlay(),
    }
}
