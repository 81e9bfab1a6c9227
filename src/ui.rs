use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{AppState, PaletteCommand, UiMode};
use crate::highlight::{bookmark_marker, highlight_line};
use crate::layout::PAGE_SIZE;
use crate::render::{PanelView, RenderedLine};
use crate::theme::Theme;

/// Inner height of one panel for a terminal of `height` rows, used for paging
/// keys
pub fn panel_page_size(height: u16) -> usize {
    // status line, then two rows of bordered panels
    (height.saturating_sub(1) / 2).saturating_sub(2).max(1) as usize
}

/// Draw the entire UI
pub fn draw(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Panel grid
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_grid(frame, state, chunks[0]);
    draw_status_bar(frame, state, chunks[1]);

    match &state.mode {
        UiMode::Normal => {}
        UiMode::Help => draw_help_overlay(frame, &state.theme),
        UiMode::FilterPrompt(_) => draw_filter_prompt(frame, state),
        UiMode::BookmarkList(_) => draw_bookmark_list(frame, state),
        UiMode::CommandPalette(_) => draw_palette(frame, state),
        UiMode::ExportView(_) => draw_export_view(frame, state),
    }
}

/// Split `area` into the 2×2 cells of a page, row-major
fn grid_cells(area: Rect) -> [Rect; PAGE_SIZE] {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);
    let halves = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(row)
    };
    let top = halves(rows[0]);
    let bottom = halves(rows[1]);
    [top[0], top[1], bottom[0], bottom[1]]
}

fn draw_grid(frame: &mut Frame, state: &AppState, area: Rect) {
    let pages = state.layout.paginate();
    let slots = pages
        .get(state.layout.current_page())
        .copied()
        .unwrap_or([None; PAGE_SIZE]);
    for (cell, slot) in grid_cells(area).into_iter().zip(slots) {
        // Unused cells stay empty
        if let Some(index) = slot {
            draw_panel(frame, state, index, cell);
        }
    }
}

fn draw_panel(frame: &mut Frame, state: &AppState, index: usize, area: Rect) {
    let theme = &state.theme;
    let Some(buffer) = state.registry.get(index) else {
        return;
    };
    let focused = index == state.layout.focused();
    let paused = state.render_state.is_paused(index);

    let border_style = if focused {
        Style::default().fg(theme.border_focused)
    } else if paused {
        Style::default().fg(theme.border_paused)
    } else {
        Style::default().fg(theme.border_unfocused)
    };

    let mut title = vec![Span::raw(format!(" {} ", buffer.name()))];
    let marks = buffer.bookmarks().len();
    if marks > 0 {
        title.push(Span::styled(
            format!("[{} marked] ", marks),
            Style::default().fg(theme.bookmark),
        ));
    }
    if paused {
        title.push(Span::styled("[PAUSED] ", Style::default().fg(theme.warning_message)));
    }
    if let Some(err) = buffer.source_error() {
        title.push(Span::styled(
            format!("({}) ", err),
            Style::default().fg(theme.error_message),
        ));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    if height == 0 {
        return;
    }

    let Some(view) = state.pipeline.panel(index) else {
        return;
    };
    if view.lines.is_empty() {
        let msg = if buffer.is_empty() {
            "Waiting for log lines..."
        } else if state.render_state.filter.is_some() {
            "No lines match the current filter"
        } else {
            ""
        };
        frame.render_widget(
            Paragraph::new(msg).style(Style::default().fg(theme.empty_state)),
            inner,
        );
        return;
    }

    frame.render_widget(Paragraph::new(visible_rows(view, height, theme)), inner);
}

/// Rows of `view` that fit in `height`, with the scroll offset clamped so the
/// last row sits at the bottom when scrolled to the end.
fn visible_rows(view: &PanelView, height: usize, theme: &Theme) -> Vec<Line<'static>> {
    let top = view.scroll.min(view.lines.len().saturating_sub(height));
    view.lines
        .iter()
        .skip(top)
        .take(height)
        .map(|line| match line {
            RenderedLine::Log { text, severity, .. } => highlight_line(text, *severity, theme),
            RenderedLine::Bookmark => bookmark_marker(theme),
        })
        .collect()
}

/// Draw the status bar
fn draw_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = &state.theme;

    let help_text = match state.mode {
        UiMode::Normal => " Tab:focus  /:filter  p:pause  [ ]:pages  ::commands  h:help ",
        UiMode::FilterPrompt(_) => " Enter:apply  Esc:cancel ",
        _ => " Enter:select  Esc:close ",
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", state.mode.label()),
            Style::default().bg(theme.status_mode_bg).fg(theme.status_mode_fg),
        ),
        Span::raw(format!(" {} ", state.status_summary())),
    ];
    if let Some(msg) = &state.status_message {
        let style = if msg.starts_with("Error") {
            Style::default().fg(theme.error_message)
        } else {
            Style::default().fg(theme.warning_message)
        };
        spans.push(Span::styled(format!("{} ", msg), style));
    }
    spans.push(Span::styled(help_text, Style::default().fg(theme.status_help)));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.status_bg));
    frame.render_widget(paragraph, area);
}

/// A centred box of at most `width`×`height`, cleared
fn popup(frame: &mut Frame, width: u16, height: u16) -> Rect {
    let area = frame.area();
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let rect = Rect::new(x, y, width, height);
    frame.render_widget(Clear, rect);
    rect
}

fn overlay_block<'a>(title: impl Into<Line<'a>>, theme: &Theme) -> Block<'a> {
    let title: Line<'a> = title.into();
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.help_border))
        .style(Style::default().bg(theme.help_bg))
}

fn draw_filter_prompt(frame: &mut Frame, state: &AppState) {
    let UiMode::FilterPrompt(prompt) = &state.mode else {
        return;
    };
    let theme = &state.theme;
    let area = popup(frame, 70, 5);
    let block = overlay_block(" Regex filter (empty to clear) ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    let input = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(rows[0]);

    frame.render_widget(
        Paragraph::new("/").style(Style::default().fg(theme.prompt_prefix)),
        input[0],
    );
    frame.render_widget(&prompt.textarea, input[1]);

    if let Some(err) = &prompt.error {
        let msg = Line::from(Span::styled(
            format!("Invalid regex: {}. Try again.", summary_line(err)),
            Style::default().fg(theme.error_message),
        ));
        frame.render_widget(Paragraph::new(msg), rows[1]);
    }
}

/// regex errors span several lines and end with the actual complaint; the
/// prompt has room for one
fn summary_line(text: &str) -> &str {
    text.lines().last().unwrap_or(text)
}

fn draw_bookmark_list(frame: &mut Frame, state: &AppState) {
    let UiMode::BookmarkList(list) = &state.mode else {
        return;
    };
    let theme = &state.theme;
    let name = state
        .registry
        .get(list.panel)
        .map(|b| b.name().to_string())
        .unwrap_or_default();
    let area = popup(frame, 90, list.row_count() as u16 + 2);

    let mut items: Vec<ListItem> = list
        .entries
        .iter()
        .map(|entry| {
            let label = match entry.index {
                Some(index) => format!("Line {}: ", index + 1),
                None => "(evicted): ".to_string(),
            };
            let preview: String = entry.content.chars().take(60).collect();
            ListItem::new(format!("{}{}", label, preview))
        })
        .collect();
    items.push(ListItem::new("Close - back to logs"));

    let widget = List::new(items)
        .block(overlay_block(format!(" Bookmarks: {} ", name), theme))
        .highlight_style(
            Style::default()
                .fg(theme.overlay_selected)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected(Some(list.selected));
    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn draw_palette(frame: &mut Frame, state: &AppState) {
    let UiMode::CommandPalette(palette) = &state.mode else {
        return;
    };
    let theme = &state.theme;
    let area = popup(frame, 40, PaletteCommand::ALL.len() as u16 + 2);

    let items: Vec<ListItem> = PaletteCommand::ALL
        .iter()
        .map(|command| ListItem::new(command.label()))
        .collect();
    let widget = List::new(items)
        .block(overlay_block(" : Command Palette ", theme))
        .highlight_style(
            Style::default()
                .fg(theme.overlay_selected)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default().with_selected(Some(palette.selected));
    frame.render_stateful_widget(widget, area, &mut list_state);
}

fn draw_export_view(frame: &mut Frame, state: &AppState) {
    let UiMode::ExportView(view) = &state.mode else {
        return;
    };
    let theme = &state.theme;
    let full = frame.area();
    let area = popup(frame, full.width, full.height);
    let block = overlay_block(
        format!(" {} (j/k scroll, any other key closes) ", view.title),
        theme,
    );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = view
        .lines
        .iter()
        .skip(view.scroll)
        .take(inner.height as usize)
        .map(|line| Line::raw(line.as_str()))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Draw the help overlay
fn draw_help_overlay(frame: &mut Frame, theme: &Theme) {
    let help_text = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("  q, Ctrl+C    Quit (Ctrl+C works everywhere)"),
        Line::from("  s            Toggle auto-scroll"),
        Line::from("  c            Clear current log view"),
        Line::from("  /            Regex filter (empty clears)"),
        Line::from("  b            Bookmark last line in current log"),
        Line::from("  B            Show bookmarks list"),
        Line::from("  Tab/S-Tab    Switch log panel focus"),
        Line::from("  [ / ]        Previous / next page"),
        Line::from("  p            Pause/resume current panel"),
        Line::from("  :            Command palette"),
        Line::from("  j/k, ↑/↓     Scroll current panel"),
        Line::from("  g/G          Top / follow bottom"),
        Line::from("  h, ?         Toggle this help"),
    ];

    let area = popup(frame, 50, help_text.len() as u16 + 2);
    let paragraph = Paragraph::new(help_text).block(overlay_block(" Help ", theme));
    frame.render_widget(paragraph, area);
}
