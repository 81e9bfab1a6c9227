use std::path::PathBuf;
use std::sync::Arc;

use ratatui::style::{Color, Style};
use tracing::{debug, info, warn};
use tui_textarea::TextArea;

use crate::buffer::{BookmarkEntry, BufferRegistry, LineBuffer};
use crate::config::Config;
use crate::filter::ActiveFilter;
use crate::layout::{LayoutChange, LayoutController};
use crate::render::{PanelView, RenderPipeline, RenderState};
use crate::theme::Theme;

/// Filter input overlay
pub struct FilterPrompt<'a> {
    pub textarea: TextArea<'a>,
    /// Compile error from the last submit, shown inline
    pub error: Option<String>,
}

/// Bookmarks of one panel, with a trailing "Close" row
pub struct BookmarkList {
    pub panel: usize,
    pub entries: Vec<BookmarkEntry>,
    pub selected: usize,
}

impl BookmarkList {
    /// Rows including the "Close" row
    pub fn row_count(&self) -> usize {
        self.entries.len() + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteCommand {
    SetFilter,
    ExportVisible,
    ClearView,
    SaveBookmarks,
    Close,
}

impl PaletteCommand {
    pub const ALL: [PaletteCommand; 5] = [
        PaletteCommand::SetFilter,
        PaletteCommand::ExportVisible,
        PaletteCommand::ClearView,
        PaletteCommand::SaveBookmarks,
        PaletteCommand::Close,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PaletteCommand::SetFilter => "Filter (regex)",
            PaletteCommand::ExportVisible => "Export Visible Lines",
            PaletteCommand::ClearView => "Clear Current View",
            PaletteCommand::SaveBookmarks => "Save Bookmarks",
            PaletteCommand::Close => "Close",
        }
    }
}

pub struct CommandPalette {
    pub selected: usize,
}

/// Read-only list of exported lines
pub struct ExportView {
    pub title: String,
    pub lines: Vec<String>,
    pub scroll: usize,
}

/// Which view owns input. Only one overlay can be open at a time.
pub enum UiMode<'a> {
    Normal,
    FilterPrompt(FilterPrompt<'a>),
    BookmarkList(BookmarkList),
    CommandPalette(CommandPalette),
    Help,
    ExportView(ExportView),
}

impl UiMode<'_> {
    pub fn label(&self) -> &'static str {
        match self {
            UiMode::Normal => "NORMAL",
            UiMode::FilterPrompt(_) => "FILTER",
            UiMode::BookmarkList(_) => "BOOKMARKS",
            UiMode::CommandPalette(_) => "COMMAND",
            UiMode::Help => "HELP",
            UiMode::ExportView(_) => "EXPORT",
        }
    }
}

/// Main application state
pub struct AppState<'a> {
    pub registry: BufferRegistry,
    pub render_state: RenderState,
    pub pipeline: RenderPipeline,
    pub layout: LayoutController,
    pub mode: UiMode<'a>,
    /// Panel focused when the current overlay opened
    overlay_return: Option<usize>,
    pub bookmark_path: PathBuf,
    pub theme: Theme,
    /// Status message to display
    pub status_message: Option<String>,
    /// Set when the visible page changed and the screen must be redrawn from
    /// scratch
    pub needs_relayout: bool,
    pub should_quit: bool,
}

impl<'a> AppState<'a> {
    pub fn new(config: &Config, registry: BufferRegistry) -> Self {
        let panels = registry.len();
        Self {
            registry,
            render_state: RenderState::new(panels),
            pipeline: RenderPipeline::new(panels),
            layout: LayoutController::new(panels),
            mode: UiMode::Normal,
            overlay_return: None,
            bookmark_path: config.bookmark_path.clone(),
            theme: Theme::by_name(&config.theme),
            status_message: None,
            needs_relayout: true,
            should_quit: false,
        }
    }

    /// Run one render pass over every panel
    pub fn tick(&mut self) {
        self.pipeline
            .tick(&self.registry, &self.render_state, self.layout.focused());
    }

    pub fn focused_buffer(&self) -> Option<&Arc<LineBuffer>> {
        self.registry.get(self.layout.focused())
    }

    pub fn focused_panel_mut(&mut self) -> Option<&mut PanelView> {
        self.pipeline.panel_mut(self.layout.focused())
    }

    pub fn is_overlay_active(&self) -> bool {
        !matches!(self.mode, UiMode::Normal)
    }

    fn open_overlay(&mut self, mode: UiMode<'a>) {
        if !self.is_overlay_active() {
            self.overlay_return = Some(self.layout.focused());
        }
        debug!(mode = mode.label(), "overlay opened");
        self.mode = mode;
    }

    /// Dismiss the current overlay and give focus back to the panel that had
    /// it before.
    pub fn close_overlay(&mut self) {
        self.mode = UiMode::Normal;
        if let Some(panel) = self.overlay_return.take() {
            let change = self.layout.focus(panel);
            self.apply_layout_change(change);
        }
    }

    fn apply_layout_change(&mut self, change: LayoutChange) {
        if change == LayoutChange::Page {
            self.needs_relayout = true;
        }
    }

    // Navigation

    pub fn shift_focus(&mut self, delta: isize) {
        let change = self.layout.shift_focus(delta);
        self.apply_layout_change(change);
    }

    pub fn go_to_page(&mut self, delta: isize) {
        let change = self.layout.go_to_page(delta);
        self.apply_layout_change(change);
    }

    // Panel commands

    pub fn toggle_auto_scroll(&mut self) {
        self.render_state.auto_scroll = !self.render_state.auto_scroll;
        if self.render_state.auto_scroll {
            if let Some(panel) = self.focused_panel_mut() {
                panel.detached = false;
                panel.scroll_to_end();
            }
        }
        self.status_message = Some(format!(
            "Auto-scroll: {}",
            if self.render_state.auto_scroll { "on" } else { "off" }
        ));
    }

    /// Clear what the focused panel shows; buffer contents and bookmarks stay.
    pub fn clear_focused_view(&mut self) {
        if let Some(panel) = self.focused_panel_mut() {
            panel.clear();
        }
    }

    pub fn toggle_pause(&mut self) {
        let panel = self.layout.focused();
        let paused = self.render_state.toggle_pause(panel);
        self.status_message = Some(format!(
            "Panel {} {}",
            panel + 1,
            if paused { "paused" } else { "resumed" }
        ));
    }

    /// Bookmark the newest line of the focused buffer and show the list
    pub fn bookmark_latest(&mut self) {
        let Some(buffer) = self.focused_buffer() else {
            return;
        };
        match buffer.bookmark_latest() {
            Some(index) => {
                debug!(source = buffer.name(), index, "bookmarked line");
                self.open_bookmark_list();
            }
            None => {
                self.status_message = Some("Nothing to bookmark yet".to_string());
            }
        }
    }

    pub fn open_bookmark_list(&mut self) {
        let panel = self.layout.focused();
        let Some(buffer) = self.registry.get(panel) else {
            return;
        };
        let entries = buffer.bookmark_entries();
        self.open_overlay(UiMode::BookmarkList(BookmarkList {
            panel,
            entries,
            selected: 0,
        }));
    }

    /// Act on the selected bookmark row: jump to the line, or close.
    pub fn select_bookmark(&mut self) {
        let UiMode::BookmarkList(list) = &self.mode else {
            return;
        };
        let target = list
            .entries
            .get(list.selected)
            .map(|entry| (list.panel, entry.seq));
        self.close_overlay();

        if let Some((panel, seq)) = target {
            let found = self
                .pipeline
                .panel_mut(panel)
                .is_some_and(|view| view.scroll_to_seq(seq));
            if !found {
                self.status_message = Some("Bookmarked line is no longer shown".to_string());
            }
        }
    }

    /// Export the focused buffer's lines that pass the filter
    pub fn export_visible(&mut self) {
        let Some(buffer) = self.focused_buffer() else {
            return;
        };
        let lines = match &self.render_state.filter {
            Some(filter) => {
                let keep = |line: &str| filter.matches(line);
                buffer.export_filtered(Some(&keep as &dyn Fn(&str) -> bool))
            }
            None => buffer.export_filtered(None),
        };
        let title = format!("Export: {} ({} lines)", buffer.name(), lines.len());
        self.open_overlay(UiMode::ExportView(ExportView {
            title,
            lines,
            scroll: 0,
        }));
    }

    /// Write the focused buffer's bookmarks to the bookmark file
    pub fn save_bookmarks(&mut self) {
        let Some(buffer) = self.focused_buffer() else {
            return;
        };
        let path = self.bookmark_path.clone();
        let message = match buffer.save_bookmarks(&path) {
            Ok(count) => {
                info!(source = buffer.name(), path = %path.display(), count, "bookmarks saved");
                format!("Saved {} bookmark(s) to {}", count, path.display())
            }
            Err(e) => {
                warn!(error = %e, "bookmark export failed");
                format!("Error: {}", e)
            }
        };
        self.status_message = Some(message);
    }

    // Filter prompt

    /// Open the filter prompt, optionally pre-filled with the active pattern
    pub fn open_filter_prompt(&mut self, prefill: bool) {
        let text = if prefill {
            self.render_state
                .filter
                .as_ref()
                .map(|f| f.pattern.clone())
                .unwrap_or_default()
        } else {
            String::new()
        };
        let mut textarea = TextArea::new(vec![text]);
        textarea.move_cursor(tui_textarea::CursorMove::End);
        textarea.set_cursor_line_style(Style::default());
        textarea.set_placeholder_text("regex, empty clears");
        textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));
        self.open_overlay(UiMode::FilterPrompt(FilterPrompt {
            textarea,
            error: None,
        }));
    }

    /// Compile the prompt text. On success the filter is replaced and the
    /// prompt closes; on failure the old filter stays and the error is shown.
    pub fn submit_filter(&mut self) {
        let UiMode::FilterPrompt(prompt) = &mut self.mode else {
            return;
        };
        let input = prompt.textarea.lines().join("\n");
        match ActiveFilter::parse(&input) {
            Ok(filter) => {
                self.status_message = Some(match &filter {
                    Some(f) => format!("Filter set: /{}/", f.pattern),
                    None => "Filter cleared".to_string(),
                });
                self.render_state.filter = filter;
                self.close_overlay();
                self.tick();
            }
            Err(e) => {
                prompt.error = Some(e.to_string());
            }
        }
    }

    // Palette

    pub fn open_palette(&mut self) {
        self.open_overlay(UiMode::CommandPalette(CommandPalette { selected: 0 }));
    }

    pub fn run_palette_command(&mut self, command: PaletteCommand) {
        match command {
            PaletteCommand::SetFilter => self.open_filter_prompt(true),
            PaletteCommand::ExportVisible => self.export_visible(),
            PaletteCommand::ClearView => {
                self.close_overlay();
                self.clear_focused_view();
            }
            PaletteCommand::SaveBookmarks => {
                self.close_overlay();
                self.save_bookmarks();
            }
            PaletteCommand::Close => self.close_overlay(),
        }
    }

    pub fn open_help(&mut self) {
        self.open_overlay(UiMode::Help);
    }

    /// Text for the status line
    pub fn status_summary(&self) -> String {
        let mut parts = vec![
            format!("Page {}/{}", self.layout.current_page() + 1, self.layout.num_pages().max(1)),
            format!("Focus: {}", self.layout.focused() + 1),
        ];
        if self.render_state.is_paused(self.layout.focused()) {
            parts.push("PAUSED".to_string());
        }
        if let Some(filter) = &self.render_state.filter {
            parts.push(format!("Filter: /{}/", filter.pattern));
        }
        if self.render_state.auto_scroll {
            parts.push("[F]".to_string());
        }
        if let Some(at) = self.pipeline.last_tick() {
            parts.push(format!("@{}", at.format("%H:%M:%S")));
        }
        parts.join("  ")
    }
}
