//! The periodic snapshot → filter → highlight → panel pipeline.
//!
//! Every tick re-renders each non-paused panel from a fresh snapshot of its
//! buffer. Nothing is diffed; the cost is bounded by the buffer capacity.

use chrono::{DateTime, Local};
use tracing::{debug, trace};

use crate::buffer::{BufferRegistry, BufferSnapshot};
use crate::filter::ActiveFilter;
use crate::highlight::Severity;

/// UI-wide render settings. Owned by the event loop and handed to both the
/// tick and the command layer by reference.
#[derive(Debug)]
pub struct RenderState {
    /// Global filter, shared by every panel
    pub filter: Option<ActiveFilter>,
    /// Per-panel pause flags
    paused: Vec<bool>,
    /// Keep the focused panel scrolled to its newest line
    pub auto_scroll: bool,
}

impl RenderState {
    pub fn new(panel_count: usize) -> Self {
        Self {
            filter: None,
            paused: vec![false; panel_count],
            auto_scroll: true,
        }
    }

    pub fn is_paused(&self, panel: usize) -> bool {
        self.paused.get(panel).copied().unwrap_or(false)
    }

    /// Flip the pause flag; returns the new value.
    pub fn toggle_pause(&mut self, panel: usize) -> bool {
        match self.paused.get_mut(panel) {
            Some(flag) => {
                *flag = !*flag;
                *flag
            }
            None => false,
        }
    }
}

/// One rendered row of a panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedLine {
    Log {
        /// Absolute sequence number of the source line, stable across eviction
        seq: u64,
        text: String,
        severity: Severity,
    },
    /// Marker row following a bookmarked line
    Bookmark,
}

/// Last rendered content of one panel plus its scroll position.
#[derive(Clone, Debug, Default)]
pub struct PanelView {
    pub lines: Vec<RenderedLine>,
    /// Top row; the display clamps it to the content height
    pub scroll: usize,
    /// Set when the user scrolls up by hand; cleared by jumping to the end
    pub detached: bool,
}

impl PanelView {
    /// Drop the displayed content. The buffer is untouched and the next tick
    /// refills the panel unless it is paused.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll = 0;
        self.detached = false;
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll = self.lines.len();
    }

    pub fn scroll_up(&mut self, rows: usize, viewport: usize) {
        let max_top = self.lines.len().saturating_sub(viewport);
        self.scroll = self.scroll.min(max_top).saturating_sub(rows);
        self.detached = true;
    }

    /// Scroll towards the tail. Reaching the last screenful resumes follow.
    pub fn scroll_down(&mut self, rows: usize, viewport: usize) {
        let max_top = self.lines.len().saturating_sub(viewport);
        self.scroll = self.scroll.min(max_top).saturating_add(rows);
        if self.scroll >= max_top {
            self.detached = false;
            self.scroll_to_end();
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.detached = true;
    }

    /// Scroll so the row rendered from line `seq` is at the top. Returns
    /// false if that line is not on screen (filtered out, evicted, or newer
    /// than a paused panel's content).
    pub fn scroll_to_seq(&mut self, seq: u64) -> bool {
        let row = self.lines.iter().position(|line| {
            matches!(line, RenderedLine::Log { seq: s, .. } if *s == seq)
        });
        match row {
            Some(row) => {
                self.scroll = row;
                self.detached = true;
                true
            }
            None => false,
        }
    }
}

/// Filter and annotate one snapshot.
pub fn render_snapshot(snapshot: &BufferSnapshot, filter: Option<&ActiveFilter>) -> Vec<RenderedLine> {
    let mut out = Vec::with_capacity(snapshot.lines.len() + snapshot.bookmarks.len());
    for (index, line) in snapshot.lines.iter().enumerate() {
        if let Some(filter) = filter {
            if !filter.matches(line) {
                continue;
            }
        }
        out.push(RenderedLine::Log {
            seq: snapshot.first_seq + index as u64,
            text: line.clone(),
            severity: Severity::classify(line),
        });
        if snapshot.bookmarks.contains_key(&index) {
            out.push(RenderedLine::Bookmark);
        }
    }
    out
}

pub struct RenderPipeline {
    panels: Vec<PanelView>,
    last_tick: Option<DateTime<Local>>,
}

impl RenderPipeline {
    pub fn new(panel_count: usize) -> Self {
        Self {
            panels: vec![PanelView::default(); panel_count],
            last_tick: None,
        }
    }

    pub fn panel(&self, index: usize) -> Option<&PanelView> {
        self.panels.get(index)
    }

    pub fn panel_mut(&mut self, index: usize) -> Option<&mut PanelView> {
        self.panels.get_mut(index)
    }

    pub fn last_tick(&self) -> Option<DateTime<Local>> {
        self.last_tick
    }

    /// Re-render every non-paused panel from its buffer.
    pub fn tick(&mut self, registry: &BufferRegistry, state: &RenderState, focused: usize) {
        for (index, (buffer, panel)) in registry.iter().zip(self.panels.iter_mut()).enumerate() {
            if state.is_paused(index) {
                continue;
            }
            let snapshot = buffer.snapshot_with_bookmarks();
            panel.lines = render_snapshot(&snapshot, state.filter.as_ref());
            if index == focused && state.auto_scroll && !panel.detached {
                panel.scroll_to_end();
            }
            trace!(panel = index, rows = panel.lines.len(), "rendered panel");
        }
        self.last_tick = Some(Local::now());
        debug!(panels = self.panels.len(), filtered = state.filter.is_some(), "render tick");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::LineBuffer;
    use std::sync::Arc;

    fn registry_with(lines: &[&[&str]]) -> BufferRegistry {
        let buffers = lines
            .iter()
            .enumerate()
            .map(|(i, lines)| {
                let buffer = LineBuffer::new(format!("{i}.log"), 100);
                for line in *lines {
                    buffer.append(line.to_string());
                }
                Arc::new(buffer)
            })
            .collect();
        BufferRegistry::new(buffers)
    }

    fn texts(panel: &PanelView) -> Vec<&str> {
        panel
            .lines
            .iter()
            .filter_map(|line| match line {
                RenderedLine::Log { text, .. } => Some(text.as_str()),
                RenderedLine::Bookmark => None,
            })
            .collect()
    }

    #[test]
    fn filter_keeps_only_matching_lines_with_severity() {
        let registry = registry_with(&[&["INFO ok", "ERROR bad", "WARN maybe"]]);
        let mut state = RenderState::new(1);
        state.filter = ActiveFilter::parse("ERROR").unwrap();
        let mut pipeline = RenderPipeline::new(1);

        pipeline.tick(&registry, &state, 0);

        let panel = pipeline.panel(0).unwrap();
        assert_eq!(
            panel.lines,
            vec![RenderedLine::Log {
                seq: 1,
                text: "ERROR bad".to_string(),
                severity: Severity::High,
            }]
        );
    }

    #[test]
    fn filter_applies_to_every_panel() {
        let registry = registry_with(&[&["ERROR a", "INFO b"], &["INFO c", "ERROR d"]]);
        let mut state = RenderState::new(2);
        state.filter = ActiveFilter::parse("ERROR").unwrap();
        let mut pipeline = RenderPipeline::new(2);

        pipeline.tick(&registry, &state, 0);

        assert_eq!(texts(pipeline.panel(0).unwrap()), vec!["ERROR a"]);
        assert_eq!(texts(pipeline.panel(1).unwrap()), vec!["ERROR d"]);
    }

    #[test]
    fn bookmark_marker_follows_its_line() {
        let registry = registry_with(&[&["one", "two", "three"]]);
        registry.get(0).unwrap().add_bookmark(1, "two");
        let state = RenderState::new(1);
        let mut pipeline = RenderPipeline::new(1);

        pipeline.tick(&registry, &state, 0);

        let lines = &pipeline.panel(0).unwrap().lines;
        assert_eq!(lines.len(), 4);
        assert!(matches!(&lines[1], RenderedLine::Log { text, .. } if text == "two"));
        assert_eq!(lines[2], RenderedLine::Bookmark);
    }

    #[test]
    fn bookmark_on_filtered_out_line_has_no_marker() {
        let snapshot = BufferSnapshot {
            lines: vec!["INFO a".into(), "ERROR b".into()],
            first_seq: 0,
            bookmarks: [(0, "INFO a".to_string())].into_iter().collect(),
        };
        let filter = ActiveFilter::parse("ERROR").unwrap();
        let rendered = render_snapshot(&snapshot, filter.as_ref());
        assert_eq!(rendered.len(), 1);
    }

    #[test]
    fn paused_panel_keeps_its_content() {
        let registry = registry_with(&[&["first"], &["other"]]);
        let mut state = RenderState::new(2);
        let mut pipeline = RenderPipeline::new(2);
        pipeline.tick(&registry, &state, 0);

        assert!(state.toggle_pause(0));
        registry.get(0).unwrap().append("second".to_string());
        registry.get(1).unwrap().append("more".to_string());
        pipeline.tick(&registry, &state, 0);

        assert_eq!(texts(pipeline.panel(0).unwrap()), vec!["first"]);
        assert_eq!(texts(pipeline.panel(1).unwrap()), vec!["other", "more"]);

        assert!(!state.toggle_pause(0));
        pipeline.tick(&registry, &state, 0);
        assert_eq!(texts(pipeline.panel(0).unwrap()), vec!["first", "second"]);
    }

    #[test]
    fn focused_panel_follows_the_tail() {
        let registry = registry_with(&[&["a", "b", "c"], &["x", "y"]]);
        let state = RenderState::new(2);
        let mut pipeline = RenderPipeline::new(2);

        pipeline.tick(&registry, &state, 0);

        assert_eq!(pipeline.panel(0).unwrap().scroll, 3);
        assert_eq!(pipeline.panel(1).unwrap().scroll, 0);
    }

    #[test]
    fn auto_scroll_off_leaves_scroll_alone() {
        let registry = registry_with(&[&["a", "b", "c"]]);
        let mut state = RenderState::new(1);
        state.auto_scroll = false;
        let mut pipeline = RenderPipeline::new(1);

        pipeline.tick(&registry, &state, 0);

        assert_eq!(pipeline.panel(0).unwrap().scroll, 0);
    }

    #[test]
    fn clear_is_cosmetic() {
        let registry = registry_with(&[&["a", "b"]]);
        let state = RenderState::new(1);
        let mut pipeline = RenderPipeline::new(1);
        pipeline.tick(&registry, &state, 0);

        pipeline.panel_mut(0).unwrap().clear();
        assert!(pipeline.panel(0).unwrap().lines.is_empty());
        assert_eq!(registry.get(0).unwrap().len(), 2);

        pipeline.tick(&registry, &state, 0);
        assert_eq!(texts(pipeline.panel(0).unwrap()), vec!["a", "b"]);
    }

    #[test]
    fn scrolling_back_to_the_tail_resumes_follow() {
        let registry = registry_with(&[&["a", "b", "c", "d", "e", "f"]]);
        let state = RenderState::new(1);
        let mut pipeline = RenderPipeline::new(1);
        pipeline.tick(&registry, &state, 0);

        let panel = pipeline.panel_mut(0).unwrap();
        panel.scroll_up(3, 2);
        assert!(panel.detached);
        assert_eq!(panel.scroll, 1);

        panel.scroll_down(1, 2);
        assert!(panel.detached);
        panel.scroll_down(5, 2);
        assert!(!panel.detached);
        assert_eq!(panel.scroll, 6);

        registry.get(0).unwrap().append("g".to_string());
        pipeline.tick(&registry, &state, 0);
        assert_eq!(pipeline.panel(0).unwrap().scroll, 7);
    }

    #[test]
    fn clear_resumes_follow() {
        let mut panel = PanelView::default();
        panel.scroll_to_top();
        assert!(panel.detached);
        panel.clear();
        assert!(!panel.detached);
    }

    #[test]
    fn jump_to_bookmarked_line() {
        let registry = registry_with(&[&["a", "b", "c", "d"]]);
        let state = RenderState::new(1);
        let mut pipeline = RenderPipeline::new(1);
        pipeline.tick(&registry, &state, 0);

        let panel = pipeline.panel_mut(0).unwrap();
        assert!(panel.scroll_to_seq(2));
        assert_eq!(panel.scroll, 2);
        assert!(panel.detached);
        assert!(!panel.scroll_to_seq(10));
    }

    #[test]
    fn rows_carry_stream_sequence_after_eviction() {
        let buffer = LineBuffer::new("a.log", 2);
        for line in ["a", "b", "c"] {
            buffer.append(line.to_string());
        }
        let rendered = render_snapshot(&buffer.snapshot_with_bookmarks(), None);
        assert!(matches!(&rendered[0], RenderedLine::Log { seq: 1, text, .. } if text == "b"));
        assert!(matches!(&rendered[1], RenderedLine::Log { seq: 2, text, .. } if text == "c"));
    }
}
