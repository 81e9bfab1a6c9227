use ansi_to_tui::IntoText;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Severity detected from a line's keywords
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// `ERROR` or `FATAL`
    High,
    /// `WARN` or `WARNING`
    Medium,
    /// `INFO`
    Low,
    Plain,
}

impl Severity {
    /// Keyword match is case-sensitive; the first matching tier wins.
    pub fn classify(line: &str) -> Self {
        if line.contains("ERROR") || line.contains("FATAL") {
            Severity::High
        } else if line.contains("WARN") {
            // also covers WARNING
            Severity::Medium
        } else if line.contains("INFO") {
            Severity::Low
        } else {
            Severity::Plain
        }
    }

    pub fn style(self, theme: &Theme) -> Style {
        match self {
            Severity::High => Style::default().fg(theme.severity_high),
            Severity::Medium => Style::default().fg(theme.severity_medium),
            Severity::Low => Style::default().fg(theme.severity_low),
            Severity::Plain => Style::default(),
        }
    }
}

/// Turn one raw log line into styled text.
///
/// Lines that carry their own ANSI colours keep them; everything else is
/// coloured by severity.
pub fn highlight_line(raw: &str, severity: Severity, theme: &Theme) -> Line<'static> {
    if raw.contains('\x1b') {
        if let Ok(text) = raw.as_bytes().into_text() {
            if let Some(line) = text.lines.into_iter().next() {
                return line;
            }
        }
    }
    Line::from(Span::styled(raw.to_string(), severity.style(theme)))
}

/// The marker line shown under a bookmarked line
pub fn bookmark_marker(theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        "(BOOKMARK)",
        Style::default()
            .fg(theme.bookmark)
            .add_modifier(Modifier::BOLD),
    ))
}
