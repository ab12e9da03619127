use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::centered_rect;

/// A single entry in the help popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// The key or key combination (e.g., "j/k", "Enter").
    pub key: String,
    /// Human-readable description.
    pub description: String,
    /// Section header this entry is listed under.
    pub section: String,
}

impl HelpEntry {
    pub fn new(
        section: impl Into<String>,
        key: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            section: section.into(),
        }
    }
}

/// The help popup state.
#[derive(Debug, Default)]
pub struct HelpPopup {
    pub visible: bool,
    title: String,
    entries: Vec<HelpEntry>,
    scroll: u16,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the popup with the given title and entries.
    pub fn show(&mut self, title: impl Into<String>, entries: Vec<HelpEntry>) {
        self.visible = true;
        self.title = title.into();
        self.entries = entries;
        self.scroll = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.entries.clear();
        self.title.clear();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn entries(&self) -> &[HelpEntry] {
        &self.entries
    }

    /// Render the popup centered on screen.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible || self.entries.is_empty() {
            return;
        }

        let lines = self.build_lines();

        let popup_width = (area.width.saturating_sub(8)).min(56);
        let popup_height = (area.height.saturating_sub(4)).min(lines.len() as u16 + 2);
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL);

        let max_scroll = (lines.len() as u16).saturating_sub(popup_height.saturating_sub(2));
        let scroll = self.scroll.min(max_scroll);

        let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
        frame.render_widget(paragraph, popup_area);
    }

    /// Display lines with a header each time the section changes.
    fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut current_section: Option<&str> = None;

        for entry in &self.entries {
            if current_section != Some(entry.section.as_str()) {
                if !lines.is_empty() {
                    lines.push(Line::from(""));
                }
                lines.push(Line::from(Span::styled(
                    format!(" {}", entry.section),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )));
                current_section = Some(entry.section.as_str());
            }

            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:>12} ", entry.key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::raw(entry.description.clone()),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Esc/q/?  close    j/k  scroll",
            Style::default().add_modifier(Modifier::DIM),
        )));

        lines
    }
}

/// Bindings available on every screen.
pub fn global_help_entries() -> Vec<HelpEntry> {
    vec![
        HelpEntry::new("Global", "?", "Toggle this help"),
        HelpEntry::new("Global", "Ctrl-c", "Quit (drafts are discarded)"),
    ]
}
