use std::str::FromStr;

use crate::config::ThemeConfig;
use crate::keybinds::InputMode;
use crate::status::{StatusKind, StatusMessage};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Colors used by every screen. Built once from configuration and handed to
/// the renderers; nothing reads styles from global state.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Title bar background and selection marker.
    pub accent: Color,
    /// Secondary accent (selected row details, filter cursor).
    pub accent_dim: Color,
    /// Field labels.
    pub label: Color,
    /// Masked values and section rules.
    pub masked: Color,
    pub error: Color,
    pub status: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0xdc, 0x96, 0x17),
            accent_dim: Color::Rgb(0xb3, 0x63, 0x00),
            label: Color::Gray,
            masked: Color::DarkGray,
            error: Color::LightRed,
            status: Color::Cyan,
        }
    }
}

impl Theme {
    /// Build a theme from config, falling back to the default color for any
    /// value ratatui cannot parse.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let defaults = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            value
                .as_deref()
                .and_then(|v| match Color::from_str(v) {
                    Ok(color) => Some(color),
                    Err(_) => {
                        tracing::warn!("Ignoring unknown theme color {v:?}");
                        None
                    }
                })
                .unwrap_or(fallback)
        };
        Self {
            accent: pick(&config.accent, defaults.accent),
            accent_dim: pick(&config.accent_dim, defaults.accent_dim),
            label: pick(&config.label, defaults.label),
            masked: pick(&config.masked, defaults.masked),
            error: pick(&config.error, defaults.error),
            status: pick(&config.status, defaults.status),
        }
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn label(&self) -> Style {
        Style::default().fg(self.label)
    }

    pub fn dim(&self) -> Style {
        Style::default().add_modifier(Modifier::DIM)
    }

    pub fn status_style(&self, kind: StatusKind) -> Style {
        match kind {
            StatusKind::Info => Style::default().fg(self.status),
            StatusKind::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
        }
    }
}

/// Render the bottom status bar: mode, screen name, then either the transient
/// message or the key hints.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    mode: InputMode,
    screen: &str,
    message: Option<&StatusMessage>,
    hints: &str,
) {
    let mode_style = Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);

    let mut spans = vec![
        Span::styled(format!(" {} ", mode.label()), mode_style),
        Span::raw(" "),
        Span::styled(screen.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
    ];
    match message {
        Some(msg) => spans.push(Span::styled(msg.text.clone(), theme.status_style(msg.kind))),
        None => spans.push(Span::styled(hints.to_string(), theme.dim())),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Standard layout: title (1 line) + content + status bar (1 line), inset by a
/// margin of one row and two columns.
/// Returns (title_area, content_area, status_area).
pub fn standard_layout(area: Rect) -> (Rect, Rect, Rect) {
    let inner = Rect {
        x: area.x.saturating_add(2),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    };
    let [title_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    (title_area, content_area, status_area)
}

/// Create a bordered block with a dimmed border.
pub fn section_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::DIM))
}

/// A rect of the given size centered within `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
