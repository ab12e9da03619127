use bwtui_core::status::StatusKind;
use bwtui_core::text_input::TextInput;
use bwtui_core::ui::{Theme, centered_rect, render_status_bar, section_block, standard_layout};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::detail::DetailPanel;
use crate::editor::{DraftField, EntryEditor};
use crate::fields::SelectableRow;
use crate::list::EntryList;
use crate::screen::{Machine, PromptState, Screen};

const SELECTED_MARKER: &str = "\u{25b8} ";
const UNSELECTED_MARKER: &str = "  ";
const FAVORITE_STAR: &str = "\u{2605}";

/// Render the whole vault view for the active screen.
pub fn render_vault(frame: &mut Frame, area: Rect, machine: &Machine, theme: &Theme) {
    let (title_area, content_area, status_area) = standard_layout(area);

    frame.render_widget(Paragraph::new(title_line(machine.screen(), theme)), title_area);

    match machine.screen() {
        Screen::CredentialPrompt(prompt) => render_prompt(frame, content_area, prompt, theme),
        Screen::EntryList(list) => render_list(frame, content_area, list, theme),
        Screen::EntryDetail { detail, .. } => render_detail(frame, content_area, detail, theme),
        Screen::EntryEditor { editor, .. } => render_editor(frame, content_area, editor, theme),
    }

    render_status_bar(
        frame,
        status_area,
        theme,
        machine.input_mode(),
        machine.screen().kind().name(),
        machine.status.message(),
        machine.hints(),
    );
}

// ── Title ────────────────────────────────────────────────────────────

fn title_line(screen: &Screen, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(" bwtui ", theme.title()), Span::raw(" ")];
    match screen {
        Screen::CredentialPrompt(_) => {
            spans.push(Span::styled("Locked", theme.dim()));
        }
        Screen::EntryList(list) => {
            spans.push(Span::raw(format!("{} entries", list.entries().len())));
            if list.loading {
                spans.push(Span::styled("  loading\u{2026}", theme.dim()));
            }
        }
        Screen::EntryDetail { detail, .. } => {
            let entry = &detail.entry;
            spans.push(Span::styled(
                entry.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            if entry.favorite {
                spans.push(Span::styled(format!(" {FAVORITE_STAR}"), theme.selected()));
            }
            if let Some(folder) = &detail.folder {
                spans.push(Span::styled(format!("  {folder}"), theme.label()));
            }
            if let Some(revised) = entry.revision_date {
                spans.push(Span::styled(
                    format!("  updated {}", revised.format("%Y-%m-%d %H:%M")),
                    theme.dim(),
                ));
            }
        }
        Screen::EntryEditor { editor, .. } => {
            spans.push(Span::raw("New login"));
            if editor.saving {
                spans.push(Span::styled("  saving\u{2026}", theme.dim()));
            }
        }
    }
    Line::from(spans)
}

// ── Credential prompt ────────────────────────────────────────────────

fn render_prompt(frame: &mut Frame, area: Rect, prompt: &PromptState, theme: &Theme) {
    let popup_width = 50u16.min(area.width);
    let popup_height = 5u16.min(area.height);
    let popup_area = centered_rect(popup_width, popup_height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(" Master Password ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = Vec::new();
    if let Some(err) = &prompt.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            theme.status_style(StatusKind::Error),
        )));
    }
    let input_row = lines.len() as u16;
    if prompt.loading {
        lines.push(Line::from(Span::styled("Unlocking\u{2026}", theme.dim())));
    } else {
        lines.push(input_line(&prompt.input, theme));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    if !prompt.loading && input_row < inner.height {
        frame.set_cursor_position((
            inner.x + 2 + prompt.input.cursor_column(),
            inner.y + input_row,
        ));
    }
}

fn input_line(input: &TextInput, theme: &Theme) -> Line<'static> {
    let prompt = Span::styled("> ", theme.selected());
    if input.is_empty() {
        Line::from(vec![prompt, Span::styled(input.placeholder.clone(), theme.dim())])
    } else {
        let style = if input.masked {
            Style::default().fg(theme.masked)
        } else {
            Style::default()
        };
        Line::from(vec![prompt, Span::styled(input.display(), style)])
    }
}

// ── Entry list ───────────────────────────────────────────────────────

fn render_list(frame: &mut Frame, area: Rect, list: &EntryList, theme: &Theme) {
    let show_filter = list.filtering || !list.filter.is_empty();
    let (filter_area, list_area) = if show_filter && area.height > 2 {
        let filter_area = Rect { height: 1, ..area };
        let list_area = Rect {
            y: area.y + 2,
            height: area.height - 2,
            ..area
        };
        (Some(filter_area), list_area)
    } else {
        (None, area)
    };

    if let Some(filter_area) = filter_area {
        let line = Line::from(vec![
            Span::styled("/ ", theme.selected()),
            Span::raw(list.filter.value().to_string()),
            Span::styled(
                format!("  {}/{}", list.visible_count(), list.entries().len()),
                theme.dim(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), filter_area);
        if list.filtering {
            frame.set_cursor_position((
                filter_area.x + 2 + list.filter.cursor_column(),
                filter_area.y,
            ));
        }
    }

    if list.visible_count() == 0 {
        let message = if list.loading {
            "Loading entries\u{2026}"
        } else if list.entries().is_empty() {
            "No entries. Press a to create one."
        } else {
            "No entries match the filter"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, theme.dim())).alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let selected = list.selected_position();
    let items: Vec<ListItem> = list
        .visible()
        .enumerate()
        .map(|(i, entry)| {
            let is_selected = Some(i) == selected;
            let mut spans = vec![
                Span::styled(
                    if is_selected { SELECTED_MARKER } else { UNSELECTED_MARKER },
                    theme.selected(),
                ),
                Span::styled(
                    entry.name.clone(),
                    if is_selected {
                        theme.selected()
                    } else {
                        Style::default()
                    },
                ),
            ];
            if entry.favorite {
                spans.push(Span::styled(format!(" {FAVORITE_STAR}"), theme.selected()));
            }
            if !entry.username.is_empty() {
                spans.push(Span::styled(format!("  {}", entry.username), theme.dim()));
            }
            if let Some(folder) = list.folder_name(entry) {
                spans.push(Span::styled(format!("  [{folder}]"), theme.label()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(List::new(items), list_area, &mut state);
}

// ── Entry detail ─────────────────────────────────────────────────────

fn pad_to_width(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(pad))
}

/// Lines for the detail view and the line index of the selected row.
fn detail_lines(detail: &DetailPanel, theme: &Theme) -> (Vec<Line<'static>>, usize) {
    let rows = detail.rows();
    let selected = detail.selected_index();
    let label_width = rows
        .iter()
        .filter_map(SelectableRow::label)
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    let mut selected_line = 0;
    for (i, row) in rows.iter().enumerate() {
        let is_selected = Some(i) == selected;
        if is_selected {
            selected_line = lines.len();
        }
        let marker = Span::styled(
            if is_selected { SELECTED_MARKER } else { UNSELECTED_MARKER },
            theme.selected(),
        );
        let value_style = if is_selected {
            theme.selected()
        } else if row.is_masked() {
            Style::default().fg(theme.masked)
        } else {
            Style::default()
        };

        match row {
            SelectableRow::Credential { .. } | SelectableRow::Field(_) => {
                let label = row.label().unwrap_or_default();
                lines.push(Line::from(vec![
                    marker,
                    Span::styled(pad_to_width(label, label_width), theme.label()),
                    Span::raw("  "),
                    Span::styled(row.display_value(is_selected), value_style),
                ]));
            }
            SelectableRow::Uri { .. } => {
                lines.push(Line::from(vec![
                    marker,
                    Span::styled(row.display_value(is_selected), value_style),
                ]));
            }
            SelectableRow::SectionHeader(section) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    section.title(),
                    Style::default()
                        .fg(theme.accent_dim)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            SelectableRow::Notes(text) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Notes",
                    Style::default()
                        .fg(theme.accent_dim)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.extend(
                    text.lines()
                        .map(|line| Line::from(format!("{UNSELECTED_MARKER}{line}"))),
                );
            }
        }
    }
    (lines, selected_line)
}

fn render_detail(frame: &mut Frame, area: Rect, detail: &DetailPanel, theme: &Theme) {
    let (lines, selected_line) = detail_lines(detail, theme);
    let height = area.height as usize;
    let scroll = if height == 0 {
        0
    } else {
        selected_line.saturating_sub(height - 1)
    };
    let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

// ── Entry editor ─────────────────────────────────────────────────────

fn render_editor(frame: &mut Frame, area: Rect, editor: &EntryEditor, theme: &Theme) {
    let block = section_block("New login");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_width = DraftField::ALL
        .iter()
        .map(|f| f.label().width())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    let mut cursor = None;
    for field in DraftField::ALL {
        let focused = editor.focused() == field;
        let input = editor.input(field);
        let row = lines.len() as u16;
        let mut spans = vec![
            Span::styled(
                if focused { SELECTED_MARKER } else { UNSELECTED_MARKER },
                theme.selected(),
            ),
            Span::styled(pad_to_width(field.label(), label_width), theme.label()),
            Span::raw("  "),
        ];
        if input.is_empty() {
            spans.push(Span::styled(input.placeholder.clone(), theme.dim()));
        } else {
            spans.push(Span::styled(
                input.display(),
                if focused {
                    theme.selected()
                } else {
                    Style::default()
                },
            ));
        }
        if focused {
            let offset = (UNSELECTED_MARKER.len() + label_width + 2) as u16;
            cursor = Some((inner.x + offset + input.cursor_column(), inner.y + row));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if let Some((x, y)) = cursor {
        if y < inner.y + inner.height && !editor.saving {
            frame.set_cursor_position((x, y));
        }
    }
}
