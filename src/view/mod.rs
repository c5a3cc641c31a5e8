//! Terminal rendering of a session
//!
//! The screen is split into four bands: the document tabs, the text area with its
//! line-number gutter, a status bar and a message line that doubles as the prompt.

use crate::app::Session;
use crate::input::Prompt;
use crate::model::document::Document;
use crate::primitives::highlighter::HighlightTag;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

/// Scroll offsets of the text area
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub top_row: usize,
    /// First visible display column
    pub left_col: usize,
}

impl Viewport {
    /// Scroll just enough to bring the cursor at (`row`, display column `rx`) into a
    /// text area of `height` rows by `width` columns
    pub fn scroll_to(&mut self, row: usize, rx: usize, height: usize, width: usize) {
        let height = height.max(1);
        // leave room for the cursor after the last character
        let width = width.max(2);
        if row < self.top_row {
            self.top_row = row;
        } else if row >= self.top_row + height {
            self.top_row = row + 1 - height;
        }
        if rx < self.left_col {
            self.left_col = rx;
        } else if rx >= self.left_col + width - 1 {
            self.left_col = rx + 2 - width;
        }
    }
}

pub fn tag_style(tag: HighlightTag) -> Style {
    match tag {
        HighlightTag::Normal => Style::new(),
        HighlightTag::Comment | HighlightTag::BlockComment => Style::new().fg(Color::Cyan),
        HighlightTag::Keyword => Style::new().fg(Color::Yellow),
        HighlightTag::Type => Style::new().fg(Color::Green),
        HighlightTag::Builtin => Style::new().fg(Color::Magenta),
        HighlightTag::String => Style::new().fg(Color::Red),
        HighlightTag::Number => Style::new().fg(Color::LightRed),
    }
}

/// Draw the whole session
pub fn render(frame: &mut Frame, session: &Session, prompt: Option<&Prompt>, viewport: &mut Viewport) {
    let [tabs_area, text_area, status_area, message_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_tabs(frame, tabs_area, session);

    if let Some(doc) = session.active_document() {
        render_text(frame, text_area, doc, viewport, prompt.is_none());
        render_status_bar(frame, status_area, doc);
    }

    match prompt {
        Some(prompt) => render_prompt(frame, message_area, prompt),
        None => {
            let message = session.status().latest().unwrap_or_default().to_string();
            frame.render_widget(Paragraph::new(message), message_area);
        }
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, session: &Session) {
    let active = session.registry().active_index();
    let spans: Vec<Span> = session
        .registry()
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            let modified = if doc.is_dirty() { "*" } else { "" };
            let label = format!(" {}{} ", doc.display_name(), modified);
            if index == active {
                Span::styled(label, Style::new().add_modifier(Modifier::REVERSED))
            } else {
                Span::styled(label, Style::new().dark_gray())
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_text(frame: &mut Frame, area: Rect, doc: &Document, viewport: &mut Viewport, show_cursor: bool) {
    let rows = doc.rows();
    let tab_size = rows.tab_size();
    let gutter_width = doc.gutter_width();
    let cursor = doc.cursor().pos();
    let cursor_rx = rows
        .row(cursor.row)
        .map_or(0, |row| row.cx_to_rx(cursor.col, tab_size));
    let content_width = (area.width as usize).saturating_sub(gutter_width + 1);
    viewport.scroll_to(cursor.row, cursor_rx, area.height as usize, content_width);

    let selection = doc.cursor().selection();
    let lines = rows
        .rows()
        .iter()
        .enumerate()
        .skip(viewport.top_row)
        .take(area.height as usize)
        .map(|(index, row)| {
            let gutter_style = if index == cursor.row {
                Style::new().white()
            } else {
                Style::new().dark_gray()
            };
            let mut spans = vec![
                Span::styled(format!("{:>width$}", index + 1, width = gutter_width), gutter_style),
                Span::raw(" "),
            ];

            // Selected display columns on this row
            let selected = selection.and_then(|(start, end)| {
                if index < start.row || index > end.row {
                    return None;
                }
                let from = if index == start.row {
                    row.cx_to_rx(start.col, tab_size)
                } else {
                    0
                };
                let to = if index == end.row {
                    row.cx_to_rx(end.col, tab_size)
                } else {
                    usize::MAX
                };
                Some(from..to)
            });

            let mut rx = 0;
            let mut run = String::new();
            let mut run_style = Style::new();
            for (byte, ch) in row.render().char_indices() {
                let width = ch.width().unwrap_or(1);
                let col = rx;
                rx += width;
                if col < viewport.left_col {
                    continue;
                }
                if col - viewport.left_col + width > content_width {
                    break;
                }
                let mut style = tag_style(row.tags().get(byte).copied().unwrap_or_default());
                if selected.as_ref().is_some_and(|range| range.contains(&col)) {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                if style != run_style && !run.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut run), run_style));
                }
                run_style = style;
                run.push(ch);
            }
            if !run.is_empty() {
                spans.push(Span::styled(run, run_style));
            }
            Line::from(spans)
        });
    frame.render_widget(Text::from_iter(lines), area);

    if show_cursor {
        let x = area.x as usize + gutter_width + 1 + cursor_rx - viewport.left_col;
        let y = area.y as usize + cursor.row - viewport.top_row;
        frame.set_cursor_position(Position::new(x as u16, y as u16));
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, doc: &Document) {
    let rows = doc.rows();
    let cursor = doc.cursor().pos();
    let column = rows
        .row(cursor.row)
        .map_or(0, |row| row.cx_to_rx(cursor.col, rows.tab_size()));
    let modified = if doc.is_dirty() { " [+]" } else { "" };
    let left = format!(" {}{} - {} lines", doc.display_name(), modified, rows.len());
    let right = format!(
        "{} | {} | {} | Ln {}, Col {} ",
        doc.syntax_name().unwrap_or("plain text"),
        doc.format().line_ending.display_name(),
        doc.format().encoding.display_name(),
        cursor.row + 1,
        column + 1
    );
    let padding = (area.width as usize).saturating_sub(left.len() + right.len());
    let line = format!("{}{}{}", left, " ".repeat(padding), right);
    frame.render_widget(
        Paragraph::new(line).style(Style::new().add_modifier(Modifier::REVERSED)),
        area,
    );
}

fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let line = Line::from(vec![
        Span::styled(prompt.message.clone(), Style::new().bold()),
        Span::raw(prompt.input.clone()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = (prompt.message.len() + prompt.input.len()) as u16;
    if cursor_x < area.width {
        frame.set_cursor_position((area.x + cursor_x, area.y));
    }
}
