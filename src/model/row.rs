//! A single line of a document

use crate::primitives::highlighter::{highlight_row, HighlightState, HighlightTag, SyntaxRuleSet};
use unicode_width::UnicodeWidthChar;

/// One line of text: its raw bytes, the rendered form (tabs expanded) and one
/// highlight tag per rendered byte.
///
/// `render` and `tags` are derived from `raw` and always have the same length.
/// Tags are indexed by byte offset into `render`, so a multi-byte character owns
/// several tags and all of them carry the same value. Control characters render
/// as `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    raw: String,
    render: String,
    tags: Vec<HighlightTag>,
    /// State the row was last highlighted with
    entry_state: HighlightState,
    /// State the row leaves open for the next row
    exit_state: HighlightState,
}

impl Row {
    /// Create a row and build its render text. Highlighting is left to the row store.
    pub fn new(raw: impl Into<String>, tab_size: usize) -> Self {
        let mut row = Self {
            raw: raw.into(),
            render: String::new(),
            tags: Vec::new(),
            entry_state: HighlightState::Normal,
            exit_state: HighlightState::Normal,
        };
        row.rebuild_render(tab_size);
        row
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn render(&self) -> &str {
        &self.render
    }

    pub fn tags(&self) -> &[HighlightTag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn entry_state(&self) -> HighlightState {
        self.entry_state
    }

    pub fn exit_state(&self) -> HighlightState {
        self.exit_state
    }

    /// Clamp a column to the row length and down to a character boundary
    pub fn clamp_col(&self, col: usize) -> usize {
        let mut col = col.min(self.raw.len());
        while !self.raw.is_char_boundary(col) {
            col -= 1;
        }
        col
    }

    /// Column of the character before `col`
    pub fn prev_col(&self, col: usize) -> usize {
        let col = self.clamp_col(col);
        self.raw[..col]
            .char_indices()
            .next_back()
            .map_or(0, |(idx, _)| idx)
    }

    /// Column after the character at `col`
    pub fn next_col(&self, col: usize) -> usize {
        let col = self.clamp_col(col);
        self.raw[col..]
            .chars()
            .next()
            .map_or(col, |ch| col + ch.len_utf8())
    }

    /// Leading spaces and tabs
    pub fn indentation(&self) -> &str {
        let end = self
            .raw
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(self.raw.len());
        &self.raw[..end]
    }

    /// Convert a raw column to a display column
    pub fn cx_to_rx(&self, cx: usize, tab_size: usize) -> usize {
        let tab_size = tab_size.max(1);
        let cx = self.clamp_col(cx);
        self.raw[..cx].chars().fold(0, |rx, ch| {
            if ch == '\t' {
                rx + tab_size - rx % tab_size
            } else {
                rx + display_width(ch)
            }
        })
    }

    /// Convert a display column back to the raw column of the character covering it
    pub fn rx_to_cx(&self, rx: usize, tab_size: usize) -> usize {
        let tab_size = tab_size.max(1);
        let mut cur_rx = 0;
        for (idx, ch) in self.raw.char_indices() {
            cur_rx += if ch == '\t' {
                tab_size - cur_rx % tab_size
            } else {
                display_width(ch)
            };
            if cur_rx > rx {
                return idx;
            }
        }
        self.raw.len()
    }

    pub(crate) fn insert_str(&mut self, col: usize, text: &str) -> usize {
        let col = self.clamp_col(col);
        self.raw.insert_str(col, text);
        col + text.len()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.raw.push_str(text);
    }

    /// Remove `start..end` (clamped) and return the removed text
    pub(crate) fn remove_range(&mut self, start: usize, end: usize) -> String {
        let start = self.clamp_col(start);
        let end = self.clamp_col(end).max(start);
        self.raw.drain(start..end).collect()
    }

    /// Cut the row at `col`, returning the tail
    pub(crate) fn split_off(&mut self, col: usize) -> String {
        let col = self.clamp_col(col);
        self.raw.split_off(col)
    }

    /// Rebuild the render text from the raw text. Tags are reset to `Normal`
    /// until the row is highlighted again.
    pub(crate) fn rebuild_render(&mut self, tab_size: usize) {
        let tab_size = tab_size.max(1);
        self.render.clear();
        let mut rx = 0;
        for ch in self.raw.chars() {
            if ch == '\t' {
                let stop = rx + tab_size - rx % tab_size;
                self.render.extend(std::iter::repeat_n(' ', stop - rx));
                rx = stop;
            } else if ch.is_control() {
                self.render.push('?');
                rx += 1;
            } else {
                self.render.push(ch);
                rx += display_width(ch);
            }
        }
        self.tags.clear();
        self.tags.resize(self.render.len(), HighlightTag::Normal);
    }

    /// Highlight the render text starting from `entry`. Returns the new exit state.
    pub(crate) fn highlight(
        &mut self,
        entry: HighlightState,
        syntax: Option<&SyntaxRuleSet>,
    ) -> HighlightState {
        let (tags, exit) = highlight_row(self.render.as_bytes(), entry, syntax);
        debug_assert_eq!(tags.len(), self.render.len());
        self.tags = tags;
        self.entry_state = entry;
        self.exit_state = exit;
        exit
    }
}

fn display_width(ch: char) -> usize {
    if ch.is_control() {
        1
    } else {
        ch.width().unwrap_or(1)
    }
}
