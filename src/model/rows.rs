//! Ordered row storage for one document
//!
//! Every mutation ends by refreshing the touched rows (render text and highlight tags)
//! and then walking forward while the next row's recorded entry state no longer matches
//! the exit state of the row before it. Propagation stops at the first row whose entry
//! state is still valid, so the cost is bounded by the rows whose highlighting changed.
//!
//! Positions coming from higher layers are clamped, never trusted.

use crate::model::row::Row;
use crate::primitives::highlighter::{HighlightState, SyntaxRuleSet};
use std::sync::Arc;

/// A (row, column) position. The column is a byte offset into the row's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Direction of a single-character delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDirection {
    /// Delete the character before the column (backspace)
    Backward,
    /// Delete the character at the column
    Forward,
}

/// What a single-character delete removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    /// Inline text starting at `at`
    Text { at: Pos, text: String },
    /// The line break after row `at.row`; `at.col` is where the rows were joined
    LineBreak { at: Pos },
}

#[derive(Debug, Clone)]
pub struct RowStore {
    rows: Vec<Row>,
    syntax: Option<Arc<SyntaxRuleSet>>,
    tab_size: usize,
    /// Number of rows highlighted by the most recent mutation
    last_refresh: usize,
}

impl RowStore {
    /// Create a store holding a single empty row
    pub fn new(tab_size: usize, syntax: Option<Arc<SyntaxRuleSet>>) -> Self {
        Self::from_lines(std::iter::empty::<String>(), tab_size, syntax)
    }

    /// Create a store from raw lines. An empty iterator yields one empty row.
    pub fn from_lines<I, S>(lines: I, tab_size: usize, syntax: Option<Arc<SyntaxRuleSet>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tab_size = tab_size.max(1);
        let mut rows: Vec<Row> = lines
            .into_iter()
            .map(|line| Row::new(line, tab_size))
            .collect();
        if rows.is_empty() {
            rows.push(Row::new(String::new(), tab_size));
        }
        let mut store = Self {
            rows,
            syntax,
            tab_size,
            last_refresh: 0,
        };
        store.rehighlight_all();
        store
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_len(&self, at: usize) -> usize {
        self.rows.get(at).map_or(0, Row::len)
    }

    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    pub fn syntax(&self) -> Option<&Arc<SyntaxRuleSet>> {
        self.syntax.as_ref()
    }

    /// Rows highlighted by the most recent mutation (including propagation)
    pub fn last_refresh_count(&self) -> usize {
        self.last_refresh
    }

    /// Clamp a position onto an existing row and character boundary
    pub fn clamp(&self, pos: Pos) -> Pos {
        let row = pos.row.min(self.rows.len().saturating_sub(1));
        let col = self.rows.get(row).map_or(0, |r| r.clamp_col(pos.col));
        Pos::new(row, col)
    }

    /// Position just past the last character of the document
    pub fn end(&self) -> Pos {
        let row = self.rows.len().saturating_sub(1);
        Pos::new(row, self.row_len(row))
    }

    /// Change the tab width, re-rendering every row
    pub fn set_tab_size(&mut self, tab_size: usize) {
        let tab_size = tab_size.max(1);
        if tab_size == self.tab_size {
            return;
        }
        self.tab_size = tab_size;
        for row in &mut self.rows {
            row.rebuild_render(tab_size);
        }
        self.rehighlight_all();
    }

    /// Switch the rule set, re-highlighting every row
    pub fn set_syntax(&mut self, syntax: Option<Arc<SyntaxRuleSet>>) {
        self.syntax = syntax;
        self.rehighlight_all();
    }

    /// Insert a new row at `at` (clamped to `0..=len`)
    pub fn insert_row(&mut self, at: usize, text: impl Into<String>) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(text, self.tab_size));
        self.refresh(at, at);
    }

    /// Remove row `at` and return its text. Out-of-range indices and removing
    /// the only row are no-ops.
    pub fn delete_row(&mut self, at: usize) -> Option<String> {
        if at >= self.rows.len() || self.rows.len() == 1 {
            return None;
        }
        let row = self.rows.remove(at);
        self.last_refresh = self.propagate_from(at);
        Some(row.raw().to_string())
    }

    /// Insert one character. A newline splits the row. Returns the position after it.
    pub fn insert_char(&mut self, row: usize, col: usize, ch: char) -> Pos {
        if ch == '\n' {
            return self.split_row(row, col);
        }
        let mut buf = [0u8; 4];
        self.insert_text(Pos::new(row, col), ch.encode_utf8(&mut buf))
    }

    /// Delete one character before (`Backward`) or at (`Forward`) the column.
    ///
    /// At the start of a row a backward delete joins it onto the previous row, and at
    /// the end of a row a forward delete joins the next row onto it. Deleting past the
    /// start of the first row or the end of the last row does nothing.
    pub fn delete_char(&mut self, row: usize, col: usize, direction: DeleteDirection) -> Option<Removed> {
        let pos = self.clamp(Pos::new(row, col));
        let current = &self.rows[pos.row];
        match direction {
            DeleteDirection::Backward if pos.col > 0 => {
                let start = current.prev_col(pos.col);
                let at = Pos::new(pos.row, start);
                let text = self.delete_text(at, pos);
                Some(Removed::Text { at, text })
            }
            DeleteDirection::Backward if pos.row > 0 => {
                let at = self.join_row(pos.row - 1)?;
                Some(Removed::LineBreak { at })
            }
            DeleteDirection::Forward if pos.col < current.len() => {
                let end = Pos::new(pos.row, current.next_col(pos.col));
                let text = self.delete_text(pos, end);
                Some(Removed::Text { at: pos, text })
            }
            DeleteDirection::Forward if pos.row + 1 < self.rows.len() => {
                let at = self.join_row(pos.row)?;
                Some(Removed::LineBreak { at })
            }
            _ => None,
        }
    }

    /// Split row `row` at `col`: the head stays, the tail becomes a new row below.
    /// Returns the start of the new row.
    pub fn split_row(&mut self, row: usize, col: usize) -> Pos {
        let pos = self.clamp(Pos::new(row, col));
        let tail = self.rows[pos.row].split_off(pos.col);
        self.rows
            .insert(pos.row + 1, Row::new(tail, self.tab_size));
        self.rows[pos.row].rebuild_render(self.tab_size);
        self.refresh(pos.row, pos.row + 1);
        Pos::new(pos.row + 1, 0)
    }

    /// Append row `row + 1` onto `row` and remove it. Returns the join point,
    /// or `None` when `row` is the last row.
    pub fn join_row(&mut self, row: usize) -> Option<Pos> {
        if row + 1 >= self.rows.len() {
            return None;
        }
        let next = self.rows.remove(row + 1);
        let at = Pos::new(row, self.rows[row].len());
        self.rows[row].push_str(next.raw());
        self.update_row(row);
        Some(at)
    }

    /// Insert text that may contain newlines. Returns the position after the inserted text.
    pub fn insert_text(&mut self, pos: Pos, text: &str) -> Pos {
        let pos = self.clamp(pos);
        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();

        if rest.is_empty() {
            let col = self.rows[pos.row].insert_str(pos.col, first);
            self.update_row(pos.row);
            return Pos::new(pos.row, col);
        }

        let tail = self.rows[pos.row].split_off(pos.col);
        self.rows[pos.row].push_str(first);
        self.rows[pos.row].rebuild_render(self.tab_size);

        let last_idx = rest.len() - 1;
        let mut end = pos;
        for (i, line) in rest.iter().enumerate() {
            let row_idx = pos.row + 1 + i;
            let mut row = Row::new(*line, self.tab_size);
            if i == last_idx {
                end = Pos::new(row_idx, line.len());
                row.push_str(&tail);
                row.rebuild_render(self.tab_size);
            }
            self.rows.insert(row_idx, row);
        }
        self.refresh(pos.row, end.row);
        end
    }

    /// Text between two positions, rows joined with `\n`
    pub fn text_range(&self, start: Pos, end: Pos) -> String {
        let (start, end) = self.ordered(start, end);
        if start.row == end.row {
            return self.rows[start.row].raw()[start.col..end.col].to_string();
        }
        let mut text = self.rows[start.row].raw()[start.col..].to_string();
        for row in &self.rows[start.row + 1..end.row] {
            text.push('\n');
            text.push_str(row.raw());
        }
        text.push('\n');
        text.push_str(&self.rows[end.row].raw()[..end.col]);
        text
    }

    /// Remove the text between two positions and return it
    pub fn delete_text(&mut self, start: Pos, end: Pos) -> String {
        let (start, end) = self.ordered(start, end);
        if start == end {
            return String::new();
        }
        if start.row == end.row {
            let removed = self.rows[start.row].remove_range(start.col, end.col);
            self.update_row(start.row);
            return removed;
        }

        let removed = self.text_range(start, end);
        let tail = self.rows[end.row].raw()[end.col..].to_string();
        self.rows[start.row].split_off(start.col);
        self.rows[start.row].push_str(&tail);
        self.rows.drain(start.row + 1..=end.row);
        self.update_row(start.row);
        removed
    }

    /// Rebuild the render text of `at`, re-highlight it and propagate.
    /// Returns the number of rows highlighted.
    pub fn update_row(&mut self, at: usize) -> usize {
        if at >= self.rows.len() {
            return 0;
        }
        self.rows[at].rebuild_render(self.tab_size);
        self.refresh(at, at)
    }

    /// Raw text of every row
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(Row::raw)
    }

    fn ordered(&self, a: Pos, b: Pos) -> (Pos, Pos) {
        let (a, b) = (self.clamp(a), self.clamp(b));
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    fn entry_for(&self, at: usize) -> HighlightState {
        match at.checked_sub(1) {
            Some(prev) => self.rows[prev].exit_state(),
            None => HighlightState::Normal,
        }
    }

    /// Highlight rows `from..=to` unconditionally, then propagate past `to`
    fn refresh(&mut self, from: usize, to: usize) -> usize {
        let to = to.min(self.rows.len().saturating_sub(1));
        let mut count = 0;
        for at in from..=to {
            let entry = self.entry_for(at);
            self.rows[at].highlight(entry, self.syntax.as_deref());
            count += 1;
        }
        count += self.propagate_from(to + 1);
        self.last_refresh = count;
        count
    }

    /// Re-highlight rows starting at `at` while their recorded entry state is stale
    fn propagate_from(&mut self, mut at: usize) -> usize {
        let mut count = 0;
        while at < self.rows.len() {
            let entry = self.entry_for(at);
            if self.rows[at].entry_state() == entry {
                break;
            }
            self.rows[at].highlight(entry, self.syntax.as_deref());
            count += 1;
            at += 1;
        }
        if count > 1 {
            tracing::trace!("highlight propagated across {} rows", count);
        }
        count
    }

    fn rehighlight_all(&mut self) {
        let last = self.rows.len() - 1;
        for at in 0..=last {
            let entry = self.entry_for(at);
            self.rows[at].highlight(entry, self.syntax.as_deref());
        }
        self.last_refresh = self.rows.len();
    }
}
