//! One open document: rows, cursor, history and file identity
//!
//! Every edit follows the same shape: mutate the rows, describe the mutation as an
//! [`Action`], record it with the cursor positions around it. Undo applies the
//! inverse of the recorded action and restores the cursor it started from.

use crate::config::EditorConfig;
use crate::model::clipboard::Clipboard;
use crate::model::cursor::{Cursor, Movement};
use crate::model::event::{Action, ActionEntry, ActionLog, Recorded};
use crate::model::file_io::{LoadedFile, TextFormat};
use crate::model::rows::{DeleteDirection, Pos, Removed, RowStore};
use crate::primitives::highlighter::SyntaxRuleSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a document came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileIdentity {
    Path(PathBuf),
    /// Never saved; numbered per session
    Untitled(u32),
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Untitled(id) => write!(f, "Untitled-{id}"),
        }
    }
}

/// Search direction for [`Document::find`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
pub struct Document {
    rows: RowStore,
    cursor: Cursor,
    log: ActionLog,
    identity: FileIdentity,
    format: TextFormat,
    /// Closer inserted by bracket autocomplete that typing it again steps over
    pending_closer: Option<Pos>,
}

impl Document {
    /// A new empty buffer. It starts dirty since it has no file to match.
    pub fn new_untitled(id: u32, tab_size: usize) -> Self {
        Self {
            rows: RowStore::new(tab_size, None),
            cursor: Cursor::new(),
            log: ActionLog::new_unsaved(),
            identity: FileIdentity::Untitled(id),
            format: TextFormat::default(),
            pending_closer: None,
        }
    }

    /// An empty document bound to a path that does not exist yet
    pub fn new_file(
        path: impl Into<PathBuf>,
        tab_size: usize,
        syntax: Option<Arc<SyntaxRuleSet>>,
    ) -> Self {
        Self {
            rows: RowStore::new(tab_size, syntax),
            cursor: Cursor::new(),
            log: ActionLog::new_unsaved(),
            identity: FileIdentity::Path(path.into()),
            format: TextFormat::default(),
            pending_closer: None,
        }
    }

    /// A document holding loaded file content, clean
    pub fn from_loaded(
        path: impl Into<PathBuf>,
        loaded: LoadedFile,
        tab_size: usize,
        syntax: Option<Arc<SyntaxRuleSet>>,
    ) -> Self {
        Self {
            rows: RowStore::from_lines(loaded.lines, tab_size, syntax),
            cursor: Cursor::new(),
            log: ActionLog::new(),
            identity: FileIdentity::Path(path.into()),
            format: loaded.format,
            pending_closer: None,
        }
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn identity(&self) -> &FileIdentity {
        &self.identity
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.identity {
            FileIdentity::Path(path) => Some(path),
            FileIdentity::Untitled(_) => None,
        }
    }

    /// Short name for tab bars: file name, or `Untitled-N`
    pub fn display_name(&self) -> String {
        match &self.identity {
            FileIdentity::Path(path) => path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            FileIdentity::Untitled(_) => self.identity.to_string(),
        }
    }

    pub fn format(&self) -> TextFormat {
        self.format
    }

    pub fn dirty(&self) -> usize {
        self.log.dirty()
    }

    pub fn is_dirty(&self) -> bool {
        self.log.is_dirty()
    }

    pub fn syntax_name(&self) -> Option<&str> {
        self.rows.syntax().map(|rules| rules.name.as_str())
    }

    /// Number of digits needed for the largest line number
    pub fn gutter_width(&self) -> usize {
        let mut n = self.rows.len().max(1);
        let mut digits = 0;
        while n > 0 {
            digits += 1;
            n /= 10;
        }
        digits
    }

    /// Raw row text, for saving
    pub fn lines(&self) -> Vec<&str> {
        self.rows.lines().collect()
    }

    /// Rows joined with `\n`
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    /// Text of the selection, if any
    pub fn selected_text(&self) -> Option<String> {
        let (start, end) = self.cursor.selection()?;
        Some(self.rows.text_range(start, end))
    }

    /// The document now matches its file
    pub fn mark_saved(&mut self) {
        self.log.mark_saved();
    }

    /// Bind the document to a new path (save as) and pick up the rule set for it
    pub fn set_path(&mut self, path: PathBuf, syntax: Option<Arc<SyntaxRuleSet>>) {
        self.identity = FileIdentity::Path(path);
        self.rows.set_syntax(syntax);
    }

    pub fn set_tab_size(&mut self, tab_size: usize) {
        self.rows.set_tab_size(tab_size);
    }

    // Cursor and selection. None of these are edits, but they all end the
    // current undo group.

    pub fn move_cursor(&mut self, movement: Movement, extend: bool, page_rows: usize) {
        self.cursor.apply(movement, extend, &self.rows, page_rows);
        self.after_navigation();
    }

    pub fn set_cursor(&mut self, pos: Pos) {
        self.cursor.set(self.rows.clamp(pos));
        self.after_navigation();
    }

    pub fn select(&mut self, anchor: Pos, head: Pos) {
        self.cursor
            .select(self.rows.clamp(anchor), self.rows.clamp(head));
        self.after_navigation();
    }

    pub fn select_word(&mut self) {
        self.cursor.select_word(&self.rows);
        self.after_navigation();
    }

    pub fn select_line(&mut self) {
        self.cursor.select_line(&self.rows);
        self.after_navigation();
    }

    pub fn select_all(&mut self) {
        self.cursor.select_all(&self.rows);
        self.after_navigation();
    }

    pub fn collapse_selection(&mut self) {
        self.cursor.collapse();
        self.after_navigation();
    }

    fn after_navigation(&mut self) {
        self.log.seal();
        self.pending_closer = None;
    }

    // Edits

    /// Type one character, replacing the selection if there is one.
    /// A newline splits the row.
    pub fn insert_char(&mut self, ch: char, config: &EditorConfig) {
        if ch == '\n' || ch == '\r' {
            self.insert_newline(config);
            return;
        }
        let before = self.rows.clamp(self.cursor.pos());

        if !self.cursor.has_selection() && self.step_over_closer(ch) {
            return;
        }

        let mut actions = Vec::new();
        if let Some(deleted) = self.take_selection() {
            actions.push(deleted);
        }

        let pos = self.rows.clamp(self.cursor.pos());
        let closer = match closing_pair(ch, config.bracket_autocomplete) {
            // Quotes only pair up when not typed directly after a word
            Some(close) if ch == close && self.char_before(pos).is_some_and(char::is_alphanumeric) => {
                None
            }
            other => other,
        };

        let mut text = ch.to_string();
        if let Some(close) = closer {
            text.push(close);
        }
        let end = self.rows.insert_text(pos, &text);
        let after = Pos::new(pos.row, pos.col + ch.len_utf8());

        let coalesce = config.coalesce_edits && actions.is_empty();
        actions.push(Action::Insert { pos, text });
        self.commit(actions, "typing", before, after, coalesce);

        self.pending_closer = match (closer, self.pending_closer) {
            (Some(_), _) => Some(Pos::new(end.row, end.col - 1)),
            (None, Some(p)) if p.row == pos.row && p.col >= pos.col && before == pos => {
                Some(Pos::new(p.row, p.col + ch.len_utf8()))
            }
            _ => None,
        };
    }

    /// Split the row at the cursor, copying the indentation onto the new row
    /// when auto-indent is on
    pub fn insert_newline(&mut self, config: &EditorConfig) {
        let before = self.cursor.pos();
        let mut actions = Vec::new();
        if let Some(deleted) = self.take_selection() {
            actions.push(deleted);
        }

        let pos = self.cursor.pos();
        let indent = if config.auto_indent {
            self.rows.row(pos.row).map_or_else(String::new, |row| {
                let indent = row.indentation();
                indent[..indent.len().min(pos.col)].to_string()
            })
        } else {
            String::new()
        };

        let new_row = self.rows.split_row(pos.row, pos.col);
        actions.push(Action::SplitRow { pos });
        let mut after = new_row;
        if !indent.is_empty() {
            after = self.rows.insert_text(new_row, &indent);
            actions.push(Action::Insert {
                pos: new_row,
                text: indent,
            });
        }
        self.commit(actions, "newline", before, after, false);
        self.log.seal();
        self.pending_closer = None;
    }

    /// Backspace (`Backward`) or delete (`Forward`). With a selection, removes it instead.
    pub fn delete(&mut self, direction: DeleteDirection, config: &EditorConfig) {
        if self.cursor.has_selection() {
            self.delete_selection();
            return;
        }
        let pos = self.rows.clamp(self.cursor.pos());

        if direction == DeleteDirection::Backward
            && config.bracket_autocomplete > 0
            && self.is_inside_empty_pair(pos, config.bracket_autocomplete)
        {
            let start = Pos::new(pos.row, pos.col - 1);
            let end = Pos::new(pos.row, pos.col + 1);
            let text = self.rows.delete_text(start, end);
            self.pending_closer = None;
            self.record(
                Action::Delete {
                    pos: start,
                    text,
                    direction,
                },
                pos,
                start,
                config.coalesce_edits,
            );
            return;
        }

        let Some(removed) = self.rows.delete_char(pos.row, pos.col, direction) else {
            return;
        };
        match removed {
            Removed::Text { at, text } => {
                self.pending_closer = match self.pending_closer {
                    Some(p) if p.row == at.row && p.col > at.col => {
                        Some(Pos::new(p.row, p.col - text.len()))
                    }
                    _ => None,
                };
                self.record(
                    Action::Delete {
                        pos: at,
                        text,
                        direction,
                    },
                    pos,
                    at,
                    config.coalesce_edits,
                );
            }
            Removed::LineBreak { at } => {
                self.pending_closer = None;
                self.record(Action::JoinRow { pos: at }, pos, at, false);
                self.log.seal();
            }
        }
    }

    /// Remove the selected text as one undo step. Returns the removed text.
    pub fn delete_selection(&mut self) -> Option<String> {
        let before = self.cursor.pos();
        let action = self.take_selection()?;
        let removed = match &action {
            Action::Delete { text, .. } => text.clone(),
            _ => String::new(),
        };
        let after = self.cursor.pos();
        self.pending_closer = None;
        self.record(action, before, after, false);
        self.log.seal();
        Some(removed)
    }

    /// Copy the selection, or the cursor row in line mode when nothing is selected
    pub fn copy(&self, clipboard: &mut Clipboard) {
        match self.selected_text() {
            Some(text) => clipboard.set(text, false),
            None => {
                let row = self.rows.clamp(self.cursor.pos()).row;
                let text = self.rows.row(row).map_or("", |r| r.raw());
                clipboard.set(text, true);
            }
        }
    }

    /// Cut the selection, or the whole cursor row when nothing is selected
    pub fn cut(&mut self, clipboard: &mut Clipboard) {
        let before = self.cursor.pos();
        if let Some(deleted) = self.take_selection() {
            if let Action::Delete { text, .. } = &deleted {
                clipboard.set(text.clone(), false);
            }
            let after = self.cursor.pos();
            self.commit_batch(vec![deleted], "cut", before, after);
            return;
        }

        let row = self.rows.clamp(before).row;
        let text = self.rows.row(row).map_or_else(String::new, |r| r.raw().to_string());
        clipboard.set(text.clone(), true);

        if self.rows.len() > 1 {
            self.rows.delete_row(row);
            let after = self.rows.clamp(Pos::new(row, 0));
            self.commit_batch(
                vec![Action::DeleteRows {
                    at: row,
                    rows: vec![text],
                }],
                "cut",
                before,
                after,
            );
        } else if !text.is_empty() {
            // The only row stays; empty it instead
            let start = Pos::new(row, 0);
            self.rows.delete_text(start, Pos::new(row, text.len()));
            self.commit_batch(
                vec![Action::Delete {
                    pos: start,
                    text,
                    direction: DeleteDirection::Forward,
                }],
                "cut",
                before,
                start,
            );
        }
    }

    /// Paste the clipboard. Line-mode payloads become rows above the cursor row,
    /// anything else is inserted at the cursor.
    pub fn paste(&mut self, clipboard: &Clipboard) {
        if clipboard.is_empty() {
            return;
        }
        let before = self.cursor.pos();
        let mut actions = Vec::new();
        if let Some(deleted) = self.take_selection() {
            actions.push(deleted);
        }
        let pos = self.cursor.pos();

        let after = if clipboard.is_line_mode() {
            let rows = clipboard.rows();
            for (i, line) in rows.iter().enumerate() {
                self.rows.insert_row(pos.row + i, line.as_str());
            }
            let after = self.rows.clamp(Pos::new(pos.row + rows.len(), pos.col));
            actions.push(Action::InsertRows { at: pos.row, rows });
            after
        } else {
            let text = clipboard.text().to_string();
            let after = self.rows.insert_text(pos, &text);
            actions.push(Action::Insert { pos, text });
            after
        };
        self.commit_batch(actions, "paste", before, after);
    }

    /// Indent every row touched by the selection (or the cursor row)
    pub fn indent_block(&mut self, config: &EditorConfig) {
        let unit = if config.indent_with_tabs {
            "\t".to_string()
        } else {
            " ".repeat(config.tab_size.max(1))
        };
        let (first, last) = self.touched_rows();
        let mut actions = Vec::new();
        for row in first..=last {
            let pos = Pos::new(row, 0);
            self.rows.insert_text(pos, &unit);
            actions.push(Action::Insert {
                pos,
                text: unit.clone(),
            });
        }
        let shift = |p: Pos| {
            if (first..=last).contains(&p.row) {
                Pos::new(p.row, p.col + unit.len())
            } else {
                p
            }
        };
        self.commit_shifted(actions, "indent", shift);
    }

    /// Remove one level of indentation from every row touched by the selection
    pub fn unindent_block(&mut self, config: &EditorConfig) {
        let tab_size = config.tab_size.max(1);
        let (first, last) = self.touched_rows();
        let mut actions = Vec::new();
        let mut removed = vec![0; last - first + 1];
        for row in first..=last {
            let raw = self.rows.row(row).map_or("", |r| r.raw());
            let len = if raw.starts_with('\t') {
                1
            } else {
                raw.bytes().take(tab_size).take_while(|b| *b == b' ').count()
            };
            if len == 0 {
                continue;
            }
            let pos = Pos::new(row, 0);
            let text = self.rows.delete_text(pos, Pos::new(row, len));
            removed[row - first] = len;
            actions.push(Action::Delete {
                pos,
                text,
                direction: DeleteDirection::Forward,
            });
        }
        if actions.is_empty() {
            return;
        }
        let shift = |p: Pos| {
            if (first..=last).contains(&p.row) {
                Pos::new(p.row, p.col.saturating_sub(removed[p.row - first]))
            } else {
                p
            }
        };
        self.commit_shifted(actions, "unindent", shift);
    }

    /// Undo one step. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.log.undo() else {
            return false;
        };
        entry.action.inverse().apply(&mut self.rows);
        let cursor = entry.cursor_before;
        self.cursor.set(self.rows.clamp(cursor));
        self.pending_closer = None;
        true
    }

    /// Redo one step. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.log.redo() else {
            return false;
        };
        entry.action.apply(&mut self.rows);
        let cursor = entry.cursor_after;
        self.cursor.set(self.rows.clamp(cursor));
        self.pending_closer = None;
        true
    }

    /// Find `query` starting at the cursor, wrapping around the document.
    /// The match becomes the selection. Returns false when there is no match.
    pub fn find(&mut self, query: &str, direction: SearchDirection, case_sensitive: bool) -> bool {
        if query.is_empty() {
            return false;
        }
        let found = match direction {
            SearchDirection::Forward => self.find_forward(query, case_sensitive),
            SearchDirection::Backward => self.find_backward(query, case_sensitive),
        };
        let Some(start) = found else {
            return false;
        };
        self.select(start, Pos::new(start.row, start.col + query.len()));
        true
    }

    fn find_forward(&self, query: &str, case_sensitive: bool) -> Option<Pos> {
        let from = self.rows.clamp(self.cursor.pos());
        let count = self.rows.len();
        (0..=count).find_map(|i| {
            let row = (from.row + i) % count;
            let start_col = if i == 0 { from.col } else { 0 };
            let raw = self.rows.row(row)?.raw();
            find_substring(raw.as_bytes(), query.as_bytes(), start_col, case_sensitive)
                .map(|col| Pos::new(row, col))
        })
    }

    fn find_backward(&self, query: &str, case_sensitive: bool) -> Option<Pos> {
        let from = match self.cursor.selection() {
            Some((start, _)) => start,
            None => self.rows.clamp(self.cursor.pos()),
        };
        let count = self.rows.len();
        (0..=count).find_map(|i| {
            let row = (from.row + count * 2 - i) % count;
            let raw = self.rows.row(row)?.raw();
            let limit = if i == 0 { from.col } else { raw.len() + 1 };
            rfind_substring(raw.as_bytes(), query.as_bytes(), limit, case_sensitive)
                .map(|col| Pos::new(row, col))
        })
    }

    // Internals

    /// Delete the selection without recording it. Returns the action describing it.
    fn take_selection(&mut self) -> Option<Action> {
        let (start, end) = self.cursor.selection()?;
        let text = self.rows.delete_text(start, end);
        self.cursor.set(start);
        Some(Action::Delete {
            pos: start,
            text,
            direction: DeleteDirection::Forward,
        })
    }

    fn record(&mut self, action: Action, before: Pos, after: Pos, coalesce: bool) -> Recorded {
        let recorded = self
            .log
            .record(ActionEntry::new(action, before, after), coalesce);
        self.cursor.set(after);
        recorded
    }

    /// Record one action as is, several as a batch
    fn commit(&mut self, mut actions: Vec<Action>, description: &str, before: Pos, after: Pos, coalesce: bool) {
        let action = if actions.len() == 1 {
            actions.remove(0)
        } else {
            Action::Batch {
                actions,
                description: description.to_string(),
            }
        };
        self.record(action, before, after, coalesce);
    }

    /// Record a composite edit that always undoes as one step
    fn commit_batch(&mut self, actions: Vec<Action>, description: &str, before: Pos, after: Pos) {
        self.record(
            Action::Batch {
                actions,
                description: description.to_string(),
            },
            before,
            after,
            false,
        );
        self.log.seal();
        self.pending_closer = None;
    }

    /// Record a block edit and keep the selection, shifted to follow the edited rows
    fn commit_shifted(&mut self, actions: Vec<Action>, description: &str, shift: impl Fn(Pos) -> Pos) {
        let before = self.cursor.pos();
        let anchor = self.rows.clamp(shift(self.cursor.anchor()));
        let head = self.rows.clamp(shift(before));
        self.commit_batch(actions, description, before, head);
        self.cursor.select(anchor, head);
    }

    /// First and last row covered by the selection. A selection ending at column 0
    /// does not include that row.
    fn touched_rows(&self) -> (usize, usize) {
        match self.cursor.selection() {
            Some((start, end)) if end.row > start.row && end.col == 0 => (start.row, end.row - 1),
            Some((start, end)) => (start.row, end.row),
            None => {
                let row = self.rows.clamp(self.cursor.pos()).row;
                (row, row)
            }
        }
    }

    fn char_before(&self, pos: Pos) -> Option<char> {
        let pos = self.rows.clamp(pos);
        self.rows.row(pos.row)?.raw()[..pos.col].chars().next_back()
    }

    fn char_at(&self, pos: Pos) -> Option<char> {
        let pos = self.rows.clamp(pos);
        self.rows.row(pos.row)?.raw()[pos.col..].chars().next()
    }

    fn step_over_closer(&mut self, ch: char) -> bool {
        let pos = self.rows.clamp(self.cursor.pos());
        if self.pending_closer != Some(pos) || self.char_at(pos) != Some(ch) {
            return false;
        }
        self.cursor.set(Pos::new(pos.row, pos.col + ch.len_utf8()));
        self.log.seal();
        self.pending_closer = None;
        true
    }

    fn is_inside_empty_pair(&self, pos: Pos, level: u8) -> bool {
        match (self.char_before(pos), self.char_at(pos)) {
            (Some(open), Some(close)) => closing_pair(open, level) == Some(close),
            _ => false,
        }
    }
}

/// Closing character auto-inserted after `ch` at the given autocomplete level
pub fn closing_pair(ch: char, level: u8) -> Option<char> {
    match (ch, level) {
        (_, 0) => None,
        ('(', _) => Some(')'),
        ('[', _) => Some(']'),
        ('{', _) => Some('}'),
        ('"', 2..) => Some('"'),
        ('\'', 2..) => Some('\''),
        _ => None,
    }
}

fn bytes_match(a: &[u8], b: &[u8], case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// First occurrence of `needle` starting at or after `from`
fn find_substring(haystack: &[u8], needle: &[u8], from: usize, case_sensitive: bool) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len())
        .find(|&i| bytes_match(&haystack[i..i + needle.len()], needle, case_sensitive))
}

/// Last occurrence of `needle` starting before `limit`
fn rfind_substring(haystack: &[u8], needle: &[u8], limit: usize, case_sensitive: bool) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last = (haystack.len() - needle.len() + 1).min(limit);
    (0..last)
        .rev()
        .find(|&i| bytes_match(&haystack[i..i + needle.len()], needle, case_sensitive))
}
