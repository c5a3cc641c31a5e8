use crate::model::rows::{DeleteDirection, Pos, RowStore};

/// An invertible edit.
///
/// Each variant carries exactly what is needed to apply it and to build its inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Insert text (may contain newlines) at a position
    Insert { pos: Pos, text: String },

    /// Text removed starting at `pos`
    Delete {
        pos: Pos,
        text: String,
        direction: DeleteDirection,
    },

    /// Split a row at a position
    SplitRow { pos: Pos },

    /// Join row `pos.row + 1` onto row `pos.row`; `pos.col` is the join point
    JoinRow { pos: Pos },

    /// Whole rows inserted starting at index `at`
    InsertRows { at: usize, rows: Vec<String> },

    /// Whole rows removed starting at index `at`
    DeleteRows { at: usize, rows: Vec<String> },

    /// Edits that are undone/redone as one step (paste, cut, indent block, ...)
    Batch {
        actions: Vec<Action>,
        description: String,
    },
}

impl Action {
    /// Returns the action that undoes this one
    pub fn inverse(&self) -> Self {
        match self {
            Self::Insert { pos, text } => Self::Delete {
                pos: *pos,
                text: text.clone(),
                direction: DeleteDirection::Forward,
            },
            Self::Delete { pos, text, .. } => Self::Insert {
                pos: *pos,
                text: text.clone(),
            },
            Self::SplitRow { pos } => Self::JoinRow { pos: *pos },
            Self::JoinRow { pos } => Self::SplitRow { pos: *pos },
            Self::InsertRows { at, rows } => Self::DeleteRows {
                at: *at,
                rows: rows.clone(),
            },
            Self::DeleteRows { at, rows } => Self::InsertRows {
                at: *at,
                rows: rows.clone(),
            },
            Self::Batch {
                actions,
                description,
            } => Self::Batch {
                // Invert all actions in the batch in reverse order
                actions: actions.iter().rev().map(Self::inverse).collect(),
                description: format!("Undo: {description}"),
            },
        }
    }

    /// Apply the forward effect of this action to the rows
    pub fn apply(&self, store: &mut RowStore) {
        match self {
            Self::Insert { pos, text } => {
                store.insert_text(*pos, text);
            }
            Self::Delete { pos, text, .. } => {
                store.delete_text(*pos, text_end(*pos, text));
            }
            Self::SplitRow { pos } => {
                store.split_row(pos.row, pos.col);
            }
            Self::JoinRow { pos } => {
                store.join_row(pos.row);
            }
            Self::InsertRows { at, rows } => {
                for (i, row) in rows.iter().enumerate() {
                    store.insert_row(at + i, row.as_str());
                }
            }
            Self::DeleteRows { at, rows } => {
                for _ in rows {
                    store.delete_row(*at);
                }
            }
            Self::Batch { actions, .. } => {
                for action in actions {
                    action.apply(store);
                }
            }
        }
    }

    /// Short human-readable name, for status messages
    pub fn description(&self) -> &str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::SplitRow { .. } => "split line",
            Self::JoinRow { .. } => "join lines",
            Self::InsertRows { .. } => "insert lines",
            Self::DeleteRows { .. } => "delete lines",
            Self::Batch { description, .. } => description,
        }
    }

    /// Try to fold `next` into this action so both undo as one step.
    ///
    /// Only single-row text edits merge: an insert that continues where this one
    /// ended, or a delete in the same direction that touches this one.
    fn merge(&mut self, next: &Action) -> bool {
        match (self, next) {
            (
                Self::Insert { pos, text },
                Self::Insert {
                    pos: next_pos,
                    text: next_text,
                },
            ) if is_inline(text.as_str())
                && is_inline(next_text)
                && *next_pos == Pos::new(pos.row, pos.col + text.len()) =>
            {
                text.push_str(next_text);
                true
            }
            (
                Self::Delete {
                    pos,
                    text,
                    direction: DeleteDirection::Backward,
                },
                Self::Delete {
                    pos: next_pos,
                    text: next_text,
                    direction: DeleteDirection::Backward,
                },
            ) if is_inline(text.as_str())
                && is_inline(next_text)
                && next_pos.row == pos.row
                && next_pos.col + next_text.len() == pos.col =>
            {
                *pos = *next_pos;
                text.insert_str(0, next_text);
                true
            }
            (
                Self::Delete {
                    pos,
                    text,
                    direction: DeleteDirection::Forward,
                },
                Self::Delete {
                    pos: next_pos,
                    text: next_text,
                    direction: DeleteDirection::Forward,
                },
            ) if is_inline(text.as_str()) && is_inline(next_text) && *next_pos == *pos => {
                text.push_str(next_text);
                true
            }
            _ => false,
        }
    }
}

fn is_inline(text: &str) -> bool {
    !text.contains('\n')
}

/// Position just past `text` inserted at `pos`
pub fn text_end(pos: Pos, text: &str) -> Pos {
    match text.rfind('\n') {
        Some(last_newline) => Pos::new(
            pos.row + text.matches('\n').count(),
            text.len() - last_newline - 1,
        ),
        None => Pos::new(pos.row, pos.col + text.len()),
    }
}

/// A recorded action with the cursor positions around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub action: Action,
    /// Cursor before the action (restored on undo)
    pub cursor_before: Pos,
    /// Cursor after the action (restored on redo)
    pub cursor_after: Pos,
}

impl ActionEntry {
    pub fn new(action: Action, cursor_before: Pos, cursor_after: Pos) -> Self {
        Self {
            action,
            cursor_before,
            cursor_after,
        }
    }
}

/// How [`ActionLog::record`] stored an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// Appended as a new undo step
    Appended,
    /// Folded into the previous undo step
    Merged,
}

/// Undo/redo history of one document.
///
/// Entries live in a vector; `current` counts the applied entries, so `0` is the
/// "before the first action" position and everything at `current..` is the redo tail.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: Vec<ActionEntry>,

    /// Number of applied entries (for undo/redo)
    current: usize,

    /// Position at which the document matched its file. `None` when that
    /// position is unreachable (new buffer, or the saved state was discarded).
    saved_at: Option<usize>,

    /// When set, the next recorded action starts a new undo step
    sealed: bool,
}

impl ActionLog {
    /// Create an empty log for a document that matches its file
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: 0,
            saved_at: Some(0),
            sealed: true,
        }
    }

    /// Create an empty log for a document that was never saved
    pub fn new_unsaved() -> Self {
        Self {
            saved_at: None,
            ..Self::new()
        }
    }

    /// Record an already-applied action.
    ///
    /// If the log is not at its tail the redo tail is discarded first. With
    /// `coalesce` set, the action may be merged into the previous entry instead.
    pub fn record(&mut self, entry: ActionEntry, coalesce: bool) -> Recorded {
        if coalesce
            && !self.sealed
            && self.current == self.entries.len()
            && self.saved_at != Some(self.current)
        {
            if let Some(last) = self.entries.last_mut() {
                if last.action.merge(&entry.action) {
                    last.cursor_after = entry.cursor_after;
                    return Recorded::Merged;
                }
            }
        }

        if self.current < self.entries.len() {
            tracing::debug!(
                "Discarding {} redo entries",
                self.entries.len() - self.current
            );
            self.entries.truncate(self.current);
            if self.saved_at.is_some_and(|saved| saved > self.current) {
                self.saved_at = None;
            }
        }

        self.entries.push(entry);
        self.current = self.entries.len();
        self.sealed = false;
        Recorded::Appended
    }

    /// Step back one entry and return it, or `None` at the start of history.
    /// The caller applies the inverse of the returned action.
    pub fn undo(&mut self) -> Option<&ActionEntry> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        self.sealed = true;
        self.entries.get(self.current)
    }

    /// Step forward one entry and return it, or `None` at the tail.
    /// The caller re-applies the returned action.
    pub fn redo(&mut self) -> Option<&ActionEntry> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        self.sealed = true;
        self.entries.get(self.current - 1)
    }

    /// Break coalescing: the next action starts a new undo step
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Mark the current position as matching the file on disk
    pub fn mark_saved(&mut self) {
        self.saved_at = Some(self.current);
        self.sealed = true;
    }

    /// Net number of edits between the document and its file; zero means unmodified
    pub fn dirty(&self) -> usize {
        match self.saved_at {
            Some(saved) => self.current.abs_diff(saved),
            None => self.current + 1,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty() != 0
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current < self.entries.len()
    }

    /// Number of applied entries
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}
