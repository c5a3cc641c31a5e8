//! Cursor position, selection and movement

use crate::model::rows::{Pos, RowStore};
use crate::primitives::char_class::{class_run, CharClass};

/// Cursor movements requested by the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Left,
    Right,
    Up,
    Down,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
    DocumentStart,
    DocumentEnd,
    /// Jump to a 1-based line number (clamped)
    GotoLine(usize),
}

/// Cursor with a selection anchor.
///
/// The selection runs between `anchor` and `head`; it is empty when they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    head: Pos,
    anchor: Pos,
    /// Display column to return to when moving vertically through shorter rows
    desired_rx: Option<usize>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(pos: Pos) -> Self {
        Self {
            head: pos,
            anchor: pos,
            desired_rx: None,
        }
    }

    /// Current position (the selection head)
    pub fn pos(&self) -> Pos {
        self.head
    }

    pub fn anchor(&self) -> Pos {
        self.anchor
    }

    /// Move the cursor and collapse the selection onto it
    pub fn set(&mut self, pos: Pos) {
        *self = Self::at(pos);
    }

    /// Move the head; when `extend` is false the anchor follows
    pub fn move_to(&mut self, pos: Pos, extend: bool) {
        self.head = pos;
        if !extend {
            self.anchor = pos;
        }
        self.desired_rx = None;
    }

    /// Select from `anchor` to `head`
    pub fn select(&mut self, anchor: Pos, head: Pos) {
        self.anchor = anchor;
        self.head = head;
        self.desired_rx = None;
    }

    pub fn collapse(&mut self) {
        self.anchor = self.head;
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    /// Ordered selection range, or `None` when the selection is empty
    pub fn selection(&self) -> Option<(Pos, Pos)> {
        if !self.has_selection() {
            return None;
        }
        Some(if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        })
    }

    /// Apply a movement. With `extend` set only the head moves.
    pub fn apply(&mut self, movement: Movement, extend: bool, rows: &RowStore, page_rows: usize) {
        let pos = rows.clamp(self.head);

        // A plain horizontal move with an active selection lands on its edge.
        if !extend {
            if let Some((start, end)) = self.selection() {
                match movement {
                    Movement::Left => return self.set(start),
                    Movement::Right => return self.set(end),
                    _ => {}
                }
            }
        }

        let target = match movement {
            Movement::Up => return self.move_vertical(pos, -1, extend, rows),
            Movement::Down => return self.move_vertical(pos, 1, extend, rows),
            Movement::PageUp => {
                return self.move_vertical(pos, -(page_rows.max(1) as isize), extend, rows)
            }
            Movement::PageDown => {
                return self.move_vertical(pos, page_rows.max(1) as isize, extend, rows)
            }
            Movement::Left => left_of(pos, rows),
            Movement::Right => right_of(pos, rows),
            Movement::WordLeft => word_left_of(pos, rows),
            Movement::WordRight => word_right_of(pos, rows),
            Movement::LineStart => Pos::new(pos.row, 0),
            Movement::LineEnd => Pos::new(pos.row, rows.row_len(pos.row)),
            Movement::DocumentStart => Pos::new(0, 0),
            Movement::DocumentEnd => rows.end(),
            Movement::GotoLine(line) => rows.clamp(Pos::new(line.saturating_sub(1), 0)),
        };
        self.move_to(target, extend);
    }

    fn move_vertical(&mut self, pos: Pos, delta: isize, extend: bool, rows: &RowStore) {
        let tab_size = rows.tab_size();
        let Some(row) = rows.row(pos.row) else {
            return;
        };
        let rx = self
            .desired_rx
            .unwrap_or_else(|| row.cx_to_rx(pos.col, tab_size));

        let last = rows.len().saturating_sub(1);
        let target_row = pos.row.saturating_add_signed(delta).min(last);
        let col = rows
            .row(target_row)
            .map_or(0, |row| row.rx_to_cx(rx, tab_size));

        self.head = Pos::new(target_row, col);
        if !extend {
            self.anchor = self.head;
        }
        self.desired_rx = Some(rx);
    }

    /// Select the run of same-class characters under the cursor
    pub fn select_word(&mut self, rows: &RowStore) {
        let (start, end) = word_at(rows.clamp(self.head), rows);
        self.select(start, end);
    }

    /// Select the cursor row including its line break
    pub fn select_line(&mut self, rows: &RowStore) {
        let row = rows.clamp(self.head).row;
        let end = if row + 1 < rows.len() {
            Pos::new(row + 1, 0)
        } else {
            Pos::new(row, rows.row_len(row))
        };
        self.select(Pos::new(row, 0), end);
    }

    pub fn select_all(&mut self, rows: &RowStore) {
        self.select(Pos::new(0, 0), rows.end());
    }
}

/// Range of the word (run of one character class) at `pos`.
/// At the end of a non-empty row the run before the cursor is used.
pub fn word_at(pos: Pos, rows: &RowStore) -> (Pos, Pos) {
    let Some(row) = rows.row(pos.row) else {
        return (pos, pos);
    };
    let bytes = row.raw().as_bytes();
    if bytes.is_empty() {
        return (pos, pos);
    }
    let (start, end) = class_run(bytes, pos.col.min(bytes.len() - 1));
    (Pos::new(pos.row, start), Pos::new(pos.row, end))
}

fn left_of(pos: Pos, rows: &RowStore) -> Pos {
    if pos.col > 0 {
        let col = rows.row(pos.row).map_or(0, |row| row.prev_col(pos.col));
        Pos::new(pos.row, col)
    } else if pos.row > 0 {
        Pos::new(pos.row - 1, rows.row_len(pos.row - 1))
    } else {
        pos
    }
}

fn right_of(pos: Pos, rows: &RowStore) -> Pos {
    let len = rows.row_len(pos.row);
    if pos.col < len {
        let col = rows.row(pos.row).map_or(len, |row| row.next_col(pos.col));
        Pos::new(pos.row, col)
    } else if pos.row + 1 < rows.len() {
        Pos::new(pos.row + 1, 0)
    } else {
        pos
    }
}

fn word_left_of(pos: Pos, rows: &RowStore) -> Pos {
    if pos.col == 0 {
        return left_of(pos, rows);
    }
    let bytes = rows.row(pos.row).map_or(&b""[..], |row| row.raw().as_bytes());
    let mut col = pos.col;
    while col > 0 && CharClass::of(bytes[col - 1]) == CharClass::Whitespace {
        col -= 1;
    }
    if col > 0 {
        col = class_run(bytes, col - 1).0;
    }
    Pos::new(pos.row, col)
}

fn word_right_of(pos: Pos, rows: &RowStore) -> Pos {
    let len = rows.row_len(pos.row);
    if pos.col >= len {
        return right_of(pos, rows);
    }
    let bytes = rows.row(pos.row).map_or(&b""[..], |row| row.raw().as_bytes());
    let mut col = pos.col;
    while col < len && CharClass::of(bytes[col]) == CharClass::Whitespace {
        col += 1;
    }
    if col < len {
        col = class_run(bytes, col).1;
    }
    Pos::new(pos.row, col)
}
