//! Logical commands delivered by the input layer, grouped by category

use crate::model::cursor::Movement;
use crate::model::document::SearchDirection;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(EditCommand),
    Move { movement: Movement, extend: bool },
    Select(SelectCommand),
    Clipboard(ClipboardCommand),
    History(HistoryCommand),
    File(FileCommand),
    Find {
        query: String,
        direction: SearchDirection,
        case_sensitive: bool,
    },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCommand {
    InsertChar(char),
    InsertNewline,
    /// Tab key: indents the block when the selection spans rows, inserts a tab otherwise
    InsertTab,
    Backspace,
    Delete,
    IndentBlock,
    UnindentBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectCommand {
    Word,
    Line,
    All,
    Collapse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardCommand {
    Cut,
    Copy,
    Paste,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCommand {
    New,
    Open(PathBuf),
    Save,
    SaveAs(PathBuf),
    /// Close the active document
    Close,
    SwitchTo(usize),
    Next,
    Previous,
}

impl From<EditCommand> for Command {
    fn from(cmd: EditCommand) -> Self {
        Self::Edit(cmd)
    }
}

impl From<SelectCommand> for Command {
    fn from(cmd: SelectCommand) -> Self {
        Self::Select(cmd)
    }
}

impl From<ClipboardCommand> for Command {
    fn from(cmd: ClipboardCommand) -> Self {
        Self::Clipboard(cmd)
    }
}

impl From<HistoryCommand> for Command {
    fn from(cmd: HistoryCommand) -> Self {
        Self::History(cmd)
    }
}

impl From<FileCommand> for Command {
    fn from(cmd: FileCommand) -> Self {
        Self::File(cmd)
    }
}
