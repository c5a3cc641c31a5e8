//! Key translation for the terminal front end
//!
//! Maps crossterm key events onto session commands, and runs the one-line prompt
//! used for find, open, save as and goto line.

use crate::app::Session;
use crate::app::commands::{
    ClipboardCommand, Command, EditCommand, FileCommand, HistoryCommand, SelectCommand,
};
use crate::model::cursor::Movement;
use crate::model::document::SearchDirection;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

/// Type of prompt - determines what happens when the user confirms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptType {
    Search,
    SearchBackward,
    OpenFile,
    SaveFileAs,
    GotoLine,
}

impl PromptType {
    fn message(self) -> &'static str {
        match self {
            Self::Search => "Search: ",
            Self::SearchBackward => "Search backward: ",
            Self::OpenFile => "Open file: ",
            Self::SaveFileAs => "Save as: ",
            Self::GotoLine => "Go to line: ",
        }
    }
}

/// Prompt state for the bottom line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub message: String,
    pub input: String,
    pub prompt_type: PromptType,
}

impl Prompt {
    pub fn new(prompt_type: PromptType) -> Self {
        Self {
            message: prompt_type.message().to_string(),
            input: String::new(),
            prompt_type,
        }
    }

    /// Smart case: any uppercase letter makes the search case sensitive
    fn find(&self, direction: SearchDirection) -> Command {
        Command::Find {
            query: self.input.clone(),
            direction,
            case_sensitive: self.input.chars().any(char::is_uppercase),
        }
    }

    /// Command for the current input, or an error message if it is not usable
    fn confirm(&self) -> Result<Command, String> {
        let input = self.input.trim();
        match self.prompt_type {
            PromptType::Search => Ok(self.find(SearchDirection::Forward)),
            PromptType::SearchBackward => Ok(self.find(SearchDirection::Backward)),
            PromptType::OpenFile => Ok(FileCommand::Open(PathBuf::from(input)).into()),
            PromptType::SaveFileAs => Ok(FileCommand::SaveAs(PathBuf::from(input)).into()),
            PromptType::GotoLine => input
                .parse::<usize>()
                .map(|line| Command::Move {
                    movement: Movement::GotoLine(line),
                    extend: false,
                })
                .map_err(|_| format!("Not a line number: {input}")),
        }
    }
}

/// What a key press in the prompt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Keep editing the prompt
    Pending,
    Cancelled,
    Confirmed(Command),
    /// Confirmed with input that could not be used
    Invalid(String),
}

/// Result of translating a key in normal editing mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    OpenPrompt(PromptType),
}

impl From<Command> for KeyAction {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

fn movement(movement: Movement, extend: bool) -> KeyAction {
    Command::Move { movement, extend }.into()
}

/// Translate a key press in editing mode. Unbound keys give `None`.
pub fn translate_key(key: KeyEvent) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    let action = match key.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'q' => Command::Quit.into(),
            's' if shift => KeyAction::OpenPrompt(PromptType::SaveFileAs),
            's' => Command::from(FileCommand::Save).into(),
            'n' => Command::from(FileCommand::New).into(),
            'o' => KeyAction::OpenPrompt(PromptType::OpenFile),
            'w' => Command::from(FileCommand::Close).into(),
            'f' => KeyAction::OpenPrompt(PromptType::Search),
            'r' => KeyAction::OpenPrompt(PromptType::SearchBackward),
            'g' => KeyAction::OpenPrompt(PromptType::GotoLine),
            'z' => Command::from(HistoryCommand::Undo).into(),
            'y' => Command::from(HistoryCommand::Redo).into(),
            'x' => Command::from(ClipboardCommand::Cut).into(),
            'c' => Command::from(ClipboardCommand::Copy).into(),
            'v' => Command::from(ClipboardCommand::Paste).into(),
            'a' => Command::from(SelectCommand::All).into(),
            'd' => Command::from(SelectCommand::Word).into(),
            'l' => Command::from(SelectCommand::Line).into(),
            ']' => Command::from(EditCommand::IndentBlock).into(),
            '[' => Command::from(EditCommand::UnindentBlock).into(),
            _ => return None,
        },
        KeyCode::Char(c) if alt => match c {
            '1'..='9' => Command::from(FileCommand::SwitchTo(c as usize - '1' as usize)).into(),
            _ => return None,
        },
        KeyCode::Char(c) => Command::from(EditCommand::InsertChar(c)).into(),
        KeyCode::Enter => Command::from(EditCommand::InsertNewline).into(),
        KeyCode::Tab => Command::from(EditCommand::InsertTab).into(),
        KeyCode::BackTab => Command::from(EditCommand::UnindentBlock).into(),
        KeyCode::Backspace => Command::from(EditCommand::Backspace).into(),
        KeyCode::Delete => Command::from(EditCommand::Delete).into(),
        KeyCode::Esc => Command::from(SelectCommand::Collapse).into(),

        KeyCode::Left if alt => Command::from(FileCommand::Previous).into(),
        KeyCode::Right if alt => Command::from(FileCommand::Next).into(),
        KeyCode::Left if ctrl => movement(Movement::WordLeft, shift),
        KeyCode::Right if ctrl => movement(Movement::WordRight, shift),
        KeyCode::Left => movement(Movement::Left, shift),
        KeyCode::Right => movement(Movement::Right, shift),
        KeyCode::Up => movement(Movement::Up, shift),
        KeyCode::Down => movement(Movement::Down, shift),
        KeyCode::Home if ctrl => movement(Movement::DocumentStart, shift),
        KeyCode::End if ctrl => movement(Movement::DocumentEnd, shift),
        KeyCode::Home => movement(Movement::LineStart, shift),
        KeyCode::End => movement(Movement::LineEnd, shift),
        KeyCode::PageUp => movement(Movement::PageUp, shift),
        KeyCode::PageDown => movement(Movement::PageDown, shift),
        _ => return None,
    };
    Some(action)
}

/// Feed a key press to an open prompt
pub fn handle_prompt_key(prompt: &mut Prompt, key: KeyEvent) -> PromptOutcome {
    match key.code {
        KeyCode::Esc => PromptOutcome::Cancelled,
        KeyCode::Enter if prompt.input.trim().is_empty() => PromptOutcome::Cancelled,
        KeyCode::Enter => match prompt.confirm() {
            Ok(command) => PromptOutcome::Confirmed(command),
            Err(message) => PromptOutcome::Invalid(message),
        },
        KeyCode::Backspace => {
            prompt.input.pop();
            PromptOutcome::Pending
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.input.push(c);
            PromptOutcome::Pending
        }
        _ => PromptOutcome::Pending,
    }
}

/// Routes key presses either to the open prompt or, through [`translate_key`], to the session
#[derive(Debug, Default)]
pub struct KeyDispatcher {
    prompt: Option<Prompt>,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The prompt being edited, if any
    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn handle_key(&mut self, key: KeyEvent, session: &mut Session) {
        if let Some(prompt) = self.prompt.as_mut() {
            match handle_prompt_key(prompt, key) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancelled => self.prompt = None,
                PromptOutcome::Confirmed(command) => {
                    self.prompt = None;
                    session.dispatch(command);
                }
                PromptOutcome::Invalid(message) => {
                    self.prompt = None;
                    session.set_status(message);
                }
            }
            return;
        }

        match translate_key(key) {
            Some(KeyAction::Command(command)) => session.dispatch(command),
            Some(KeyAction::OpenPrompt(prompt_type)) => self.prompt = Some(Prompt::new(prompt_type)),
            None => tracing::trace!("Unbound key: {:?}", key),
        }
    }
}
