//! Editing session: the context every command runs against
//!
//! The session owns the configuration, the open documents, the shared clipboard,
//! the syntax database and the status log. Nothing here is global; the input layer
//! hands commands to [`Session::dispatch`] (or to one of the per-category entry points)
//! and the renderer reads state back through accessors.

pub mod commands;
pub mod registry;
pub mod status;

use self::commands::{
    ClipboardCommand, Command, EditCommand, FileCommand, HistoryCommand, SelectCommand,
};
use self::registry::{DocumentHandle, FileRegistry, RegistryError};
use self::status::StatusLog;
use crate::config::{Config, ConfigError};
use crate::model::clipboard::Clipboard;
use crate::model::cursor::Movement;
use crate::model::document::{Document, SearchDirection};
use crate::model::file_io::{FileIo, LocalFileIo};
use crate::model::rows::DeleteDirection;
use crate::primitives::syntax_db::SyntaxDb;
use std::path::{Path, PathBuf};

pub struct Session {
    config: Config,
    registry: FileRegistry,
    clipboard: Clipboard,
    syntax_db: SyntaxDb,
    status: StatusLog,
    file_io: Box<dyn FileIo>,
    next_untitled: u32,
    /// Set by a quit request refused because of unsaved changes
    quit_pending: bool,
    should_quit: bool,
}

impl Session {
    pub fn new(config: Config, syntax_db: SyntaxDb, file_io: Box<dyn FileIo>) -> Self {
        Self {
            config,
            registry: FileRegistry::new(),
            clipboard: Clipboard::new(),
            syntax_db,
            status: StatusLog::new(),
            file_io,
            next_untitled: 1,
            quit_pending: false,
            should_quit: false,
        }
    }

    /// Session on the local filesystem with the built-in rule sets plus those found
    /// in the configured syntax directories
    pub fn with_local_io(config: Config) -> Self {
        let mut syntax_db = SyntaxDb::builtin();
        let mut failures = Vec::new();
        for dir in &config.syntax_dirs {
            match syntax_db.load_dir(dir) {
                Ok(count) => tracing::info!("Loaded {} syntax rule sets from {}", count, dir.display()),
                Err(e) => {
                    tracing::warn!("Failed to load syntax rules: {:#}", e);
                    failures.push(format!("Syntax rules not loaded: {e:#}"));
                }
            }
        }
        let mut session = Self::new(config, syntax_db, Box::new(LocalFileIo::new()));
        for message in failures {
            session.status.push(message);
        }
        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn syntax_db(&self) -> &SyntaxDb {
        &self.syntax_db
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.push(message);
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.registry.active()
    }

    pub fn active_document_mut(&mut self) -> Option<&mut Document> {
        self.registry.active_mut()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Any document with changes not written to disk
    pub fn has_unsaved_changes(&self) -> bool {
        self.registry.iter().any(Document::is_dirty)
    }

    /// Route a command to its category entry point
    pub fn dispatch(&mut self, command: Command) {
        if command != Command::Quit {
            self.quit_pending = false;
        }
        match command {
            Command::Edit(cmd) => self.edit(cmd),
            Command::Move { movement, extend } => self.move_cursor(movement, extend),
            Command::Select(cmd) => self.select(cmd),
            Command::Clipboard(cmd) => self.clipboard_command(cmd),
            Command::History(cmd) => self.history(cmd),
            Command::File(cmd) => self.file(cmd),
            Command::Find {
                query,
                direction,
                case_sensitive,
            } => self.find(&query, direction, case_sensitive),
            Command::Quit => self.request_quit(),
        }
    }

    pub fn edit(&mut self, command: EditCommand) {
        let config = &self.config.editor;
        let Some(doc) = self.registry.active_mut() else {
            return;
        };
        match command {
            EditCommand::InsertChar(ch) => doc.insert_char(ch, config),
            EditCommand::InsertNewline => doc.insert_newline(config),
            EditCommand::InsertTab => match doc.cursor().selection() {
                Some((start, end)) if start.row != end.row => doc.indent_block(config),
                _ if config.indent_with_tabs => doc.insert_char('\t', config),
                _ => {
                    for _ in 0..config.tab_size {
                        doc.insert_char(' ', config);
                    }
                }
            },
            EditCommand::Backspace => doc.delete(DeleteDirection::Backward, config),
            EditCommand::Delete => doc.delete(DeleteDirection::Forward, config),
            EditCommand::IndentBlock => doc.indent_block(config),
            EditCommand::UnindentBlock => doc.unindent_block(config),
        }
    }

    pub fn move_cursor(&mut self, movement: Movement, extend: bool) {
        let page_rows = self.config.editor.page_rows;
        if let Some(doc) = self.registry.active_mut() {
            doc.move_cursor(movement, extend, page_rows);
        }
    }

    pub fn select(&mut self, command: SelectCommand) {
        let Some(doc) = self.registry.active_mut() else {
            return;
        };
        match command {
            SelectCommand::Word => doc.select_word(),
            SelectCommand::Line => doc.select_line(),
            SelectCommand::All => doc.select_all(),
            SelectCommand::Collapse => doc.collapse_selection(),
        }
    }

    pub fn clipboard_command(&mut self, command: ClipboardCommand) {
        let Some(doc) = self.registry.active_mut() else {
            return;
        };
        match command {
            ClipboardCommand::Cut => doc.cut(&mut self.clipboard),
            ClipboardCommand::Copy => doc.copy(&mut self.clipboard),
            ClipboardCommand::Paste => doc.paste(&self.clipboard),
        }
    }

    pub fn history(&mut self, command: HistoryCommand) {
        let Some(doc) = self.registry.active_mut() else {
            return;
        };
        let applied = match command {
            HistoryCommand::Undo => doc.undo(),
            HistoryCommand::Redo => doc.redo(),
        };
        if !applied {
            tracing::trace!("{:?} at history boundary", command);
        }
    }

    pub fn find(&mut self, query: &str, direction: SearchDirection, case_sensitive: bool) {
        let Some(doc) = self.registry.active_mut() else {
            return;
        };
        if !doc.find(query, direction, case_sensitive) {
            self.status.push(format!("Not found: {query}"));
        }
    }

    pub fn file(&mut self, command: FileCommand) {
        match command {
            FileCommand::New => {
                let _ = self.new_untitled();
            }
            FileCommand::Open(path) => {
                let _ = self.open_file(&path);
            }
            FileCommand::Save => {
                self.save_active();
            }
            FileCommand::SaveAs(path) => {
                self.save_active_as(path);
            }
            FileCommand::Close => self.close(self.registry.active_index()),
            FileCommand::SwitchTo(index) => self.switch_to(index),
            FileCommand::Next => {
                let count = self.registry.len();
                if count > 0 {
                    self.switch_to((self.registry.active_index() + 1) % count);
                }
            }
            FileCommand::Previous => {
                let count = self.registry.len();
                if count > 0 {
                    self.switch_to((self.registry.active_index() + count - 1) % count);
                }
            }
        }
    }

    /// Open an empty `Untitled-N` document and make it active
    pub fn new_untitled(&mut self) -> Result<DocumentHandle, RegistryError> {
        let id = self.next_untitled;
        let doc = Document::new_untitled(id, self.config.editor.tab_size);
        let handle = self.add_document(doc)?;
        self.next_untitled += 1;
        Ok(handle)
    }

    /// Open `path` and make it active. An already open file is just switched to.
    ///
    /// A missing file opens as an empty document bound to that path; any other
    /// load failure is reported and opens an untitled buffer instead.
    pub fn open_file(&mut self, path: &Path) -> Result<DocumentHandle, RegistryError> {
        if let Some(handle) = self
            .registry
            .find_by_path(path)
            .and_then(|index| self.registry.handle_at(index))
        {
            self.registry.switch_to(handle.index());
            return Ok(handle);
        }
        if self.registry.is_full() {
            let err = RegistryError::Full {
                capacity: self.registry.capacity(),
            };
            self.status.push(err.to_string());
            return Err(err);
        }

        let tab_size = self.config.editor.tab_size;
        let syntax = self.syntax_db.find_for_path(path);
        match self.file_io.load(path) {
            Ok(loaded) => {
                tracing::info!("Opened {} ({} lines)", path.display(), loaded.lines.len());
                self.status.push(format!(
                    "Opened {} ({} lines, {}, {})",
                    path.display(),
                    loaded.lines.len(),
                    loaded.format.line_ending.display_name(),
                    loaded.format.encoding.display_name()
                ));
                self.add_document(Document::from_loaded(path, loaded, tab_size, syntax))
            }
            Err(e) if is_not_found(&e) => {
                self.status.push(format!("New file {}", path.display()));
                self.add_document(Document::new_file(path, tab_size, syntax))
            }
            Err(e) => {
                tracing::warn!("Failed to open {}: {:#}", path.display(), e);
                self.status.push(format!("Could not open {}: {e:#}", path.display()));
                self.new_untitled()
            }
        }
    }

    /// Write the active document to its path. Untitled documents need [`Self::save_active_as`].
    pub fn save_active(&mut self) -> bool {
        let Some(path) = self.active_document().and_then(|d| d.path().map(Path::to_path_buf)) else {
            self.status.push("No file name; use save as");
            return false;
        };
        self.write_active(&path)
    }

    /// Write the active document to `path` and rebind it there
    pub fn save_active_as(&mut self, path: PathBuf) -> bool {
        if !self.write_active(&path) {
            return false;
        }
        let syntax = self.syntax_db.find_for_path(&path);
        if let Some(doc) = self.registry.active_mut() {
            doc.set_path(path, syntax);
        }
        true
    }

    fn write_active(&mut self, path: &Path) -> bool {
        let Some(doc) = self.registry.active_mut() else {
            return false;
        };
        let result = self.file_io.save(path, &doc.lines(), doc.format());
        match result {
            Ok(()) => {
                doc.mark_saved();
                let count = doc.rows().len();
                self.status
                    .push(format!("Wrote {} lines to {}", count, path.display()));
                true
            }
            Err(e) => {
                tracing::warn!("Failed to save {}: {:#}", path.display(), e);
                self.status.push(format!("Save failed: {e:#}"));
                false
            }
        }
    }

    /// Close the document at `index`. The active index is re-resolved afterwards;
    /// closing the last document leaves a fresh untitled one.
    pub fn close(&mut self, index: usize) {
        let active = self.registry.active_index();
        if self.registry.remove(index).is_none() {
            return;
        }
        if self.registry.is_empty() {
            let _ = self.new_untitled();
            return;
        }
        let active = if index < active { active - 1 } else { active };
        self.registry
            .switch_to(active.min(self.registry.len() - 1));
    }

    /// Switch documents. Out-of-range indices are ignored.
    pub fn switch_to(&mut self, index: usize) {
        self.registry.switch_to(index);
    }

    /// Apply a new tab width to the configuration and every open document
    pub fn set_tab_size(&mut self, tab_size: usize) -> Result<(), ConfigError> {
        let mut editor = self.config.editor.clone();
        editor.tab_size = tab_size;
        editor.validate()?;
        self.config.editor = editor;
        for doc in self.registry.iter_mut() {
            doc.set_tab_size(tab_size);
        }
        Ok(())
    }

    pub fn set_bracket_autocomplete(&mut self, level: u8) -> Result<(), ConfigError> {
        let mut editor = self.config.editor.clone();
        editor.bracket_autocomplete = level;
        editor.validate()?;
        self.config.editor = editor;
        Ok(())
    }

    /// Quit, unless documents have unsaved changes; then a second request is needed
    pub fn request_quit(&mut self) {
        if self.quit_pending || !self.has_unsaved_changes() {
            self.should_quit = true;
            return;
        }
        self.quit_pending = true;
        self.status
            .push("Unsaved changes. Quit again to discard them");
    }

    fn add_document(&mut self, doc: Document) -> Result<DocumentHandle, RegistryError> {
        match self.registry.add(doc) {
            Ok(handle) => {
                self.registry.switch_to(handle.index());
                Ok(handle)
            }
            Err(e) => {
                self.status.push(e.to_string());
                Err(e)
            }
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
