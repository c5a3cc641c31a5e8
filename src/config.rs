use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Editor behavior settings (indentation, autocomplete, undo grouping)
    #[serde(default)]
    pub editor: EditorConfig,

    /// Directories scanned for extra syntax rule sets (`*.json`).
    /// Later rule sets win over built-in ones for the same extension.
    #[serde(default)]
    pub syntax_dirs: Vec<PathBuf>,
}

/// Editor behavior configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EditorConfig {
    /// Number of columns per tab stop
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    /// Automatic closing of brackets and quotes:
    /// 0 = off, 1 = brackets `()[]{}`, 2 = brackets and quotes
    #[serde(default = "default_bracket_autocomplete")]
    pub bracket_autocomplete: u8,

    /// Copy the leading whitespace of the current line onto new lines
    #[serde(default = "default_true")]
    pub auto_indent: bool,

    /// Indent blocks with a tab character instead of `tab_size` spaces
    #[serde(default = "default_true")]
    pub indent_with_tabs: bool,

    /// Group consecutive typing and deleting into a single undo step
    #[serde(default = "default_true")]
    pub coalesce_edits: bool,

    /// Rows moved by page up / page down
    #[serde(default = "default_page_rows")]
    pub page_rows: usize,
}

fn default_tab_size() -> usize {
    4
}

fn default_bracket_autocomplete() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

fn default_page_rows() -> usize {
    20
}

/// Highest accepted `bracket_autocomplete` level
pub const MAX_BRACKET_AUTOCOMPLETE: u8 = 2;

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: default_tab_size(),
            bracket_autocomplete: default_bracket_autocomplete(),
            auto_indent: true,
            indent_with_tabs: true,
            coalesce_edits: true,
            page_rows: default_page_rows(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.editor.validate()
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::ValidationError(
                "tab_size must be greater than 0".to_string(),
            ));
        }
        if self.bracket_autocomplete > MAX_BRACKET_AUTOCOMPLETE {
            return Err(ConfigError::ValidationError(format!(
                "bracket_autocomplete must be between 0 and {MAX_BRACKET_AUTOCOMPLETE}, got {}",
                self.bracket_autocomplete
            )));
        }
        if self.page_rows == 0 {
            return Err(ConfigError::ValidationError(
                "page_rows must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
