//! Lexical syntax highlighting
//!
//! # Design
//! - **Per-row scan**: a row is highlighted by a single linear pass over its render text.
//! - **Pure function**: [`highlight_row`] takes the row text and its entry state and returns
//!   the tags plus the exit state. It touches nothing else, so propagation across rows is a
//!   plain fixed-point loop driven by the row store.
//! - **Multi-line constructs**: block comments (and strings, where the language allows them
//!   to span lines or when a row ends in an escape) are carried to the next row via
//!   [`HighlightState`].

use crate::primitives::char_class::{is_identifier, is_token_boundary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Highlight tag attached to every render byte of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightTag {
    #[default]
    Normal,
    Comment,
    BlockComment,
    Keyword,
    Type,
    Builtin,
    String,
    Number,
}

/// Lexical state flowing into and out of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HighlightState {
    #[default]
    Normal,
    /// Inside an unterminated block comment
    BlockComment,
    /// Inside an unterminated string opened with `delimiter`
    String { delimiter: u8 },
}

/// Category a keyword is highlighted as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Keyword,
    Type,
    Builtin,
}

impl KeywordKind {
    pub fn tag(self) -> HighlightTag {
        match self {
            Self::Keyword => HighlightTag::Keyword,
            Self::Type => HighlightTag::Type,
            Self::Builtin => HighlightTag::Builtin,
        }
    }
}

/// Highlighting rules for one language.
///
/// Rule sets are immutable once loaded and shared (behind `Arc`) by every
/// document of that language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxRuleSet {
    /// Display name shown in the status bar (e.g. "C", "Rust")
    pub name: String,

    /// File extensions (without the dot) that select this rule set
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub keywords: HashMap<String, KeywordKind>,

    /// Markers that comment out the rest of the row
    #[serde(default)]
    pub singleline_comments: Vec<String>,

    /// Block comment start and end markers
    #[serde(default)]
    pub multiline_comment: Option<(String, String)>,

    /// Bytes that open and close a string literal
    #[serde(default)]
    pub string_delimiters: String,

    #[serde(default)]
    pub highlight_numbers: bool,

    /// Whether an unterminated string continues on the next row
    #[serde(default)]
    pub multiline_strings: bool,
}

impl SyntaxRuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extensions: Vec::new(),
            keywords: HashMap::new(),
            singleline_comments: Vec::new(),
            multiline_comment: None,
            string_delimiters: String::new(),
            highlight_numbers: false,
            multiline_strings: false,
        }
    }

    /// Check whether the rule set applies to a file path, by extension
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    fn block_comment(&self) -> Option<(&[u8], &[u8])> {
        self.multiline_comment
            .as_ref()
            .filter(|(start, end)| !start.is_empty() && !end.is_empty())
            .map(|(start, end)| (start.as_bytes(), end.as_bytes()))
    }

    fn keyword_at(&self, word: &[u8]) -> Option<HighlightTag> {
        let word = std::str::from_utf8(word).ok()?;
        self.keywords.get(word).map(|kind| kind.tag())
    }
}

/// Highlight one row of render text.
///
/// `entry` is the exit state of the previous row (or `Normal` for the first row).
/// Returns one tag per byte of `text` and the state the row leaves open. All bytes
/// of a multi-byte character get the same tag, since every delimiter is ASCII and
/// non-ASCII bytes count as identifier bytes.
/// Without a rule set every byte is `Normal` and the exit state is always `Normal`.
pub fn highlight_row(
    text: &[u8],
    entry: HighlightState,
    syntax: Option<&SyntaxRuleSet>,
) -> (Vec<HighlightTag>, HighlightState) {
    let mut tags = vec![HighlightTag::Normal; text.len()];
    let Some(syntax) = syntax else {
        return (tags, HighlightState::Normal);
    };

    let block_comment = syntax.block_comment();
    let mut state = entry;
    let mut prev_boundary = true;
    let mut i = 0;

    while i < text.len() {
        let byte = text[i];

        match state {
            HighlightState::BlockComment => {
                match block_comment {
                    Some((_, end)) if text[i..].starts_with(end) => {
                        tags[i..i + end.len()].fill(HighlightTag::BlockComment);
                        i += end.len();
                        state = HighlightState::Normal;
                        prev_boundary = true;
                    }
                    _ => {
                        tags[i] = HighlightTag::BlockComment;
                        i += 1;
                    }
                }
                continue;
            }
            HighlightState::String { delimiter } => {
                tags[i] = HighlightTag::String;
                if byte == b'\\' {
                    if i + 1 < text.len() {
                        tags[i + 1] = HighlightTag::String;
                        i += 2;
                        continue;
                    }
                    // Escape pending at end of row: the string continues.
                    return (tags, state);
                }
                if byte == delimiter {
                    state = HighlightState::Normal;
                    prev_boundary = true;
                }
                i += 1;
                continue;
            }
            HighlightState::Normal => {}
        }

        if syntax
            .singleline_comments
            .iter()
            .any(|marker| !marker.is_empty() && text[i..].starts_with(marker.as_bytes()))
        {
            tags[i..].fill(HighlightTag::Comment);
            break;
        }

        if let Some((start, _)) = block_comment {
            if text[i..].starts_with(start) {
                tags[i..i + start.len()].fill(HighlightTag::BlockComment);
                i += start.len();
                state = HighlightState::BlockComment;
                continue;
            }
        }

        if syntax.string_delimiters.as_bytes().contains(&byte) {
            tags[i] = HighlightTag::String;
            state = HighlightState::String { delimiter: byte };
            i += 1;
            continue;
        }

        let prev_tag = if i > 0 { tags[i - 1] } else { HighlightTag::Normal };
        if syntax.highlight_numbers
            && ((byte.is_ascii_digit() && (prev_boundary || prev_tag == HighlightTag::Number))
                || (byte == b'.' && prev_tag == HighlightTag::Number))
        {
            tags[i] = HighlightTag::Number;
            prev_boundary = false;
            i += 1;
            continue;
        }

        if prev_boundary && is_identifier(byte) {
            let end = text[i..]
                .iter()
                .position(|&b| !is_identifier(b))
                .map_or(text.len(), |offset| i + offset);
            if let Some(tag) = syntax.keyword_at(&text[i..end]) {
                tags[i..end].fill(tag);
            }
            prev_boundary = false;
            i = end;
            continue;
        }

        prev_boundary = is_token_boundary(byte);
        i += 1;
    }

    let exit = match state {
        HighlightState::String { .. } if !syntax.multiline_strings => HighlightState::Normal,
        other => other,
    };
    (tags, exit)
}
