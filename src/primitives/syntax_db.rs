//! Syntax rule set database
//!
//! Holds the built-in rule sets plus any loaded from JSON files, and picks one
//! for a document by file extension.

use crate::primitives::highlighter::{KeywordKind, SyntaxRuleSet};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SyntaxDb {
    rule_sets: Vec<Arc<SyntaxRuleSet>>,
}

impl SyntaxDb {
    /// Create an empty database (every document is plain text)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a database with the built-in languages
    pub fn builtin() -> Self {
        let mut db = Self::empty();
        db.add(c_rules());
        db.add(rust_rules());
        db.add(python_rules());
        db.add(javascript_rules());
        db
    }

    /// Add a rule set. A later rule set takes precedence for extensions it shares
    /// with an earlier one.
    pub fn add(&mut self, rules: SyntaxRuleSet) {
        self.rule_sets.push(Arc::new(rules));
    }

    /// Load every `*.json` rule set in `dir`. Returns how many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read syntax directory {}", dir.display()))?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in &paths {
            let rules = Self::load_file(path)?;
            tracing::debug!("Loaded syntax rules '{}' from {}", rules.name, path.display());
            self.add(rules);
        }
        Ok(paths.len())
    }

    /// Parse a single JSON rule set file
    pub fn load_file(path: &Path) -> Result<SyntaxRuleSet> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read syntax file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid syntax file {}", path.display()))
    }

    /// Find the rule set for a path by extension
    pub fn find_for_path(&self, path: &Path) -> Option<Arc<SyntaxRuleSet>> {
        self.rule_sets
            .iter()
            .rev()
            .find(|rules| rules.matches_path(path))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rule_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_sets.is_empty()
    }
}

fn rule_set(
    name: &str,
    extensions: &[&str],
    keywords: &[(&[&str], KeywordKind)],
    singleline_comments: &[&str],
    multiline_comment: Option<(&str, &str)>,
    string_delimiters: &str,
) -> SyntaxRuleSet {
    let mut rules = SyntaxRuleSet::new(name);
    rules.extensions = extensions.iter().map(|e| e.to_string()).collect();
    for (words, kind) in keywords {
        for word in words.iter() {
            rules.keywords.insert(word.to_string(), *kind);
        }
    }
    rules.singleline_comments = singleline_comments.iter().map(|m| m.to_string()).collect();
    rules.multiline_comment = multiline_comment.map(|(s, e)| (s.to_string(), e.to_string()));
    rules.string_delimiters = string_delimiters.to_string();
    rules.highlight_numbers = true;
    rules
}

fn c_rules() -> SyntaxRuleSet {
    rule_set(
        "C",
        &["c", "h", "cpp", "hpp", "cc", "cxx"],
        &[
            (
                &[
                    "switch", "if", "while", "for", "break", "continue", "return", "else",
                    "struct", "union", "typedef", "static", "enum", "class", "case", "default",
                    "do", "goto", "sizeof", "const", "extern", "volatile", "inline",
                ],
                KeywordKind::Keyword,
            ),
            (
                &[
                    "int", "long", "double", "float", "char", "unsigned", "signed", "void",
                    "short", "bool", "size_t", "uint8_t", "uint32_t", "int64_t",
                ],
                KeywordKind::Type,
            ),
            (&["NULL", "true", "false"], KeywordKind::Builtin),
        ],
        &["//"],
        Some(("/*", "*/")),
        "\"'",
    )
}

fn rust_rules() -> SyntaxRuleSet {
    let mut rules = rule_set(
        "Rust",
        &["rs"],
        &[
            (
                &[
                    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "fn",
                    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
                    "pub", "ref", "return", "static", "struct", "trait", "type", "unsafe",
                    "use", "where", "while", "async", "await", "dyn",
                ],
                KeywordKind::Keyword,
            ),
            (
                &[
                    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
                    "u128", "usize", "f32", "f64", "bool", "char", "str", "String", "Vec",
                    "Option", "Result", "Self",
                ],
                KeywordKind::Type,
            ),
            (&["true", "false", "self", "Some", "None", "Ok", "Err"], KeywordKind::Builtin),
        ],
        &["//"],
        Some(("/*", "*/")),
        "\"",
    );
    rules.multiline_strings = true;
    rules
}

fn python_rules() -> SyntaxRuleSet {
    rule_set(
        "Python",
        &["py"],
        &[
            (
                &[
                    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif",
                    "else", "except", "finally", "for", "from", "global", "if", "import", "in",
                    "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
                    "while", "with", "yield",
                ],
                KeywordKind::Keyword,
            ),
            (
                &["int", "float", "str", "bytes", "list", "dict", "set", "tuple", "bool"],
                KeywordKind::Type,
            ),
            (&["None", "True", "False", "self"], KeywordKind::Builtin),
        ],
        &["#"],
        Some(("\"\"\"", "\"\"\"")),
        "\"'",
    )
}

fn javascript_rules() -> SyntaxRuleSet {
    rule_set(
        "JavaScript",
        &["js", "jsx", "mjs", "ts", "tsx"],
        &[
            (
                &[
                    "break", "case", "catch", "class", "const", "continue", "default", "delete",
                    "do", "else", "export", "extends", "finally", "for", "function", "if",
                    "import", "in", "instanceof", "let", "new", "return", "switch", "throw",
                    "try", "typeof", "var", "while", "async", "await", "yield",
                ],
                KeywordKind::Keyword,
            ),
            (&["number", "string", "boolean", "any", "void"], KeywordKind::Type),
            (&["true", "false", "null", "undefined", "this"], KeywordKind::Builtin),
        ],
        &["//"],
        Some(("/*", "*/")),
        "\"'`",
    )
}
