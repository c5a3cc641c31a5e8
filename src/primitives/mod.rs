//! Low-level primitives
//!
//! Character classification, the per-row syntax highlighter and the
//! rule set database it draws from.

pub mod char_class;
pub mod highlighter;
pub mod syntax_db;
