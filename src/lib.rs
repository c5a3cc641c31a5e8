//! Editing core of the ember terminal text editor
//!
//! Documents are rows of text with incrementally maintained syntax highlighting and
//! an undo/redo history. The terminal front end (`input`, `view` and the `ember`
//! binary) only translates keys into commands and paints what the core exposes.

pub mod app;
pub mod config;
pub mod model;
pub mod primitives;

#[cfg(feature = "runtime")]
pub mod input;
#[cfg(feature = "runtime")]
pub mod view;
