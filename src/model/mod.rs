//! Document model: rows, edit history, cursor and file access

pub mod clipboard;
pub mod cursor;
pub mod document;
pub mod event;
pub mod file_io;
pub mod row;
pub mod rows;
