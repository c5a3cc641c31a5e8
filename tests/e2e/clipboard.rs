use crate::common::harness::EditorTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use tempfile::TempDir;

fn ctrl(harness: &mut EditorTestHarness, c: char) {
    harness
        .send_key(KeyCode::Char(c), KeyModifiers::CONTROL)
        .unwrap();
}

/// Cut without a selection takes the whole row; pasting it elsewhere inserts a row
#[test]
fn test_cut_line_and_paste_into_other_document() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("list.txt");
    std::fs::write(&file_path, "one\ntwo\nthree\n").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    harness.send_key(KeyCode::Down, KeyModifiers::NONE).unwrap();

    ctrl(&mut harness, 'x');
    harness.assert_buffer_content("one\nthree");
    assert_eq!(harness.document().rows().len(), 2);
    assert!(harness.session().clipboard().is_line_mode());
    assert_eq!(harness.session().clipboard().text(), "two");

    ctrl(&mut harness, 'n');
    assert_eq!(harness.document().display_name(), "Untitled-2");
    harness.type_text("abc").unwrap();
    ctrl(&mut harness, 'v');
    harness.assert_buffer_content("two\nabc");
    assert_eq!(harness.cursor().row, 1);
    assert_eq!(harness.cursor().col, 3);

    // Paste does not consume the clipboard
    assert_eq!(harness.session().clipboard().text(), "two");
}

#[test]
fn test_cut_row_undo_restores_it() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("a\nb\nc").unwrap();
    harness.send_key(KeyCode::Up, KeyModifiers::NONE).unwrap();

    ctrl(&mut harness, 'x');
    harness.assert_buffer_content("a\nc");
    ctrl(&mut harness, 'z');
    harness.assert_buffer_content("a\nb\nc");
    assert_eq!(harness.cursor().row, 1);
}

/// On a single-row document cut empties the row instead of removing it
#[test]
fn test_cut_only_row() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("solo").unwrap();
    ctrl(&mut harness, 'x');
    harness.assert_buffer_content("");
    assert_eq!(harness.document().rows().len(), 1);
    assert_eq!(harness.session().clipboard().text(), "solo");
}

#[test]
fn test_copy_and_paste_inline() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("hello").unwrap();
    ctrl(&mut harness, 'a');
    ctrl(&mut harness, 'c');
    assert!(!harness.session().clipboard().is_line_mode());

    // Copy leaves the document untouched
    harness.assert_buffer_content("hello");

    harness.send_key(KeyCode::End, KeyModifiers::NONE).unwrap();
    ctrl(&mut harness, 'v');
    harness.assert_buffer_content("hellohello");
    assert_eq!(harness.cursor().col, 10);
}

#[test]
fn test_cut_selection() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("hello world").unwrap();
    harness
        .send_key_repeat(KeyCode::Left, KeyModifiers::SHIFT, 5)
        .unwrap();

    ctrl(&mut harness, 'x');
    harness.assert_buffer_content("hello ");
    assert_eq!(harness.session().clipboard().text(), "world");
    assert!(!harness.session().clipboard().is_line_mode());
}

/// Pasting over a selection replaces it and undoes as one step
#[test]
fn test_paste_replaces_selection() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("foo bar").unwrap();
    harness
        .send_key(KeyCode::Left, KeyModifiers::CONTROL)
        .unwrap();
    ctrl(&mut harness, 'd');
    assert_eq!(harness.selected_text().as_deref(), Some("bar"));
    ctrl(&mut harness, 'c');

    harness.send_key(KeyCode::Home, KeyModifiers::NONE).unwrap();
    harness
        .send_key_repeat(KeyCode::Right, KeyModifiers::SHIFT, 3)
        .unwrap();
    assert_eq!(harness.selected_text().as_deref(), Some("foo"));

    ctrl(&mut harness, 'v');
    harness.assert_buffer_content("bar bar");
    ctrl(&mut harness, 'z');
    harness.assert_buffer_content("foo bar");
}

/// A multi-line inline payload splits rows where it lands
#[test]
fn test_paste_multiline_selection() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("ab\ncd").unwrap();
    harness
        .send_key(KeyCode::Left, KeyModifiers::SHIFT)
        .unwrap();
    harness
        .send_key(KeyCode::Up, KeyModifiers::SHIFT)
        .unwrap();
    assert_eq!(harness.selected_text().as_deref(), Some("b\ncd"));
    ctrl(&mut harness, 'c');

    harness
        .send_key(KeyCode::End, KeyModifiers::CONTROL)
        .unwrap();
    ctrl(&mut harness, 'v');
    harness.assert_buffer_content("ab\ncdb\ncd");
    assert_eq!(harness.document().rows().len(), 3);
}
