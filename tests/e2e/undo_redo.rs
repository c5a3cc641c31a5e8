use crate::common::harness::EditorTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use ember::config::Config;
use tempfile::TempDir;

fn undo(harness: &mut EditorTestHarness) {
    harness
        .send_key(KeyCode::Char('z'), KeyModifiers::CONTROL)
        .unwrap();
}

fn redo(harness: &mut EditorTestHarness) {
    harness
        .send_key(KeyCode::Char('y'), KeyModifiers::CONTROL)
        .unwrap();
}

/// Inserting a tab at the start of a row renders as spaces and undoes in one step
#[test]
fn test_tab_insert_and_undo() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("main.c");
    std::fs::write(&file_path, "int x = 1;\n// done\n").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();

    harness.send_key(KeyCode::Tab, KeyModifiers::NONE).unwrap();
    let row = harness.document().rows().row(0).unwrap().clone();
    assert_eq!(row.raw(), "\tint x = 1;");
    assert!(row.render().starts_with("    int"));
    assert_eq!(row.render().len(), row.tags().len());
    assert_eq!(harness.get_row_text(1), "1     int x = 1;");

    undo(&mut harness);
    assert_eq!(harness.document().rows().row(0).unwrap().raw(), "int x = 1;");
    harness.assert_buffer_content("int x = 1;\n// done");
    assert!(!harness.document().is_dirty());
}

/// A run of typing is one undo step
#[test]
fn test_typing_coalesces_into_single_undo() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("hello world").unwrap();
    assert_eq!(harness.document().log().len(), 1);

    undo(&mut harness);
    harness.assert_buffer_content("");
}

/// Moving the cursor ends the current undo group
#[test]
fn test_cursor_movement_breaks_coalescing() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("abc").unwrap();
    harness.send_key(KeyCode::Left, KeyModifiers::NONE).unwrap();
    harness.send_key(KeyCode::Right, KeyModifiers::NONE).unwrap();
    harness.type_text("def").unwrap();

    undo(&mut harness);
    harness.assert_buffer_content("abc");
    undo(&mut harness);
    harness.assert_buffer_content("");
}

#[test]
fn test_undo_redo_round_trip() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("abc\ndef").unwrap();
    harness.assert_buffer_content("abc\ndef");

    for _ in 0..3 {
        undo(&mut harness);
    }
    harness.assert_buffer_content("");
    // Past the start of history nothing happens
    undo(&mut harness);
    harness.assert_buffer_content("");

    for _ in 0..3 {
        redo(&mut harness);
    }
    harness.assert_buffer_content("abc\ndef");
    assert_eq!(harness.cursor().row, 1);
    assert_eq!(harness.cursor().col, 3);
    redo(&mut harness);
    harness.assert_buffer_content("abc\ndef");
}

/// Undo puts the cursor back where it was before the edit
#[test]
fn test_undo_restores_cursor() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("first line").unwrap();
    harness.send_key(KeyCode::Home, KeyModifiers::NONE).unwrap();
    harness.type_text("> ").unwrap();
    assert_eq!(harness.cursor().col, 2);

    undo(&mut harness);
    harness.assert_buffer_content("first line");
    assert_eq!(harness.cursor().col, 0);
}

/// Recording a new edit after an undo drops the redo branch
#[test]
fn test_new_edit_discards_redo() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("one").unwrap();
    undo(&mut harness);
    harness.type_text("two").unwrap();

    redo(&mut harness);
    harness.assert_buffer_content("two");
    assert!(!harness.document().log().can_redo());
}

/// Dirty state follows the saved snapshot through undo and redo
#[test]
fn test_dirty_flag_follows_history() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("notes.txt");
    std::fs::write(&file_path, "notes").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    assert!(!harness.get_tab_bar().contains("notes.txt*"));

    harness.type_text("x").unwrap();
    assert!(harness.document().is_dirty());
    assert!(harness.get_tab_bar().contains("notes.txt*"));
    assert!(harness.get_status_bar().contains("[+]"));

    undo(&mut harness);
    assert!(!harness.document().is_dirty());
    assert!(!harness.get_status_bar().contains("[+]"));

    redo(&mut harness);
    assert_eq!(harness.document().dirty(), 1);
}

/// Backspace between an auto-inserted pair removes both halves
#[test]
fn test_bracket_pair_typing_and_backspace() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("call(").unwrap();
    harness.assert_buffer_content("call()");
    assert_eq!(harness.cursor().col, 5);

    harness.type_text("x)").unwrap();
    harness.assert_buffer_content("call(x)");
    assert_eq!(harness.cursor().col, 7);

    harness.type_text("[").unwrap();
    harness
        .send_key(KeyCode::Backspace, KeyModifiers::NONE)
        .unwrap();
    harness.assert_buffer_content("call(x)");
}

#[test]
fn test_bracket_autocomplete_disabled() {
    let mut config = Config::default();
    config.editor.bracket_autocomplete = 0;
    let mut harness = EditorTestHarness::with_config(80, 24, config).unwrap();
    harness.type_text("f(").unwrap();
    harness.assert_buffer_content("f(");
}

/// Enter copies the indentation of the current row
#[test]
fn test_auto_indent_on_newline() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.send_key(KeyCode::Tab, KeyModifiers::NONE).unwrap();
    harness.type_text("body\nnext").unwrap();
    harness.assert_buffer_content("\tbody\n\tnext");

    // The newline and its indentation undo together
    undo(&mut harness);
    harness.assert_buffer_content("\tbody\n\t");
    undo(&mut harness);
    harness.assert_buffer_content("\tbody");
}

/// Indent and unindent of a multi-row selection
#[test]
fn test_block_indent_and_unindent() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("a\nb\nc").unwrap();
    harness
        .send_key(KeyCode::Char('a'), KeyModifiers::CONTROL)
        .unwrap();

    harness.send_key(KeyCode::Tab, KeyModifiers::NONE).unwrap();
    harness.assert_buffer_content("\ta\n\tb\n\tc");
    assert!(harness.document().cursor().has_selection());

    harness
        .send_key(KeyCode::BackTab, KeyModifiers::SHIFT)
        .unwrap();
    harness.assert_buffer_content("a\nb\nc");

    undo(&mut harness);
    harness.assert_buffer_content("\ta\n\tb\n\tc");
}
