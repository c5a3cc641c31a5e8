use crate::common::harness::EditorTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use ember::model::rows::Pos;
use ratatui::style::Modifier;

/// Select word under the cursor picks the identifier run around it
#[test]
fn test_select_word_under_cursor() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("int value = 1;").unwrap();
    harness.send_key(KeyCode::Home, KeyModifiers::NONE).unwrap();
    harness
        .send_key_repeat(KeyCode::Right, KeyModifiers::NONE, 4)
        .unwrap();

    harness
        .send_key(KeyCode::Char('d'), KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(
        harness.document().cursor().selection(),
        Some((Pos::new(0, 4), Pos::new(0, 9)))
    );
    assert_eq!(harness.selected_text().as_deref(), Some("value"));
}

/// Typing over a selection replaces it, and one undo brings it back
#[test]
fn test_typing_replaces_selection() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("hello").unwrap();
    harness
        .send_key_repeat(KeyCode::Left, KeyModifiers::SHIFT, 2)
        .unwrap();
    assert_eq!(harness.selected_text().as_deref(), Some("lo"));

    harness.type_text("p").unwrap();
    harness.assert_buffer_content("help");
    assert!(!harness.document().cursor().has_selection());

    harness
        .send_key(KeyCode::Char('z'), KeyModifiers::CONTROL)
        .unwrap();
    harness.assert_buffer_content("hello");
}

/// Selected text is drawn reversed
#[test]
fn test_selection_visual_rendering() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("Hello World").unwrap();
    harness.send_key(KeyCode::Home, KeyModifiers::NONE).unwrap();
    harness
        .send_key_repeat(KeyCode::Right, KeyModifiers::SHIFT, 5)
        .unwrap();

    // Gutter is "1 ", so text starts at column 2
    let buffer = harness.buffer();
    for x in 2..7 {
        assert!(
            buffer[(x, 1)].modifier.contains(Modifier::REVERSED),
            "column {x} should be selected"
        );
    }
    assert!(!buffer[(7, 1)].modifier.contains(Modifier::REVERSED));
}

#[test]
fn test_select_line_and_delete() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("a\nb\nc").unwrap();
    harness.send_key(KeyCode::Up, KeyModifiers::NONE).unwrap();

    harness
        .send_key(KeyCode::Char('l'), KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.selected_text().as_deref(), Some("b\n"));

    harness
        .send_key(KeyCode::Backspace, KeyModifiers::NONE)
        .unwrap();
    harness.assert_buffer_content("a\nc");
}

#[test]
fn test_escape_collapses_selection() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("text").unwrap();
    harness
        .send_key(KeyCode::Char('a'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(harness.document().cursor().has_selection());

    harness.send_key(KeyCode::Esc, KeyModifiers::NONE).unwrap();
    assert!(!harness.document().cursor().has_selection());
    harness.assert_buffer_content("text");
}

/// Plain left/right with a selection land on its edges
#[test]
fn test_arrow_keys_collapse_to_selection_edge() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("abcdef").unwrap();
    harness
        .send_key_repeat(KeyCode::Left, KeyModifiers::SHIFT, 3)
        .unwrap();

    harness.send_key(KeyCode::Left, KeyModifiers::NONE).unwrap();
    assert_eq!(harness.cursor(), Pos::new(0, 3));
    assert!(!harness.document().cursor().has_selection());

    harness
        .send_key_repeat(KeyCode::Right, KeyModifiers::SHIFT, 2)
        .unwrap();
    harness.send_key(KeyCode::Right, KeyModifiers::NONE).unwrap();
    assert_eq!(harness.cursor(), Pos::new(0, 5));
}

/// Vertical movement keeps the column it started from across short rows
#[test]
fn test_vertical_movement_keeps_desired_column() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("long line here\nab\nanother long line").unwrap();
    harness
        .send_key(KeyCode::Home, KeyModifiers::CONTROL)
        .unwrap();
    harness.send_key(KeyCode::End, KeyModifiers::NONE).unwrap();
    assert_eq!(harness.cursor(), Pos::new(0, 14));

    harness.send_key(KeyCode::Down, KeyModifiers::NONE).unwrap();
    assert_eq!(harness.cursor(), Pos::new(1, 2));
    harness.send_key(KeyCode::Down, KeyModifiers::NONE).unwrap();
    assert_eq!(harness.cursor(), Pos::new(2, 14));
}

#[test]
fn test_word_movement() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("let total = price;").unwrap();
    harness.send_key(KeyCode::Home, KeyModifiers::NONE).unwrap();

    harness
        .send_key(KeyCode::Right, KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.cursor().col, 3);
    harness
        .send_key(KeyCode::Right, KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.cursor().col, 9);

    harness
        .send_key(KeyCode::Left, KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.cursor().col, 4);
}
