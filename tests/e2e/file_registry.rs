use crate::common::harness::EditorTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use ember::app::registry::{RegistryError, MAX_FILE_SLOTS};
use tempfile::TempDir;

fn new_buffer(harness: &mut EditorTestHarness) {
    harness
        .send_key(KeyCode::Char('n'), KeyModifiers::CONTROL)
        .unwrap();
}

/// With every slot taken, opening another file fails and changes nothing
#[test]
fn test_open_beyond_capacity_fails() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("extra.txt");
    std::fs::write(&file_path, "extra").unwrap();

    let mut harness = EditorTestHarness::new(120, 24).unwrap();
    for _ in 1..MAX_FILE_SLOTS {
        new_buffer(&mut harness);
    }
    assert_eq!(harness.session().registry().len(), MAX_FILE_SLOTS);
    let active = harness.session().registry().active_index();

    let result = harness.open_file(&file_path);
    assert_eq!(result, Err(RegistryError::Full { capacity: 32 }));
    assert_eq!(harness.session().registry().len(), MAX_FILE_SLOTS);
    assert_eq!(harness.session().registry().active_index(), active);
    assert!(harness.session().registry().find_by_path(&file_path).is_none());
    assert_eq!(harness.status_message(), Some("Cannot open more than 32 files"));
    assert_eq!(harness.get_prompt_line(), "Cannot open more than 32 files");

    // A new buffer fails the same way
    new_buffer(&mut harness);
    assert_eq!(harness.session().registry().len(), MAX_FILE_SLOTS);
}

#[test]
fn test_untitled_buffers_are_numbered() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    new_buffer(&mut harness);
    new_buffer(&mut harness);
    assert_eq!(harness.document().display_name(), "Untitled-3");
    assert_eq!(
        harness.get_tab_bar(),
        " Untitled-1*  Untitled-2*  Untitled-3*"
    );
}

#[test]
fn test_switching_documents() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("first").unwrap();
    new_buffer(&mut harness);
    harness.type_text("second").unwrap();

    harness
        .send_key(KeyCode::Char('1'), KeyModifiers::ALT)
        .unwrap();
    harness.assert_buffer_content("first");
    harness.assert_screen_contains("1 first");

    harness
        .send_key(KeyCode::Right, KeyModifiers::ALT)
        .unwrap();
    harness.assert_buffer_content("second");
    // Next wraps around
    harness
        .send_key(KeyCode::Right, KeyModifiers::ALT)
        .unwrap();
    harness.assert_buffer_content("first");
    harness
        .send_key(KeyCode::Left, KeyModifiers::ALT)
        .unwrap();
    harness.assert_buffer_content("second");

    // Out-of-range switch is ignored
    harness
        .send_key(KeyCode::Char('9'), KeyModifiers::ALT)
        .unwrap();
    harness.assert_buffer_content("second");
}

/// Each document keeps its own cursor and history
#[test]
fn test_documents_are_independent() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("alpha").unwrap();
    new_buffer(&mut harness);
    harness.type_text("beta").unwrap();

    harness
        .send_key(KeyCode::Char('1'), KeyModifiers::ALT)
        .unwrap();
    harness
        .send_key(KeyCode::Char('z'), KeyModifiers::CONTROL)
        .unwrap();
    harness.assert_buffer_content("");

    harness
        .send_key(KeyCode::Char('2'), KeyModifiers::ALT)
        .unwrap();
    harness.assert_buffer_content("beta");
    assert_eq!(harness.cursor().col, 4);
}

#[test]
fn test_close_reresolves_active_document() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    new_buffer(&mut harness);
    new_buffer(&mut harness);
    harness
        .send_key(KeyCode::Char('2'), KeyModifiers::ALT)
        .unwrap();

    harness
        .send_key(KeyCode::Char('w'), KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.session().registry().len(), 2);
    assert_eq!(harness.document().display_name(), "Untitled-3");

    // Closing the last slot falls back to the new last document
    harness
        .send_key(KeyCode::Char('w'), KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.document().display_name(), "Untitled-1");

    // Closing the only document leaves a fresh one
    harness
        .send_key(KeyCode::Char('w'), KeyModifiers::CONTROL)
        .unwrap();
    assert_eq!(harness.session().registry().len(), 1);
    assert_eq!(harness.document().display_name(), "Untitled-4");
}

/// Opening a file that is already open switches to it
#[test]
fn test_reopen_switches_to_existing() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("a.txt");
    std::fs::write(&file_path, "content").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    let first = harness.open_file(&file_path).unwrap();
    new_buffer(&mut harness);

    let again = harness.open_file(&file_path).unwrap();
    assert_eq!(first, again);
    assert_eq!(harness.session().registry().len(), 3);
    harness.assert_buffer_content("content");
}

/// Handles go stale when closing moves documents
#[test]
fn test_handles_detect_compaction() {
    let temp_dir = TempDir::new().unwrap();
    let a = temp_dir.path().join("a.txt");
    let b = temp_dir.path().join("b.txt");
    std::fs::write(&a, "a").unwrap();
    std::fs::write(&b, "b").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&a).unwrap();
    let handle_b = harness.open_file(&b).unwrap();

    harness.session_mut().close(0);
    let registry = harness.session().registry();
    assert!(registry.get(handle_b).is_none());
    let index = registry.find_by_path(&b).unwrap();
    let fresh = registry.handle_at(index).unwrap();
    assert_eq!(registry.get(fresh).unwrap().text(), "b");
}
