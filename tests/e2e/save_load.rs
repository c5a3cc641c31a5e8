use crate::common::harness::{EditorTestHarness, FailingIo};
use crossterm::event::{KeyCode, KeyModifiers};
use ember::config::Config;
use ember::model::file_io::{LineEnding, TextEncoding};
use tempfile::TempDir;

fn save(harness: &mut EditorTestHarness) {
    harness
        .send_key(KeyCode::Char('s'), KeyModifiers::CONTROL)
        .unwrap();
}

fn save_as(harness: &mut EditorTestHarness, path: &str) {
    harness
        .send_key(
            KeyCode::Char('s'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        )
        .unwrap();
    harness.type_text(path).unwrap();
    harness.send_key(KeyCode::Enter, KeyModifiers::NONE).unwrap();
}

#[test]
fn test_crlf_preserved_on_save() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("dos.txt");
    std::fs::write(&file_path, "alpha\r\nbeta\r\n").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    assert_eq!(harness.document().format().line_ending, LineEnding::CRLF);
    harness.assert_buffer_content("alpha\nbeta");
    assert!(harness.get_status_bar().contains("CRLF"));

    harness.type_text("x").unwrap();
    save(&mut harness);

    assert_eq!(
        std::fs::read_to_string(&file_path).unwrap(),
        "xalpha\r\nbeta\r\n"
    );
    assert!(!harness.document().is_dirty());
    assert!(!harness.get_tab_bar().contains("dos.txt*"));
    assert_eq!(
        harness.status_message(),
        Some(format!("Wrote 2 lines to {}", file_path.display()).as_str())
    );
}

#[test]
fn test_missing_trailing_newline_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("plain.txt");
    std::fs::write(&file_path, "one\ntwo").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    harness
        .send_key(KeyCode::End, KeyModifiers::CONTROL)
        .unwrap();
    harness.type_text("!").unwrap();
    save(&mut harness);

    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "one\ntwo!");
}

/// Saving and then undoing makes the document dirty again
#[test]
fn test_undo_after_save_is_dirty() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("doc.txt");
    std::fs::write(&file_path, "").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    harness.type_text("abc").unwrap();
    save(&mut harness);
    assert!(!harness.document().is_dirty());

    harness
        .send_key(KeyCode::Char('z'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(harness.document().is_dirty());
    harness
        .send_key(KeyCode::Char('y'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(!harness.document().is_dirty());
}

/// A path that does not exist yet opens empty and is created on save
#[test]
fn test_open_missing_file_then_save() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("new.c");

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    assert_eq!(harness.document().display_name(), "new.c");
    assert_eq!(harness.document().syntax_name(), Some("C"));
    harness.assert_buffer_content("");

    harness.type_text("int main;").unwrap();
    save(&mut harness);
    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "int main;");
}

#[test]
fn test_save_untitled_needs_a_name() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("named.txt");

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("draft").unwrap();
    save(&mut harness);
    assert_eq!(harness.status_message(), Some("No file name; use save as"));
    assert!(harness.document().is_dirty());

    save_as(&mut harness, file_path.to_str().unwrap());
    assert_eq!(harness.document().display_name(), "named.txt");
    assert!(!harness.document().is_dirty());
    assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "draft");
}

/// A failed save reports the error and leaves the document as it was
#[test]
fn test_save_failure_keeps_document() {
    let mut harness =
        EditorTestHarness::with_file_io(80, 24, Config::default(), Box::new(FailingIo)).unwrap();
    harness.type_text("keep me").unwrap();

    save_as(&mut harness, "/tmp/out.txt");
    let message = harness.status_message().unwrap();
    assert!(message.starts_with("Save failed:"), "got {message}");
    assert!(message.contains("Disk full"));
    assert_eq!(harness.document().display_name(), "Untitled-1");
    assert!(harness.document().is_dirty());
    harness.assert_buffer_content("keep me");
}

/// A load failure other than a missing file opens an untitled buffer instead
#[test]
fn test_load_failure_opens_untitled() {
    let mut harness =
        EditorTestHarness::with_file_io(80, 24, Config::default(), Box::new(FailingIo)).unwrap();

    harness
        .open_file(std::path::Path::new("/etc/locked.txt"))
        .unwrap();
    assert!(harness
        .status_message()
        .unwrap()
        .starts_with("Could not open /etc/locked.txt"));
    assert_eq!(harness.document().display_name(), "Untitled-2");
    assert_eq!(harness.session().registry().len(), 2);
}

/// Bytes that are not UTF-8 open as Latin-1 and are written back unchanged
#[test]
fn test_latin1_file_edit_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("legacy.txt");
    std::fs::write(&file_path, b"caf\xe9\nna\xefve\n").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    assert!(harness.session().registry().find_by_path(&file_path).is_some());
    assert_eq!(harness.document().format().encoding, TextEncoding::Latin1);
    harness.assert_buffer_content("caf\u{e9}\nna\u{ef}ve");
    assert!(harness.get_status_bar().contains("Latin-1"));
    harness.assert_screen_contains("caf\u{e9}");

    harness.type_text("x").unwrap();
    save(&mut harness);

    assert_eq!(
        std::fs::read(&file_path).unwrap(),
        b"xcaf\xe9\nna\xefve\n".to_vec()
    );
    assert!(!harness.document().is_dirty());
}

#[test]
fn test_latin1_save_rejects_unencodable_text() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("legacy.txt");
    std::fs::write(&file_path, b"caf\xe9\n").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    harness.type_text("\u{20ac}").unwrap();
    save(&mut harness);

    let status = harness.status_message().unwrap();
    assert!(status.starts_with("Save failed"), "{status}");
    assert!(status.contains("Latin-1"), "{status}");
    assert!(harness.document().is_dirty());
    assert_eq!(std::fs::read(&file_path).unwrap(), b"caf\xe9\n".to_vec());
}

/// A lone \r in a CRLF file is row text, not a row break
#[test]
fn test_stray_carriage_return_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("mixed.txt");
    let original: &[u8] = b"a\rb\r\nc\r\nd\r\n";
    std::fs::write(&file_path, original).unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    assert_eq!(harness.document().rows().len(), 3);
    assert_eq!(harness.document().format().line_ending, LineEnding::CRLF);
    harness.assert_buffer_content("a\rb\nc\nd");

    save(&mut harness);
    assert_eq!(std::fs::read(&file_path).unwrap(), original);

    // Editing another row leaves the stray \r alone
    harness
        .send_key(KeyCode::End, KeyModifiers::CONTROL)
        .unwrap();
    harness.type_text("!").unwrap();
    save(&mut harness);
    assert_eq!(
        std::fs::read(&file_path).unwrap(),
        b"a\rb\r\nc\r\nd!\r\n".to_vec()
    );
}

#[test]
fn test_quit_asks_again_with_unsaved_changes() {
    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.type_text("unsaved").unwrap();

    harness
        .send_key(KeyCode::Char('q'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(!harness.should_quit());
    harness.assert_screen_contains("Unsaved changes");

    // Any other command resets the confirmation
    harness.send_key(KeyCode::Left, KeyModifiers::NONE).unwrap();
    harness
        .send_key(KeyCode::Char('q'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(!harness.should_quit());
    harness
        .send_key(KeyCode::Char('q'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(harness.should_quit());
}

#[test]
fn test_quit_without_changes() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("clean.txt");
    std::fs::write(&file_path, "clean").unwrap();

    let mut harness = EditorTestHarness::new(80, 24).unwrap();
    harness.open_file(&file_path).unwrap();
    harness.session_mut().close(0);
    harness
        .send_key(KeyCode::Char('q'), KeyModifiers::CONTROL)
        .unwrap();
    assert!(harness.should_quit());
}
