mod common;

use common::{Harness, alt, shift};
use core_actions::{EditorOptions, ReadStatus};
use core_events::EditKey;
use core_state::CommandHistory;
use pretty_assertions::assert_eq;

fn numbered(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("cmd{i}")).collect()
}

#[test]
fn copy_to_char_prompt_hides_cursor_and_copies() {
    let mut h = Harness::new(80, 24).with_history(["abcdef"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(2));
    assert_eq!(h.read(&mut editor), ReadStatus::Pending);
    assert!(editor.presenting_popup());
    let out = h.output();
    assert!(out.starts_with("\x1b[?25l"), "{out:?}");
    assert!(out.contains("Enter char to copy up to: "));

    h.type_str("d");
    h.read(&mut editor);
    assert!(!editor.presenting_popup());
    assert_eq!(editor.text(), "abc");
    assert!(h.output().contains("\x1b[?25h"));
}

#[test]
fn copy_to_char_missing_char_copies_nothing() {
    let mut h = Harness::new(80, 24).with_history(["abc"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(2));
    h.type_str("z");
    h.read(&mut editor);
    assert_eq!(editor.text(), "");
    assert!(!editor.presenting_popup());
}

#[test]
fn copy_from_char_deletes_up_to_char() {
    let mut h = Harness::new(80, 24);
    let mut editor = h.editor(EditorOptions::default());
    h.type_str("hello world");
    h.key(EditKey::Home);
    h.key(EditKey::F(4));
    h.type_str("o");
    h.read(&mut editor);
    assert_eq!(editor.text(), "o world");
    assert_eq!(editor.cursor(), 0);
}

#[test]
fn escape_dismisses_prompt_without_change() {
    let mut h = Harness::new(80, 24);
    let mut editor = h.editor(EditorOptions::default());
    h.type_str("keep");
    h.key(EditKey::F(4));
    h.key(EditKey::Escape);
    h.read(&mut editor);
    assert_eq!(editor.text(), "keep");
    assert!(!editor.presenting_popup());
}

#[test]
fn command_number_recalls_entry() {
    let mut h = Harness::new(80, 24).with_history(["alpha", "beta", "gamma"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(9));
    h.type_str("1");
    h.read(&mut editor);
    assert!(h.output().contains("Enter command number: 1    "));

    // The Enter is swallowed by the popup.
    h.type_str("\r");
    assert_eq!(h.read(&mut editor), ReadStatus::Pending);
    assert_eq!(editor.text(), "beta");
    assert!(!editor.presenting_popup());
}

#[test]
fn command_number_ignores_non_digits_and_empty_field() {
    let mut h = Harness::new(80, 24).with_history(["alpha"]);
    let mut editor = h.editor(EditorOptions::default());
    h.type_str("x");
    h.key(EditKey::F(9));
    h.type_str("q\u{8}\r");
    h.read(&mut editor);
    assert_eq!(editor.text(), "x");
    assert!(!editor.presenting_popup());
}

#[test]
fn command_number_needs_history() {
    let mut h = Harness::new(80, 24);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(9));
    h.key(EditKey::F(7));
    h.read(&mut editor);
    assert!(!editor.presenting_popup());
    assert_eq!(h.output(), "");
}

#[test]
fn command_list_pages_and_accepts() {
    let mut h = Harness::new(80, 20).with_history(numbered(15));
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(7));
    h.key(EditKey::Home);
    h.key(EditKey::PageDown);
    h.key(EditKey::PageDown);
    assert_eq!(h.read(&mut editor), ReadStatus::Pending);
    let out = h.output();
    assert!(out.contains(" 5: cmd5"), "{out:?}");
    assert!(out.contains("14: cmd14"), "{out:?}");
    assert!(!out.contains(" 4: cmd4"), "{out:?}");

    h.type_str("\r");
    assert!(matches!(h.read(&mut editor), ReadStatus::Success { bytes: 7, .. }));
    assert_eq!(h.sink.as_str(), "cmd14\r\n");
}

#[test]
fn command_list_left_copies_selection_into_buffer() {
    let mut h = Harness::new(80, 24).with_history(["a", "b", "c"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(7));
    h.key(EditKey::Up);
    h.key(EditKey::Left);
    assert_eq!(h.read(&mut editor), ReadStatus::Pending);
    assert_eq!(editor.text(), "b");
    assert!(!editor.presenting_popup());
}

#[test]
fn command_list_shift_arrow_reorders_history() {
    let mut h = Harness::new(80, 24).with_history(["a", "b", "c"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(7));
    h.key_with(EditKey::Up, shift());
    h.key(EditKey::Escape);
    h.read(&mut editor);
    let order: Vec<_> = (0..3).map(|i| h.history.nth(i).to_owned()).collect();
    assert_eq!(order, ["a", "c", "b"]);
}

#[test]
fn command_list_delete_removes_entries() {
    let mut h = Harness::new(80, 24).with_history(["a", "b"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(7));
    h.key(EditKey::Delete);
    h.read(&mut editor);
    assert_eq!(h.history.count(), 1);
    assert!(editor.presenting_popup());

    h.key(EditKey::Delete);
    h.read(&mut editor);
    assert_eq!(h.history.count(), 0);
    assert!(!editor.presenting_popup());
}

#[test]
fn command_list_f9_stacks_number_prompt() {
    let mut h = Harness::new(80, 24).with_history(["a", "b", "c"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(7));
    h.key(EditKey::F(9));
    h.read(&mut editor);
    assert!(h.output().contains("Enter command number: "));

    h.type_str("0\r");
    h.read(&mut editor);
    assert_eq!(editor.text(), "a");
    assert!(!editor.presenting_popup());
}

#[test]
fn closing_popup_restores_line_and_cursor() {
    let mut h = Harness::new(80, 24).with_history(["x"]);
    let mut editor = h.editor(EditorOptions::default());
    h.type_str("abc");
    h.read(&mut editor);
    h.output();

    h.key(EditKey::F(2));
    h.read(&mut editor);
    h.output();

    h.key(EditKey::Escape);
    h.read(&mut editor);
    assert_eq!(h.output(), "\x1b[?25h\x1b[2;1H\x1b[K\x1b[1;4H");
}

#[test]
fn alt_f7_inside_list_is_ignored() {
    let mut h = Harness::new(80, 24).with_history(["a"]);
    let mut editor = h.editor(EditorOptions::default());
    h.key(EditKey::F(7));
    h.key_with(EditKey::F(7), alt());
    h.read(&mut editor);
    assert_eq!(h.history.count(), 1);
    assert!(editor.presenting_popup());
}

#[test]
fn resize_erases_then_redraws() {
    let mut h = Harness::new(40, 24);
    let mut editor = h.editor(EditorOptions::default());
    h.type_str("abc");
    h.read(&mut editor);
    h.output();

    h.resize(&mut editor, 60, 24);
    assert_eq!(h.output(), "\x1b[1;1H\x1b[J\x1b[1;1Habc\x1b[1;4H");
}
