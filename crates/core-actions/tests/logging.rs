mod common;

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use common::Harness;
use core_actions::EditorOptions;
use core_events::EditKey;
use tracing::Level;
use tracing::subscriber::with_default;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Write for LockedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

#[test]
fn line_text_never_reaches_the_log() {
    let writer = BufferWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(writer.clone())
        .finish();

    with_default(subscriber, || {
        let mut h = Harness::new(80, 24).with_history(["hunter2"]);
        let mut editor = h.editor(EditorOptions::default());
        h.key(EditKey::Up);
        h.type_str("-swordfish\r");
        h.read(&mut editor);
        assert_eq!(h.sink.as_str(), "hunter2-swordfish\r\n");
    });

    let log = String::from_utf8(writer.inner.lock().unwrap().clone()).unwrap();
    assert!(log.contains("editor.read"), "{log}");
    assert!(log.contains("read complete"), "{log}");
    assert!(!log.contains("hunter2"), "{log}");
    assert!(!log.contains("swordfish"), "{log}");
}

#[test]
fn popup_push_and_dismiss_are_logged() {
    let writer = BufferWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(writer.clone())
        .finish();

    with_default(subscriber, || {
        let mut h = Harness::new(80, 24).with_history(["a"]);
        let mut editor = h.editor(EditorOptions::default());
        h.key(EditKey::F(7));
        h.key(EditKey::F(9));
        h.key(EditKey::Escape);
        h.read(&mut editor);
        assert!(!editor.presenting_popup());
    });

    let log = String::from_utf8(writer.inner.lock().unwrap().clone()).unwrap();
    let popup_lines: Vec<&str> = log.lines().filter(|l| l.contains("editor.popup")).collect();
    assert_eq!(popup_lines.len(), 3, "{log}");
    assert!(popup_lines[0].contains("CommandList"));
    assert!(popup_lines[1].contains("CommandNumber") && popup_lines[1].contains("depth=2"));
    assert!(popup_lines[2].contains("done"));
}
