//! Input left over from a previous read on the same handle.
//!
//! When a completed line does not fit the caller's buffer, or an alias
//! expanded into several lines, the rest is parked here and served by the
//! next read before any new keystrokes are looked at.

use crate::sink::TranscodingSink;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadHandleData {
    pending: Option<String>,
    multiline: bool,
}

impl ReadHandleData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_input_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Park a remainder that later reads drain as far as their buffer allows.
    pub fn save_pending_input(&mut self, rest: &str) {
        self.save(rest, false);
    }

    /// Park alias output; later reads drain it one line at a time.
    pub fn save_multiline_pending_input(&mut self, rest: &str) {
        self.save(rest, true);
    }

    fn save(&mut self, rest: &str, multiline: bool) {
        if rest.is_empty() {
            self.pending = None;
            self.multiline = false;
        } else {
            self.pending = Some(rest.to_owned());
            self.multiline = multiline;
        }
    }

    /// Serve pending input into `sink`. Returns `false` when nothing was pending.
    pub fn read_pending(&mut self, sink: &mut dyn TranscodingSink) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        let multiline = self.multiline;
        let line_end = if multiline {
            pending.find('\n').map_or(pending.len(), |i| i + 1)
        } else {
            pending.len()
        };
        let rest_of_line = sink.consume(&pending[..line_end]);
        let consumed = line_end - rest_of_line.len();
        self.save(&pending[consumed..], multiline);
        tracing::trace!(
            target: "editor.read",
            consumed,
            remaining = pending.len() - consumed,
            multiline,
            "served pending input"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Utf8Sink;

    #[test]
    fn nothing_pending() {
        let mut h = ReadHandleData::new();
        let mut sink = Utf8Sink::new(8);
        assert!(!h.read_pending(&mut sink));
        h.save_pending_input("");
        assert!(!h.is_input_pending());
    }

    #[test]
    fn plain_pending_drains_by_capacity() {
        let mut h = ReadHandleData::new();
        h.save_pending_input("abcdef");
        let mut sink = Utf8Sink::new(4);
        assert!(h.read_pending(&mut sink));
        assert_eq!(sink.as_str(), "abcd");
        let mut sink = Utf8Sink::new(4);
        assert!(h.read_pending(&mut sink));
        assert_eq!(sink.as_str(), "ef");
        assert!(!h.is_input_pending());
    }

    #[test]
    fn multiline_pending_drains_one_line_per_read() {
        let mut h = ReadHandleData::new();
        h.save_multiline_pending_input("echo bar\r\necho baz\r\n");
        let mut sink = Utf8Sink::new(64);
        assert!(h.read_pending(&mut sink));
        assert_eq!(sink.as_str(), "echo bar\r\n");
        assert!(h.is_multiline());
        let mut sink = Utf8Sink::new(64);
        assert!(h.read_pending(&mut sink));
        assert_eq!(sink.as_str(), "echo baz\r\n");
        assert!(!h.is_input_pending());
    }
}
