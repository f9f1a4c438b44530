//! Outbound VT channel with corked batching.
//!
//! Invariants:
//! - While any [`CorkGuard`] is alive, writes only append to the pending
//!   buffer; the buffer reaches the sink in a single write when the outermost
//!   guard drops.
//! - A failed sink write closes the output for good. Every later write is a
//!   silent no-op and the close notification fires (at most once).
//! - Writes on a channel that was never opened are no-ops.

use crate::attributes::{CellAttributes, format_attributes, is_control_character};
use crate::vt::{self, Point};
use std::io::{Read, Write};
use std::ops::{Deref, DerefMut};
use thiserror::Error;

pub type Sink = Box<dyn Write + Send>;
type CloseHandler = Box<dyn FnOnce() + Send>;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("output channel already open")]
    AlreadyOpen,
}

/// Handles a channel owns once opened. Only `output` is written to; the input
/// and signal handles are held so their lifetime matches the session.
pub struct Endpoints {
    pub output: Sink,
    pub input: Option<Box<dyn Read + Send>>,
    pub signal: Option<Box<dyn Read + Send>>,
}

impl Endpoints {
    pub fn output_only(output: impl Write + Send + 'static) -> Self {
        Self {
            output: Box::new(output),
            input: None,
            signal: None,
        }
    }
}

/// One cell of a run: a UTF-16 code unit plus its legacy attribute word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellInfo {
    pub ch: u16,
    pub attributes: CellAttributes,
}

impl CellInfo {
    pub fn new(ch: u16, attributes: CellAttributes) -> Self {
        Self { ch, attributes }
    }
}

#[derive(Default)]
pub struct OutputChannel {
    output: Option<Sink>,
    input: Option<Box<dyn Read + Send>>,
    signal: Option<Box<dyn Read + Send>>,
    opened: bool,
    cork_depth: usize,
    pending: Vec<u8>,
    on_close: Option<CloseHandler>,
    close_event_sent: bool,
}

impl OutputChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `endpoints`. No I/O happens here.
    pub fn open(&mut self, endpoints: Endpoints) -> Result<(), ChannelError> {
        if self.opened {
            return Err(ChannelError::AlreadyOpen);
        }
        self.output = Some(endpoints.output);
        self.input = endpoints.input;
        self.signal = endpoints.signal;
        self.opened = true;
        tracing::debug!(
            target: "output.channel",
            has_input = self.input.is_some(),
            has_signal = self.signal.is_some(),
            "channel opened"
        );
        Ok(())
    }

    /// Register the callback run by [`send_close_event`](Self::send_close_event).
    pub fn set_close_handler(&mut self, handler: impl FnOnce() + Send + 'static) {
        self.on_close = Some(Box::new(handler));
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// True once the output has been released, by failure or explicitly.
    pub fn is_closed(&self) -> bool {
        self.opened && self.output.is_none()
    }

    pub fn cork_depth(&self) -> usize {
        self.cork_depth
    }

    pub fn take_input(&mut self) -> Option<Box<dyn Read + Send>> {
        self.input.take()
    }

    pub fn take_signal(&mut self) -> Option<Box<dyn Read + Send>> {
        self.signal.take()
    }

    /// Start a batching scope. Nest further scopes through the returned guard.
    pub fn cork(&mut self) -> CorkGuard<'_> {
        self.cork_depth += 1;
        CorkGuard { channel: self }
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        if bytes.is_empty() || self.output.is_none() {
            return;
        }
        if self.cork_depth > 0 {
            self.pending.extend_from_slice(bytes);
            return;
        }
        self.write_through(bytes);
    }

    pub fn write_text(&mut self, text: &str) {
        self.write_raw(text.as_bytes());
    }

    /// Transcode UTF-16 to UTF-8; unpaired surrogates become U+FFFD.
    pub fn write_utf16(&mut self, units: &[u16]) {
        if units.is_empty() || self.output.is_none() {
            return;
        }
        let text: String = char::decode_utf16(units.iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        self.write_text(&text);
    }

    pub fn write_attributes(&mut self, attributes: CellAttributes) {
        let mut sgr = String::new();
        format_attributes(&mut sgr, attributes);
        self.write_text(&sgr);
    }

    /// Serialize a row of cells starting at `target`.
    ///
    /// Wide glyph halves that would be cut off at either end of the run become
    /// spaces; trail halves inside the run are skipped because the lead already
    /// printed the glyph. Surrogates and control code units print as U+FFFD and
    /// space, twice for a wide cell, so the column count stays exact.
    pub fn write_cell_run(&mut self, target: Point, cells: &[CellInfo]) {
        if cells.is_empty() || self.output.is_none() {
            return;
        }
        let mut out = String::with_capacity(cells.len() + 16);
        vt::cup(&mut out, target);

        let last = cells.len() - 1;
        let mut current: Option<CellAttributes> = None;
        for (i, cell) in cells.iter().enumerate() {
            let mut ch = cell.ch;
            let mut wide = cell.attributes.is_wide_half();
            if wide {
                if cell.attributes.contains(CellAttributes::LEADING_BYTE) {
                    if i == last {
                        ch = u16::from(b' ');
                        wide = false;
                    }
                } else if i == 0 {
                    ch = u16::from(b' ');
                    wide = false;
                } else {
                    continue;
                }
            }

            let rendition = cell.attributes.rendition();
            if current != Some(rendition) {
                current = Some(rendition);
                format_attributes(&mut out, rendition);
            }

            let glyph = match char::from_u32(u32::from(ch)) {
                None => Some(char::REPLACEMENT_CHARACTER),
                Some(_) if is_control_character(u32::from(ch)) => Some(' '),
                Some(c) => {
                    out.push(c);
                    None
                }
            };
            if let Some(sub) = glyph {
                out.push(sub);
                if wide {
                    out.push(sub);
                }
            }
        }
        vt::sgr_reset(&mut out);

        let mut cork = self.cork();
        cork.write_text(&out);
    }

    /// Drop the output sink. Later writes become no-ops.
    pub fn close_output(&mut self) {
        if self.output.take().is_some() {
            self.pending.clear();
            tracing::debug!(target: "output.channel", "output closed");
        }
    }

    /// Drop the input handle and announce the session end.
    pub fn close_input(&mut self) {
        self.input = None;
        self.send_close_event();
    }

    /// Run the close handler unless it already ran.
    pub fn send_close_event(&mut self) {
        if std::mem::replace(&mut self.close_event_sent, true) {
            return;
        }
        tracing::info!(target: "output.channel", "close event");
        if let Some(handler) = self.on_close.take() {
            handler();
        }
    }

    fn write_through(&mut self, bytes: &[u8]) {
        let Some(sink) = self.output.as_mut() else {
            return;
        };
        let result = sink.write_all(bytes).and_then(|()| sink.flush());
        if let Err(err) = result {
            tracing::warn!(
                target: "output.channel",
                error = %err,
                len = bytes.len(),
                "write failed; closing output"
            );
            self.close_output();
            self.send_close_event();
        }
    }

    fn uncork(&mut self) {
        self.cork_depth = self.cork_depth.saturating_sub(1);
        if self.cork_depth == 0 && !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.write_through(&pending);
            // Keep the allocation for the next batch.
            if self.pending.is_empty() {
                self.pending = pending;
                self.pending.clear();
            }
        }
    }
}

/// Batching scope returned by [`OutputChannel::cork`]. Dropping the outermost
/// guard flushes the batch.
pub struct CorkGuard<'a> {
    channel: &'a mut OutputChannel,
}

impl Deref for CorkGuard<'_> {
    type Target = OutputChannel;

    fn deref(&self) -> &OutputChannel {
        self.channel
    }
}

impl DerefMut for CorkGuard<'_> {
    fn deref_mut(&mut self) -> &mut OutputChannel {
        self.channel
    }
}

impl Drop for CorkGuard<'_> {
    fn drop(&mut self) {
        self.channel.uncork();
    }
}

/// `Write` sink that appends into a shared buffer, for capturing output.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    bytes: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        match self.bytes.lock() {
            Ok(b) => String::from_utf8_lossy(&b).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Return and clear everything written so far.
    pub fn take(&self) -> String {
        match self.bytes.lock() {
            Ok(mut b) => String::from_utf8_lossy(&std::mem::take(&mut *b)).into_owned(),
            Err(poisoned) => {
                let mut b = poisoned.into_inner();
                String::from_utf8_lossy(&std::mem::take(&mut *b)).into_owned()
            }
        }
    }

    /// Number of bytes currently captured.
    pub fn len(&self) -> usize {
        self.bytes.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.bytes.lock() {
            Ok(mut b) => b.extend_from_slice(buf),
            Err(poisoned) => poisoned.into_inner().extend_from_slice(buf),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn open_channel() -> (OutputChannel, MemorySink) {
        let sink = MemorySink::new();
        let mut ch = OutputChannel::new();
        ch.open(Endpoints::output_only(sink.clone())).unwrap();
        (ch, sink)
    }

    fn attr(bits: u16) -> CellAttributes {
        CellAttributes::from_bits_retain(bits)
    }

    fn cells(text: &str, bits: u16) -> Vec<CellInfo> {
        text.encode_utf16().map(|u| CellInfo::new(u, attr(bits))).collect()
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn open_twice_fails() {
        let (mut ch, _) = open_channel();
        assert!(matches!(
            ch.open(Endpoints::output_only(MemorySink::new())),
            Err(ChannelError::AlreadyOpen)
        ));
    }

    #[test]
    fn unopened_writes_are_noops() {
        let mut ch = OutputChannel::new();
        ch.write_text("hello");
        ch.write_cell_run(Point::ORIGIN, &cells("x", 7));
        assert!(!ch.is_open());
        assert!(!ch.is_closed());
    }

    #[test]
    fn uncorked_writes_go_straight_through() {
        let (mut ch, sink) = open_channel();
        ch.write_text("ab");
        assert_eq!(sink.take(), "ab");
        ch.write_text("");
        assert!(sink.is_empty());
    }

    #[test]
    fn nested_cork_flushes_once_at_outermost() {
        let (mut ch, sink) = open_channel();
        {
            let mut outer = ch.cork();
            outer.write_text("a");
            {
                let mut inner = outer.cork();
                inner.write_text("b");
                assert_eq!(inner.cork_depth(), 2);
            }
            assert!(sink.is_empty());
            outer.write_text("c");
        }
        assert_eq!(ch.cork_depth(), 0);
        assert_eq!(sink.take(), "abc");
    }

    #[test]
    fn utf16_unpaired_surrogate_becomes_replacement() {
        let (mut ch, sink) = open_channel();
        ch.write_utf16(&[0x0061, 0xD800, 0x0062]);
        assert_eq!(sink.take(), "a\u{FFFD}b");
    }

    #[test]
    fn cell_run_coalesces_sgr() {
        let (mut ch, sink) = open_channel();
        let mut run = cells("ab", 0x07);
        run.extend(cells("c", 0x1F));
        ch.write_cell_run(Point::new(2, 1), &run);
        assert_eq!(
            sink.take(),
            "\x1b[2;3H\x1b[27;39;49mab\x1b[27;97;44mc\x1b[m"
        );
    }

    #[test]
    fn cell_run_wide_edges() {
        let (mut ch, sink) = open_channel();
        let han = '漢' as u16;
        let run = [
            CellInfo::new(han, attr(0x0207)),
            CellInfo::new(u16::from(b'x'), attr(0x07)),
            CellInfo::new(han, attr(0x0107)),
            CellInfo::new(han, attr(0x0207)),
            CellInfo::new(han, attr(0x0107)),
        ];
        ch.write_cell_run(Point::ORIGIN, &run);
        assert_eq!(sink.take(), "\x1b[1;1H\x1b[27;39;49m x漢 \x1b[m");
    }

    #[test]
    fn cell_run_substitutes_controls_and_surrogates() {
        let (mut ch, sink) = open_channel();
        let run = [
            CellInfo::new(0x07, attr(0x07)),
            CellInfo::new(0xD83D, attr(0x0107)),
            CellInfo::new(0xDE00, attr(0x0207)),
            CellInfo::new(0x9B, attr(0x07)),
        ];
        ch.write_cell_run(Point::ORIGIN, &run);
        assert_eq!(
            sink.take(),
            "\x1b[1;1H\x1b[27;39;49m \u{FFFD}\u{FFFD} \x1b[m"
        );
    }

    #[test]
    fn empty_cell_run_writes_nothing() {
        let (mut ch, sink) = open_channel();
        ch.write_cell_run(Point::ORIGIN, &[]);
        assert!(sink.is_empty());
    }

    #[test]
    fn write_failure_closes_silently_and_notifies_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut ch = OutputChannel::new();
        ch.open(Endpoints::output_only(FailingSink)).unwrap();
        let f = fired.clone();
        ch.set_close_handler(move || {
            f.fetch_add(1, Ordering::SeqCst);
        });
        ch.write_text("x");
        assert!(ch.is_closed());
        ch.write_text("y");
        ch.write_cell_run(Point::ORIGIN, &cells("z", 7));
        ch.send_close_event();
        ch.close_input();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_during_uncork_closes() {
        let mut ch = OutputChannel::new();
        ch.open(Endpoints::output_only(FailingSink)).unwrap();
        {
            let mut c = ch.cork();
            c.write_text("batched");
        }
        assert!(ch.is_closed());
        ch.write_text("after");
        assert_eq!(ch.cork_depth(), 0);
    }
}
