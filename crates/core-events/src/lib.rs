//! Input vocabulary and event plumbing for the cooked line editor.
//!
//! A cooked read consumes *input units*: either a character (with the
//! modifier state that produced it) or a named editing key. Characters that
//! are conventionally control codes (Enter = `\r`, Backspace = `0x08`,
//! Ctrl+Backspace = `0x7F`, Tab = `\t`) arrive as characters, never as keys,
//! so wake-up masks and processed-input mode can act on them uniformly.
//!
//! The editor pulls units through the [`InputSource`] trait. A source that has
//! nothing buffered returns `None`, which parks the read until more input
//! arrives. [`QueuedInput`] is the in-memory source used by the host loop and
//! by tests.

use std::collections::VecDeque;
use std::fmt;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// The host loop receives events over a bounded mpsc channel. The input task uses `send().await`
// and therefore waits when the channel is full instead of dropping keys; a cooked read must see
// every unit in arrival order.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Top-level event consumed by the host loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputUnit),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Cooperative cancellation of the in-flight read.
    Terminate(WaitTerminationReason),
    Shutdown,
}

bitflags::bitflags! {
    /// Modifier state attached to every input unit.
    ///
    /// Bit values match the console `dwControlKeyState` word so the state can be
    /// handed back to a client unchanged on wake-up-mask completion.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ControlKeyState: u32 {
        const RIGHT_ALT  = 0x0001;
        const LEFT_ALT   = 0x0002;
        const RIGHT_CTRL = 0x0004;
        const LEFT_CTRL  = 0x0008;
        const SHIFT      = 0x0010;
    }
}

impl ControlKeyState {
    pub fn ctrl(self) -> bool {
        self.intersects(Self::LEFT_CTRL | Self::RIGHT_CTRL)
    }

    pub fn alt(self) -> bool {
        self.intersects(Self::LEFT_ALT | Self::RIGHT_ALT)
    }

    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }
}

/// Named editing keys understood by the line editor and its popups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKey {
    Escape,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// Function key `F1`..=`F12`.
    F(u8),
}

/// One decoded unit of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputUnit {
    Char {
        ch: char,
        modifiers: ControlKeyState,
    },
    Key {
        key: EditKey,
        modifiers: ControlKeyState,
    },
}

impl InputUnit {
    pub fn ch(ch: char) -> Self {
        Self::Char {
            ch,
            modifiers: ControlKeyState::empty(),
        }
    }

    pub fn key(key: EditKey) -> Self {
        Self::Key {
            key,
            modifiers: ControlKeyState::empty(),
        }
    }

    pub fn key_with(key: EditKey, modifiers: ControlKeyState) -> Self {
        Self::Key { key, modifiers }
    }

    pub fn modifiers(&self) -> ControlKeyState {
        match *self {
            Self::Char { modifiers, .. } | Self::Key { modifiers, .. } => modifiers,
        }
    }
}

impl fmt::Display for InputUnit {
    // Characters are shown by code point only so logs never carry typed text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char { ch, modifiers } => write!(f, "U+{:04X}{:?}", *ch as u32, modifiers),
            Self::Key { key, modifiers } => write!(f, "{key:?}{modifiers:?}"),
        }
    }
}

/// Source of input units for a cooked read.
pub trait InputSource {
    /// Next unit in arrival order, or `None` when nothing is buffered right now.
    fn next_unit(&mut self) -> Option<InputUnit>;
}

/// FIFO input source backed by a `VecDeque`.
#[derive(Debug, Default, Clone)]
pub struct QueuedInput {
    queue: VecDeque<InputUnit>,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: InputUnit) {
        self.queue.push_back(unit);
    }

    /// Queue every char of `text` as an unmodified character unit.
    pub fn push_str(&mut self, text: &str) {
        self.queue.extend(text.chars().map(InputUnit::ch));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Extend<InputUnit> for QueuedInput {
    fn extend<T: IntoIterator<Item = InputUnit>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}

impl FromIterator<InputUnit> for QueuedInput {
    fn from_iter<T: IntoIterator<Item = InputUnit>>(iter: T) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

impl InputSource for QueuedInput {
    fn next_unit(&mut self) -> Option<InputUnit> {
        self.queue.pop_front()
    }
}

bitflags::bitflags! {
    /// Console input mode bits relevant to cooked reads.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct InputModes: u32 {
        /// Backspace edits the line and completion appends CRLF.
        const PROCESSED = 0x0001;
        const LINE = 0x0002;
        /// Redraw, history recording and alias expansion are active.
        const ECHO = 0x0004;
    }
}

impl Default for InputModes {
    fn default() -> Self {
        Self::PROCESSED | Self::LINE | Self::ECHO
    }
}

/// Bitset over the 32 C0 control characters that end a read immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CtrlWakeupMask(pub u32);

impl CtrlWakeupMask {
    pub const EMPTY: Self = Self(0);

    pub fn with(self, ch: char) -> Self {
        match u32::from(ch) {
            c @ 0..=31 => Self(self.0 | (1 << c)),
            _ => self,
        }
    }

    /// Whether `ch` is a C0 control in the mask.
    pub fn contains(self, ch: char) -> bool {
        let c = u32::from(ch);
        self.0 != 0 && c < 0x20 && self.0 & (1 << c) != 0
    }
}

bitflags::bitflags! {
    /// Why a parked read is being woken without new input.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WaitTerminationReason: u32 {
        const CTRL_C         = 0x01;
        const CTRL_BREAK     = 0x02;
        const THREAD_DYING   = 0x04;
        const HANDLE_CLOSING = 0x08;
    }
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Stable identifier used for logging.
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task. Implementors stop when `tx.send(..).await`
    /// returns Err (channel closed) or on their own internal stop condition.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at startup.
#[derive(Default)]
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// clone of `tx`; the caller drops its final clone during shutdown so sources observe the
    /// closed channel and exit.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}


#[cfg(test)]
mod tests_async_sources {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct MockOnceSource;

    impl AsyncEventSource for MockOnceSource {
        fn name(&self) -> &'static str {
            "mock_once"
        }
        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            tokio::spawn(async move {
                let _ = tx.send(Event::Input(InputUnit::ch('a'))).await;
            })
        }
    }

    #[tokio::test]
    async fn registry_spawns_and_emits() {
        let (tx, mut rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        reg.register(MockOnceSource);
        let handles = reg.spawn_all(&tx);
        let ev = tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .expect("source should emit promptly");
        assert_eq!(ev, Some(Event::Input(InputUnit::ch('a'))));
        drop(tx);
        for handle in handles {
            let _ = tokio::time::timeout(Duration::from_millis(20), handle).await;
        }
    }

    struct MockCloseSource {
        flag: Arc<AtomicBool>,
    }

    impl AsyncEventSource for MockCloseSource {
        fn name(&self) -> &'static str {
            "mock_close"
        }

        fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
            let flag = self.flag;
            tokio::spawn(async move {
                tx.closed().await;
                flag.store(true, Ordering::SeqCst);
            })
        }
    }

    #[tokio::test]
    async fn registry_sources_exit_on_channel_drop() {
        let (tx, rx) = mpsc::channel::<Event>(8);
        let mut reg = EventSourceRegistry::new();
        let flag = Arc::new(AtomicBool::new(false));
        reg.register(MockCloseSource { flag: flag.clone() });
        let handles = reg.spawn_all(&tx);

        drop(tx);
        drop(rx);

        for handle in handles {
            match tokio::time::timeout(Duration::from_millis(50), handle).await {
                Ok(join_res) => join_res.expect("source task should exit cleanly"),
                Err(_) => panic!("source task did not observe channel closure"),
            }
        }

        assert!(flag.load(Ordering::SeqCst));
    }
}
