#![allow(dead_code)] // Shared across integration tests; each binary uses a subset.

use core_actions::{CookedReadSlot, EditorOptions, LineEditor, ReadContext, ReadStatus, ScreenInfo};
use core_events::{ControlKeyState, EditKey, InputUnit, QueuedInput};
use core_render::Viewport;
use core_state::{AliasTable, ConsoleLock, MemoryHistory, ReadHandleData, Utf8Sink};
use core_terminal::{Endpoints, MemorySink, OutputChannel, Point};

#[derive(Debug, Clone)]
pub struct TestScreen {
    pub viewport: Viewport,
    pub cursor: Point,
    pub double_mode: bool,
}

impl ScreenInfo for TestScreen {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn cursor_position(&self) -> Point {
        self.cursor
    }

    fn set_cursor_double_mode(&mut self, double: bool) {
        self.double_mode = double;
    }
}

pub struct Harness {
    pub input: QueuedInput,
    pub history: MemoryHistory,
    pub aliases: AliasTable,
    pub screen: TestScreen,
    pub pending: ReadHandleData,
    pub sink: Utf8Sink,
    pub terminal: MemorySink,
    pub channel: OutputChannel,
    pub lock: ConsoleLock,
}

impl Harness {
    pub fn new(width: usize, height: usize) -> Self {
        let terminal = MemorySink::new();
        let mut channel = OutputChannel::new();
        channel.open(Endpoints::output_only(terminal.clone())).unwrap();
        Self {
            input: QueuedInput::new(),
            history: MemoryHistory::default(),
            aliases: AliasTable::new(),
            screen: TestScreen {
                viewport: Viewport::new(width, height),
                cursor: Point::ORIGIN,
                double_mode: false,
            },
            pending: ReadHandleData::new(),
            sink: Utf8Sink::new(256),
            terminal,
            channel,
            lock: ConsoleLock::new(),
        }
    }

    pub fn with_history<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, lines: I) -> Self {
        self.history = MemoryHistory::from_lines(lines);
        self
    }

    pub fn editor(&self, options: EditorOptions) -> LineEditor {
        LineEditor::new(&self.screen, "", options)
    }

    pub fn type_str(&mut self, text: &str) {
        self.input.push_str(text);
    }

    pub fn key(&mut self, key: EditKey) {
        self.input.push(InputUnit::key(key));
    }

    pub fn key_with(&mut self, key: EditKey, modifiers: ControlKeyState) {
        self.input.push(InputUnit::key_with(key, modifiers));
    }

    pub fn read(&mut self, editor: &mut LineEditor) -> ReadStatus {
        let guard = self.lock.lock();
        let mut ctx = ReadContext {
            input: &mut self.input,
            history: Some(&mut self.history),
            aliases: &mut self.aliases,
            screen: &mut self.screen,
            pending: &mut self.pending,
            sink: &mut self.sink,
        };
        editor.read(&mut ctx, &mut self.channel, &guard)
    }

    pub fn slot_read(&mut self, slot: &mut CookedReadSlot, options: EditorOptions) -> ReadStatus {
        let guard = self.lock.lock();
        let mut ctx = ReadContext {
            input: &mut self.input,
            history: Some(&mut self.history),
            aliases: &mut self.aliases,
            screen: &mut self.screen,
            pending: &mut self.pending,
            sink: &mut self.sink,
        };
        slot.read(&mut ctx, &mut self.channel, &guard, |screen| {
            LineEditor::new(screen, "", options)
        })
    }

    /// Erase, apply the new size, then redraw, the way a host handles a
    /// buffer resize while a read is parked.
    pub fn resize(&mut self, editor: &mut LineEditor, width: usize, height: usize) {
        editor.erase_before_resize(&mut self.channel);
        self.screen.viewport = Viewport::new(width, height);
        let mut ctx = ReadContext {
            input: &mut self.input,
            history: Some(&mut self.history),
            aliases: &mut self.aliases,
            screen: &mut self.screen,
            pending: &mut self.pending,
            sink: &mut self.sink,
        };
        editor.redraw_after_resize(&mut ctx, &mut self.channel);
    }

    /// Terminal bytes written since the last call.
    pub fn output(&self) -> String {
        self.terminal.take()
    }

    /// Line handed to the caller, then reset the caller buffer.
    pub fn take_line(&mut self, capacity: usize) -> String {
        std::mem::replace(&mut self.sink, Utf8Sink::new(capacity)).into_string()
    }
}

pub fn ctrl() -> ControlKeyState {
    ControlKeyState::LEFT_CTRL
}

pub fn alt() -> ControlKeyState {
    ControlKeyState::LEFT_ALT
}

pub fn shift() -> ControlKeyState {
    ControlKeyState::SHIFT
}
