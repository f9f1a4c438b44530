//! The cooked-read line editor.
//!
//! One `LineEditor` exists per in-flight read. Each `read` call drains every
//! unit the input source has ready, flushes the screen once, and either
//! parks (`ReadStatus::Pending`) or completes. Input handling is split by
//! target:
//! * `chars` - printable and control characters without a popup
//! * `keys`  - named editing keys without a popup
//! * `popup` - everything while a popup is on top

use core_events::{ControlKeyState, InputModes, InputUnit, WaitTerminationReason};
use core_render::Redrawer;
use core_state::{BufferState, ConsoleGuard, PopupStack};
use core_terminal::{OutputChannel, Point};
use core_text::fit_into_columns;

use crate::context::{EditorOptions, ReadContext, ReadState, ReadStatus, ScreenInfo};

mod chars;
mod keys;
mod popup;

#[derive(Debug)]
pub struct LineEditor {
    buffer: BufferState,
    popups: PopupStack,
    redrawer: Redrawer,
    state: ReadState,
    insert_mode: bool,
    control_key_state: ControlKeyState,
    options: EditorOptions,
}

/// Prompt origin for a read whose `initial` text is already on screen
/// right before `cursor`.
fn prompt_anchor(cursor: Point, width: usize, initial: &str) -> Point {
    if initial.is_empty() {
        return cursor;
    }
    let columns = fit_into_columns(initial, usize::MAX).columns;
    let w = width.max(1);
    let cols = (usize::from(cursor.y) * w + usize::from(cursor.x)).saturating_sub(columns);
    let x = u16::try_from(cols % w).unwrap_or(u16::MAX);
    let y = u16::try_from(cols / w).unwrap_or(u16::MAX);
    Point::new(x, y)
}

impl LineEditor {
    pub fn new(screen: &dyn ScreenInfo, initial: &str, options: EditorOptions) -> Self {
        let viewport = screen.viewport();
        let origin = prompt_anchor(screen.cursor_position(), viewport.width, initial);
        let mut buffer = BufferState::new();
        if !initial.is_empty() {
            buffer.replace_all(initial);
        }
        tracing::debug!(
            target: "editor.read",
            x = origin.x,
            y = origin.y,
            initial_len = initial.len(),
            "cooked read created"
        );
        Self {
            buffer,
            popups: PopupStack::new(),
            redrawer: Redrawer::new(origin, options.popup),
            state: ReadState::Accumulating,
            insert_mode: options.insert_mode,
            control_key_state: ControlKeyState::empty(),
            options,
        }
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    /// Text left of the cursor; empty while a popup hides the buffer.
    pub fn text_before_cursor(&self) -> &str {
        self.buffer.text_before_cursor()
    }

    pub fn origin(&self) -> Point {
        self.redrawer.origin()
    }

    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn set_insert_mode(&mut self, insert_mode: bool) {
        self.insert_mode = insert_mode;
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.popups.is_empty()
    }

    pub fn presenting_popup(&self) -> bool {
        !self.popups.is_empty()
    }

    /// Run one turn. The caller must hold the console lock.
    pub fn read(
        &mut self,
        ctx: &mut ReadContext<'_>,
        channel: &mut OutputChannel,
        _lock: &ConsoleGuard<'_>,
    ) -> ReadStatus {
        let mut channel = channel.cork();

        while self.state == ReadState::Accumulating {
            let Some(unit) = ctx.input.next_unit() else {
                break;
            };
            tracing::trace!(target: "editor.read", %unit, popup = self.presenting_popup(), "unit");
            self.dispatch(unit, ctx, &mut channel);
        }

        self.flush(ctx, &mut channel);

        if self.state == ReadState::Accumulating {
            return ReadStatus::Pending;
        }
        self.complete(ctx, &mut channel)
    }

    /// Map a termination reason to a final status. `None` means the read
    /// should keep waiting.
    pub fn notify(&mut self, reason: WaitTerminationReason) -> Option<ReadStatus> {
        let status = if reason.intersects(WaitTerminationReason::CTRL_C | WaitTerminationReason::CTRL_BREAK) {
            ReadStatus::Alerted
        } else if reason.contains(WaitTerminationReason::THREAD_DYING) {
            ReadStatus::ThreadTerminating
        } else if reason.contains(WaitTerminationReason::HANDLE_CLOSING) {
            ReadStatus::Alerted
        } else {
            return None;
        };
        tracing::debug!(target: "editor.read", ?reason, ?status, "read terminated");
        Some(status)
    }

    pub fn erase_before_resize(&self, channel: &mut OutputChannel) {
        self.redrawer.erase_before_resize(channel);
    }

    pub fn redraw_after_resize(&mut self, ctx: &mut ReadContext<'_>, channel: &mut OutputChannel) {
        let viewport = ctx.screen.viewport();
        self.redrawer.redraw_after_resize(
            channel,
            &mut self.buffer,
            &mut self.popups,
            ctx.history.as_deref(),
            viewport,
        );
    }

    fn dispatch(&mut self, unit: InputUnit, ctx: &mut ReadContext<'_>, channel: &mut OutputChannel) {
        if self.presenting_popup() {
            self.popup_input(unit, ctx, channel);
            return;
        }
        match unit {
            InputUnit::Char { ch, modifiers } => self.handle_char(ch, modifiers, ctx, channel),
            InputUnit::Key { key, modifiers } => self.handle_key(key, modifiers, ctx, channel),
        }
    }

    fn transition(&mut self, state: ReadState) {
        debug_assert_eq!(self.state, ReadState::Accumulating);
        self.state = state;
    }

    fn has_mode(&self, mode: InputModes) -> bool {
        self.options.modes.contains(mode)
    }

    fn flush(&mut self, ctx: &mut ReadContext<'_>, channel: &mut OutputChannel) {
        if !self.has_mode(InputModes::ECHO) {
            return;
        }
        let viewport = ctx.screen.viewport();
        self.redrawer.flush(
            channel,
            &mut self.buffer,
            &mut self.popups,
            ctx.history.as_deref(),
            viewport,
        );
    }

    fn complete(&mut self, ctx: &mut ReadContext<'_>, channel: &mut OutputChannel) -> ReadStatus {
        let mut line = self.buffer.extract();
        let mut line_count = 1;

        if self.state == ReadState::DoneWithCarriageReturn {
            let suffix = if self.has_mode(InputModes::PROCESSED) { "\r\n" } else { "\r" };
            // Written directly: the extra row must not enter the layout bookkeeping.
            channel.write_text(suffix);

            let mut alias = None;
            if self.has_mode(InputModes::ECHO) {
                if let Some(history) = ctx.history.as_deref_mut() {
                    history.add(&line, self.options.history_no_duplicates);
                }
                alias = ctx.aliases.expand(&line, &self.options.exe_name);
            }
            match alias {
                Some(expansion) => {
                    line = expansion.text;
                    line_count = expansion.line_count;
                }
                None => line.push_str(suffix),
            }
        }

        let first_line = if line_count > 1 {
            line.find('\n').map_or(line.len(), |i| i + 1)
        } else {
            line.len()
        };
        let rest = ctx.sink.consume(&line[..first_line]);
        let consumed = first_line - rest.len();
        if line_count > 1 {
            ctx.pending.save_multiline_pending_input(&line[consumed..]);
        } else if consumed < line.len() {
            ctx.pending.save_pending_input(&line[consumed..]);
        }

        ctx.screen.set_cursor_double_mode(false);

        let bytes = ctx.sink.bytes_written();
        tracing::debug!(
            target: "editor.read",
            state = ?self.state,
            bytes,
            line_count,
            pending = ctx.pending.is_input_pending(),
            "read complete"
        );
        ReadStatus::Success {
            bytes,
            control_key_state: self.control_key_state,
        }
    }
}
