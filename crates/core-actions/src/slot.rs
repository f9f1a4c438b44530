//! Holder for the one cooked read that may be parked at a time.

use core_events::{ControlKeyState, WaitTerminationReason};
use core_state::ConsoleGuard;
use core_terminal::OutputChannel;

use crate::context::{ReadContext, ReadStatus, ScreenInfo};
use crate::editor::LineEditor;

/// Owns a parked `LineEditor` between turns. The slot is emptied whenever a
/// read finishes, whichever way it finishes.
#[derive(Debug, Default)]
pub struct CookedReadSlot {
    editor: Option<LineEditor>,
}

impl CookedReadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.editor.is_some()
    }

    pub fn editor(&self) -> Option<&LineEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut LineEditor> {
        self.editor.as_mut()
    }

    /// Resume the parked read or start a new one. Pending input from an
    /// earlier read is served before an editor is created.
    pub fn read<F>(
        &mut self,
        ctx: &mut ReadContext<'_>,
        channel: &mut OutputChannel,
        lock: &ConsoleGuard<'_>,
        create: F,
    ) -> ReadStatus
    where
        F: FnOnce(&dyn ScreenInfo) -> LineEditor,
    {
        if self.editor.is_none() {
            if ctx.pending.read_pending(ctx.sink) {
                return ReadStatus::Success {
                    bytes: ctx.sink.bytes_written(),
                    control_key_state: ControlKeyState::empty(),
                };
            }
            self.editor = Some(create(&*ctx.screen));
        }
        let Some(editor) = self.editor.as_mut() else {
            return ReadStatus::Pending;
        };
        let status = editor.read(ctx, channel, lock);
        if status != ReadStatus::Pending {
            self.editor = None;
        }
        status
    }

    /// Deliver a termination reason to the parked read, if any.
    pub fn notify(&mut self, reason: WaitTerminationReason) -> Option<ReadStatus> {
        let status = self.editor.as_mut()?.notify(reason)?;
        self.editor = None;
        Some(status)
    }
}
