use core_events::{ControlKeyState, InputModes};
use core_terminal::OutputChannel;
use core_text::{grapheme, word_prev};

use super::LineEditor;
use crate::context::{ReadContext, ReadState};

const BACKSPACE: char = '\u{8}';
/// Ctrl+Backspace arrives as DEL.
const ERASE_PREV_WORD: char = '\u{7f}';
const CARRIAGE_RETURN: char = '\r';

impl LineEditor {
    pub(super) fn handle_char(
        &mut self,
        ch: char,
        modifiers: ControlKeyState,
        ctx: &mut ReadContext<'_>,
        channel: &mut OutputChannel,
    ) {
        if self.options.wakeup_mask.contains(ch) {
            // Drop the tail and show the line, then store the control
            // character without ever echoing it.
            let cursor = self.buffer.cursor();
            self.buffer.replace(cursor, usize::MAX, "");
            self.flush(ctx, channel);
            let mut utf8 = [0u8; 4];
            self.buffer.replace(cursor, 0, ch.encode_utf8(&mut utf8));
            self.buffer.mark_clean();

            self.control_key_state = modifiers;
            self.transition(ReadState::DoneWithWakeupMask);
            return;
        }

        match ch {
            CARRIAGE_RETURN => {
                // The newline itself is appended at completion.
                self.buffer.set_cursor(usize::MAX);
                self.transition(ReadState::DoneWithCarriageReturn);
                return;
            }
            BACKSPACE | ERASE_PREV_WORD if self.has_mode(InputModes::PROCESSED) => {
                let text = self.buffer.text();
                let cursor = self.buffer.cursor();
                let pos = if ch == ERASE_PREV_WORD {
                    word_prev(text, cursor)
                } else {
                    grapheme::prev_boundary(text, cursor)
                };
                self.buffer.replace(pos, cursor - pos, "");
                return;
            }
            _ => {}
        }

        let cursor = self.buffer.cursor();
        let remove = if self.insert_mode {
            0
        } else {
            grapheme::next_boundary(self.buffer.text(), cursor) - cursor
        };
        let mut utf8 = [0u8; 4];
        self.buffer.replace(cursor, remove, ch.encode_utf8(&mut utf8));
    }
}
