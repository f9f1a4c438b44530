use core_events::{ControlKeyState, EditKey};
use core_state::{PopupKind, SearchDirection};
use core_terminal::OutputChannel;
use core_text::{grapheme, word_next, word_prev};

use super::LineEditor;
use crate::context::ReadContext;

/// Ctrl+Z, which F6 types.
const SUBSTITUTE: char = '\u{1a}';

impl LineEditor {
    pub(super) fn handle_key(
        &mut self,
        key: EditKey,
        modifiers: ControlKeyState,
        ctx: &mut ReadContext<'_>,
        channel: &mut OutputChannel,
    ) {
        let ctrl = modifiers.ctrl();
        let alt = modifiers.alt();
        let cursor = self.buffer.cursor();
        let len = self.buffer.len();

        match key {
            EditKey::Escape => {
                if !self.buffer.is_empty() {
                    self.buffer.replace(0, usize::MAX, "");
                }
            }
            EditKey::Home => {
                if cursor > 0 {
                    if ctrl {
                        self.buffer.replace(0, cursor, "");
                    }
                    self.buffer.set_cursor(0);
                }
            }
            EditKey::End => {
                if cursor < len {
                    if ctrl {
                        self.buffer.replace(cursor, usize::MAX, "");
                    }
                    self.buffer.set_cursor(usize::MAX);
                }
            }
            EditKey::Left => {
                if cursor > 0 {
                    let text = self.buffer.text();
                    let pos = if ctrl {
                        word_prev(text, cursor)
                    } else {
                        grapheme::prev_boundary(text, cursor)
                    };
                    self.buffer.set_cursor(pos);
                }
            }
            EditKey::Right | EditKey::F(1) => {
                if cursor < len {
                    let text = self.buffer.text();
                    let pos = if ctrl && key == EditKey::Right {
                        word_next(text, cursor)
                    } else {
                        grapheme::next_boundary(text, cursor)
                    };
                    self.buffer.set_cursor(pos);
                } else if let Some(history) = ctx.history.as_deref() {
                    self.paste_from_last_command(history.last_command());
                }
            }
            EditKey::Insert => {
                self.insert_mode = !self.insert_mode;
                ctx.screen
                    .set_cursor_double_mode(self.insert_mode != self.options.insert_mode);
            }
            EditKey::Delete => {
                if cursor < len {
                    let end = grapheme::next_boundary(self.buffer.text(), cursor);
                    self.buffer.replace(cursor, end - cursor, "");
                }
            }
            EditKey::Up | EditKey::F(5) => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_first_command() {
                        self.buffer.replace_all(history.retrieve(SearchDirection::Previous));
                    }
                }
            }
            EditKey::Down => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_last_command() {
                        self.buffer.replace_all(history.retrieve(SearchDirection::Next));
                    }
                }
            }
            EditKey::PageUp => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_first_command() {
                        self.buffer.replace_all(history.retrieve_nth(0));
                    }
                }
            }
            EditKey::PageDown => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    if !history.at_last_command() {
                        self.buffer.replace_all(history.retrieve_nth(usize::MAX));
                    }
                }
            }
            EditKey::F(2) => {
                if ctx.history.is_some() {
                    self.popup_push(PopupKind::CopyToChar, ctx);
                }
            }
            EditKey::F(3) => {
                if let Some(history) = ctx.history.as_deref() {
                    let last = history.last_command();
                    if last.len() > cursor {
                        if let Some(tail) = last.get(cursor..) {
                            self.buffer.replace(cursor, usize::MAX, tail);
                        }
                    }
                }
            }
            EditKey::F(4) => self.popup_push(PopupKind::CopyFromChar, ctx),
            EditKey::F(6) => self.handle_char(SUBSTITUTE, modifiers, ctx, channel),
            EditKey::F(7) => {
                if !ctrl && !alt {
                    if ctx.history.as_deref().is_some_and(|h| h.count() > 0) {
                        self.popup_push(PopupKind::CommandList, ctx);
                    }
                } else if alt {
                    if let Some(history) = ctx.history.as_deref_mut() {
                        history.clear();
                    }
                }
            }
            EditKey::F(8) => {
                if let Some(history) = ctx.history.as_deref_mut() {
                    let start = history.last_displayed();
                    if let Some(index) = history.find_matching(&self.buffer.text()[..cursor], start) {
                        self.buffer.replace_all(history.retrieve_nth(index));
                        self.buffer.set_cursor(cursor);
                    }
                }
            }
            EditKey::F(9) => {
                if ctx.history.as_deref().is_some_and(|h| h.count() > 0) {
                    self.popup_push(PopupKind::CommandNumber, ctx);
                }
            }
            EditKey::F(10) => {
                if alt {
                    ctx.aliases.clear(&self.options.exe_name);
                }
            }
            EditKey::F(_) => {}
        }
    }

    /// Right arrow at the end of the line: copy the next grapheme of the last
    /// command that lies beyond what the buffer already covers.
    fn paste_from_last_command(&mut self, cmd: &str) {
        let mut buffer_beg = 0;
        let mut cmd_beg = 0;
        while cmd_beg < cmd.len() {
            let cmd_end = grapheme::next_boundary(cmd, cmd_beg);
            if buffer_beg >= self.buffer.len() {
                self.buffer.replace(usize::MAX, 0, &cmd[cmd_beg..cmd_end]);
                break;
            }
            buffer_beg = grapheme::next_boundary(self.buffer.text(), buffer_beg);
            cmd_beg = cmd_end;
        }
    }
}
