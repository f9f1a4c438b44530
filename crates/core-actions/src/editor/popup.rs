use core_events::{EditKey, InputUnit};
use core_state::{CommandHistory, CommandList, CommandNumber, Popup, PopupError, PopupKind};
use core_terminal::OutputChannel;

use super::LineEditor;
use crate::context::ReadContext;

fn build_popup(kind: PopupKind, history: Option<&dyn CommandHistory>) -> Result<Popup, PopupError> {
    let non_empty = history.filter(|h| h.count() > 0);
    match kind {
        PopupKind::CopyFromChar => Ok(Popup::CopyFromChar),
        PopupKind::CopyToChar => history
            .map(|_| Popup::CopyToChar)
            .ok_or(PopupError::EmptyHistory(kind)),
        PopupKind::CommandNumber => non_empty
            .map(|_| Popup::CommandNumber(CommandNumber::new()))
            .ok_or(PopupError::EmptyHistory(kind)),
        PopupKind::CommandList => non_empty
            .map(|h| Popup::CommandList(CommandList::new(h.last_displayed())))
            .ok_or(PopupError::EmptyHistory(kind)),
    }
}

impl LineEditor {
    pub(super) fn popup_push(&mut self, kind: PopupKind, ctx: &ReadContext<'_>) {
        let pushed = build_popup(kind, ctx.history.as_deref()).and_then(|popup| self.popups.push(popup));
        match pushed {
            Ok(()) => self.buffer.suspend(true),
            Err(err) => {
                tracing::error!(target: "editor.popup", ?kind, %err, "popup construction failed");
                self.popups_done();
            }
        }
    }

    pub(super) fn popups_done(&mut self) {
        self.popups.done();
        self.buffer.suspend(false);
    }

    pub(super) fn popup_input(&mut self, unit: InputUnit, ctx: &mut ReadContext<'_>, channel: &mut OutputChannel) {
        let Some(kind) = self.popups.top().map(Popup::kind) else {
            return;
        };
        match kind {
            PopupKind::CopyToChar => self.copy_to_char_input(unit, ctx),
            PopupKind::CopyFromChar => self.copy_from_char_input(unit),
            PopupKind::CommandNumber => self.command_number_input(unit, ctx),
            PopupKind::CommandList => self.command_list_input(unit, ctx, channel),
        }
    }

    fn copy_to_char_input(&mut self, unit: InputUnit, ctx: &ReadContext<'_>) {
        match unit {
            InputUnit::Key { key: EditKey::Escape, .. } => self.popups_done(),
            InputUnit::Key { .. } => {}
            InputUnit::Char { ch, .. } => {
                if let Some(history) = ctx.history.as_deref() {
                    let cmd = history.last_command();
                    let cursor = self.buffer.cursor();
                    let found = cmd
                        .get(cursor..)
                        .and_then(|tail| tail.find(ch))
                        .map(|i| cursor + i);
                    if let Some(idx) = found {
                        self.buffer.replace(cursor, idx - cursor, &cmd[cursor..idx]);
                    }
                }
                self.popups_done();
            }
        }
    }

    fn copy_from_char_input(&mut self, unit: InputUnit) {
        match unit {
            InputUnit::Key { key: EditKey::Escape, .. } => self.popups_done(),
            InputUnit::Key { .. } => {}
            InputUnit::Char { ch, .. } => {
                let cursor = self.buffer.cursor();
                let text = self.buffer.text();
                let idx = text[cursor..].find(ch).map_or(text.len(), |i| cursor + i);
                self.buffer.replace(cursor, idx - cursor, "");
                self.popups_done();
            }
        }
    }

    fn command_number_input(&mut self, unit: InputUnit, ctx: &mut ReadContext<'_>) {
        let Some(Popup::CommandNumber(number)) = self.popups.top_mut() else {
            return;
        };
        match unit {
            InputUnit::Key { key: EditKey::Escape, .. } => self.popups_done(),
            InputUnit::Key { .. } => {}
            InputUnit::Char { ch: '\r', .. } => {
                // An empty or unparsable field simply dismisses.
                let value = number.value();
                if let (Some(index), Some(history)) = (value, ctx.history.as_deref_mut()) {
                    self.buffer.replace_all(history.retrieve_nth(index));
                }
                self.popups_done();
            }
            InputUnit::Char { ch: '\u{8}', .. } => {
                if number.pop_digit() {
                    self.popups.mark_dirty();
                }
            }
            InputUnit::Char { ch, .. } => {
                if ch.is_ascii_digit() && number.push_digit(ch) {
                    self.popups.mark_dirty();
                }
            }
        }
    }

    fn command_list_input(&mut self, unit: InputUnit, ctx: &mut ReadContext<'_>, channel: &mut OutputChannel) {
        let Some(history) = ctx.history.as_deref_mut() else {
            self.popups_done();
            return;
        };
        let count = history.count();
        let Some(Popup::CommandList(list)) = self.popups.top_mut() else {
            return;
        };
        let selected = list.selected_index(count);

        let (key, modifiers) = match unit {
            InputUnit::Char { ch: '\r', modifiers } => {
                self.buffer.replace_all(history.retrieve_nth(selected));
                self.popups_done();
                self.handle_char('\r', modifiers, ctx, channel);
                return;
            }
            InputUnit::Char { .. } => return,
            InputUnit::Key { key, modifiers } => (key, modifiers),
        };

        match key {
            EditKey::Escape => {
                self.popups_done();
                return;
            }
            EditKey::F(9) => {
                self.popup_push(PopupKind::CommandNumber, ctx);
                return;
            }
            EditKey::Delete => {
                history.remove(selected);
                if history.count() == 0 {
                    self.popups_done();
                    return;
                }
            }
            EditKey::Left | EditKey::Right => {
                self.buffer.replace_all(history.retrieve_nth(selected));
                self.popups_done();
                return;
            }
            EditKey::Up => {
                if modifiers.shift() && selected > 0 {
                    history.swap(selected, selected - 1);
                }
                list.move_by(-1);
            }
            EditKey::Down => {
                if modifiers.shift() {
                    history.swap(selected, selected + 1);
                }
                list.move_by(1);
            }
            EditKey::Home => list.selected = 0,
            EditKey::End => list.selected = isize::MAX,
            EditKey::PageUp => list.page(-1),
            EditKey::PageDown => list.page(1),
            _ => return,
        }
        self.popups.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::MemoryHistory;

    #[test]
    fn popups_needing_history_fail_without_it() {
        assert_eq!(
            build_popup(PopupKind::CopyToChar, None),
            Err(PopupError::EmptyHistory(PopupKind::CopyToChar))
        );
        assert_eq!(build_popup(PopupKind::CopyFromChar, None), Ok(Popup::CopyFromChar));
        let empty = MemoryHistory::default();
        assert!(build_popup(PopupKind::CommandList, Some(&empty)).is_err());
    }

    #[test]
    fn command_list_starts_at_last_displayed() {
        let history = MemoryHistory::from_lines(["a", "b", "c"]);
        let popup = build_popup(PopupKind::CommandList, Some(&history)).unwrap();
        assert_eq!(popup, Popup::CommandList(CommandList::new(2)));
    }
}
