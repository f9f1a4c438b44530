use core_events::{ControlKeyState, EditKey, Event, InputUnit, WaitTerminationReason};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

const BACKSPACE: char = '\u{8}';
const DEL: char = '\u{7f}';

/// Map a crossterm key event into the event the host loop consumes.
///
/// Keys that conventionally produce control codes become characters: Enter is
/// `\r`, Tab is `\t`, Backspace is BS and Ctrl+Backspace is DEL. Ctrl+C and
/// Ctrl+Break become termination events instead of input. Releases and keys
/// without a console meaning (media keys, lone modifiers) return `None`.
pub fn translate_key(event: &CKeyEvent) -> Option<Event> {
    if !matches!(event.kind, CKeyEventKind::Press | CKeyEventKind::Repeat) {
        return None;
    }
    let modifiers = map_modifiers(event.modifiers);
    let ctrl = event.modifiers.contains(CKeyModifiers::CONTROL);

    let unit = match event.code {
        CKeyCode::Char('c' | 'C') if ctrl => {
            return Some(Event::Terminate(WaitTerminationReason::CTRL_C));
        }
        CKeyCode::Pause if ctrl => {
            return Some(Event::Terminate(WaitTerminationReason::CTRL_BREAK));
        }
        CKeyCode::Char(c) => InputUnit::Char {
            ch: if ctrl { control_code(c).unwrap_or(c) } else { c },
            modifiers,
        },
        CKeyCode::Enter => InputUnit::Char { ch: '\r', modifiers },
        CKeyCode::Tab => InputUnit::Char { ch: '\t', modifiers },
        CKeyCode::BackTab => InputUnit::Char {
            ch: '\t',
            modifiers: modifiers | ControlKeyState::SHIFT,
        },
        CKeyCode::Backspace => InputUnit::Char {
            ch: if ctrl { DEL } else { BACKSPACE },
            modifiers,
        },
        CKeyCode::Esc => InputUnit::key_with(EditKey::Escape, modifiers),
        CKeyCode::Home => InputUnit::key_with(EditKey::Home, modifiers),
        CKeyCode::End => InputUnit::key_with(EditKey::End, modifiers),
        CKeyCode::Left => InputUnit::key_with(EditKey::Left, modifiers),
        CKeyCode::Right => InputUnit::key_with(EditKey::Right, modifiers),
        CKeyCode::Up => InputUnit::key_with(EditKey::Up, modifiers),
        CKeyCode::Down => InputUnit::key_with(EditKey::Down, modifiers),
        CKeyCode::PageUp => InputUnit::key_with(EditKey::PageUp, modifiers),
        CKeyCode::PageDown => InputUnit::key_with(EditKey::PageDown, modifiers),
        CKeyCode::Insert => InputUnit::key_with(EditKey::Insert, modifiers),
        CKeyCode::Delete => InputUnit::key_with(EditKey::Delete, modifiers),
        CKeyCode::F(n) => InputUnit::key_with(EditKey::F(n), modifiers),
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_)
        | CKeyCode::Modifier(_) => return None,
    };
    Some(Event::Input(unit))
}

/// Ctrl+letter and Ctrl+`@[\]^_` produce the C0 code with the same low five bits.
fn control_code(c: char) -> Option<char> {
    let upper = c.to_ascii_uppercase();
    if ('@'..='_').contains(&upper) {
        char::from_u32(u32::from(upper) & 0x1f)
    } else {
        None
    }
}

/// Crossterm does not tell left from right; report the left-hand bits.
pub(crate) fn map_modifiers(mods: CKeyModifiers) -> ControlKeyState {
    let mut out = ControlKeyState::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ControlKeyState::LEFT_CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ControlKeyState::LEFT_ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ControlKeyState::SHIFT;
    }
    out
}

/// Pasted text as input units. Line breaks of any style arrive as a single `\r`.
pub fn paste_units(text: &str) -> impl Iterator<Item = InputUnit> + '_ {
    let mut after_cr = false;
    text.chars().filter_map(move |c| {
        let unit = match c {
            '\n' if after_cr => None,
            '\n' | '\r' => Some(InputUnit::ch('\r')),
            _ => Some(InputUnit::ch(c)),
        };
        after_cr = c == '\r';
        unit
    })
}
