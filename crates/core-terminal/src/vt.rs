//! VT sequence builders over a `String` buffer.
//!
//! Where crossterm's commands produce the exact bytes we need they are used
//! directly; the parameterless SGR reset (`ESC[m`) is written by hand because
//! crossterm emits `ESC[0m`.

use crossterm::{
    Command,
    cursor::{Hide, MoveTo, Show},
    terminal::{Clear, ClearType, ScrollDown, ScrollUp},
};

/// Zero-based screen coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

fn push(out: &mut String, cmd: impl Command) {
    // fmt::Write into a String cannot fail.
    let _ = cmd.write_ansi(out);
}

/// `ESC[{y+1};{x+1}H`
pub fn cup(out: &mut String, pos: Point) {
    push(out, MoveTo(pos.x, pos.y));
}

/// `ESC[H`
pub fn home(out: &mut String) {
    out.push_str("\x1b[H");
}

/// `ESC[K`
pub fn erase_line(out: &mut String) {
    push(out, Clear(ClearType::UntilNewLine));
}

/// `ESC[J`
pub fn erase_below(out: &mut String) {
    push(out, Clear(ClearType::FromCursorDown));
}

/// `ESC[{n}S` for positive `delta`, `ESC[{n}T` for negative.
pub fn scroll(out: &mut String, delta: i32) {
    let n = u16::try_from(delta.unsigned_abs()).unwrap_or(u16::MAX);
    if delta > 0 {
        push(out, ScrollUp(n));
    } else if delta < 0 {
        push(out, ScrollDown(n));
    }
}

/// `ESC[?25h` / `ESC[?25l`
pub fn cursor_visible(out: &mut String, visible: bool) {
    if visible {
        push(out, Show);
    } else {
        push(out, Hide);
    }
}

/// `ESC[m`
pub fn sgr_reset(out: &mut String) {
    out.push_str("\x1b[m");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sequences_are_byte_exact() {
        let mut s = String::new();
        cup(&mut s, Point::new(4, 2));
        erase_line(&mut s);
        erase_below(&mut s);
        home(&mut s);
        scroll(&mut s, 3);
        scroll(&mut s, -2);
        scroll(&mut s, 0);
        cursor_visible(&mut s, false);
        cursor_visible(&mut s, true);
        sgr_reset(&mut s);
        assert_eq!(
            s,
            "\x1b[3;5H\x1b[K\x1b[J\x1b[H\x1b[3S\x1b[2T\x1b[?25l\x1b[?25h\x1b[m"
        );
    }
}
