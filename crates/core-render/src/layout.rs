//! Line layout: text slice + column budget -> display text.
//!
//! Tabs expand to the next multiple of 8 (clipped to the budget). Control
//! characters render as two-column caret notation: `^@`..`^_` for C0, `^?`
//! for DEL and `^@`..`^_` shifted down by 0x40 for C1. A substitution that does
//! not fit is deferred whole to the next line; the current line is then padded
//! to the limit with spaces so the terminal row is fully covered.
//!
//! Invariants:
//! - The returned offset is a char boundary of `input` and never moves back.
//! - The returned column never exceeds `column_limit`.
//! - A fresh line (`column_begin == 0`) always consumes at least one unit, so
//!   callers wrapping in a loop cannot spin.

use core_terminal::is_control_character;
use core_text::{fit_into_columns, grapheme};

const TAB_STOP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutResult {
    /// Byte offset into `input` where layout stopped.
    pub offset: usize,
    /// Column reached on the current line.
    pub column: usize,
}

/// One row of rendered output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayLine {
    /// Printable text, possibly with embedded escape sequences.
    pub text: String,
    /// Column of the first byte of `text`.
    pub start_col: usize,
    /// Column reached after `text`.
    pub columns: usize,
    /// Byte index into `text` where stale output begins.
    pub dirty_beg: usize,
    /// Screen column matching `dirty_beg`.
    pub dirty_col: usize,
    /// Append an erase-to-end-of-line after the text.
    pub clear_tail: bool,
}

impl DisplayLine {
    pub fn starting_at(column: usize) -> Self {
        Self {
            start_col: column,
            columns: column,
            dirty_col: column,
            ..Self::default()
        }
    }

    /// A fully dirty row whose text carries its own erase sequence.
    pub fn overlay(text: String, columns: usize) -> Self {
        Self {
            text,
            columns,
            ..Self::default()
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_beg < self.text.len() || self.clear_tail
    }

    /// Treat the entire row as stale.
    pub fn mark_dirty(&mut self) {
        self.dirty_beg = 0;
        self.dirty_col = self.start_col;
    }
}

fn is_control(c: char) -> bool {
    is_control_character(u32::from(c))
}

/// Caret notation for a control character, e.g. `^C`, `^?`.
pub fn caret_form(c: char) -> [char; 2] {
    let cp = u32::from(c);
    let shown = match cp {
        0x7F => '?',
        0x00..=0x1F => char::from_u32(cp + 0x40).unwrap_or('?'),
        _ => char::from_u32(cp - 0x40).unwrap_or('?'),
    };
    ['^', shown]
}

/// Lay out `input[offset..]` into `out` starting at `column_begin`, stopping
/// at `column_limit` or the end of `input`.
pub fn layout_line(
    out: &mut String,
    input: &str,
    offset: usize,
    column_begin: usize,
    column_limit: usize,
) -> LayoutResult {
    let mut it = offset.min(input.len());
    let mut column = column_begin.min(column_limit);
    let fresh = column == 0 && column_limit > 0;

    while it < input.len() {
        let rest = &input[it..];
        let run = rest.find(is_control).unwrap_or(rest.len());
        if run > 0 {
            let text = &rest[..run];
            let fit = fit_into_columns(text, column_limit - column);
            if fit.len == 0 && fresh && column == 0 {
                // Cluster wider than the whole line: print it anyway.
                let end = grapheme::next_boundary(text, 0);
                out.push_str(&text[..end]);
                it += end;
                column = column_limit;
                break;
            }
            out.push_str(&text[..fit.len]);
            column += fit.columns;
            it += fit.len;
            if fit.len < text.len() || it == input.len() {
                break;
            }
        }

        let Some(c) = input[it..].chars().next() else {
            break;
        };
        let remaining = column_limit - column;
        if c == '\t' {
            let len = (TAB_STOP - column % TAB_STOP).min(remaining);
            if len == 0 {
                break;
            }
            out.extend(std::iter::repeat_n(' ', len));
            column += len;
        } else {
            let caret = caret_form(c);
            if caret.len() > remaining {
                if fresh && column == 0 {
                    out.extend(&caret[..remaining]);
                    column = column_limit;
                    it += c.len_utf8();
                }
                break;
            }
            out.extend(caret);
            column += caret.len();
        }
        it += c.len_utf8();
    }

    if it < input.len() && column < column_limit {
        out.extend(std::iter::repeat_n(' ', column_limit - column));
        column = column_limit;
    }

    LayoutResult { offset: it, column }
}
