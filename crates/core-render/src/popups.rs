//! Popup rows appended below the prompt.
//!
//! Prompt popups draw a single row in the popup attributes. The command list
//! draws one full-width row per visible entry with a scrollbar column, a
//! selection marker and a right-aligned index.

use core_state::{CommandHistory, CommandList, Popup};
use core_terminal::{CellAttributes, format_attributes, vt};

use crate::layout::{DisplayLine, layout_line};
use crate::viewport::Viewport;

pub const COPY_TO_CHAR_PROMPT: &str = "Enter char to copy up to: ";
pub const COPY_FROM_CHAR_PROMPT: &str = "Enter char to delete up to: ";
pub const COMMAND_NUMBER_PROMPT: &str = "Enter command number: ";

const ARROW_UP: char = '\u{25B2}';
const ARROW_DOWN: char = '\u{25BC}';
const THUMB: char = '\u{2588}';
const TRACK: char = '\u{2592}';
const MARKER: char = '\u{25B8}';
const ELLIPSIS: char = '\u{2026}';

/// Colors and size limits for popups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupStyle {
    pub attributes: CellAttributes,
    pub max_height: usize,
}

impl Default for PopupStyle {
    fn default() -> Self {
        Self {
            attributes: CellAttributes::from_bits_retain(0xF5),
            max_height: 20,
        }
    }
}

/// Append the rows for `popup` to `lines`.
pub fn draw_popup(
    lines: &mut Vec<DisplayLine>,
    popup: &mut Popup,
    history: Option<&dyn CommandHistory>,
    viewport: Viewport,
    style: &PopupStyle,
) {
    match popup {
        Popup::CopyToChar => draw_prompt(lines, COPY_TO_CHAR_PROMPT, "", viewport, style),
        Popup::CopyFromChar => draw_prompt(lines, COPY_FROM_CHAR_PROMPT, "", viewport, style),
        Popup::CommandNumber(number) => {
            let field = number.field();
            draw_prompt(lines, COMMAND_NUMBER_PROMPT, &field, viewport, style);
        }
        Popup::CommandList(list) => {
            if let Some(history) = history {
                draw_command_list(lines, list, history, viewport, style);
            }
        }
    }
}

fn draw_prompt(lines: &mut Vec<DisplayLine>, prompt: &str, suffix: &str, viewport: Viewport, style: &PopupStyle) {
    let mut text = String::new();
    format_attributes(&mut text, style.attributes);
    let label = format!("{prompt}{suffix}");
    let res = layout_line(&mut text, &label, 0, 0, viewport.width);
    vt::sgr_reset(&mut text);
    vt::erase_line(&mut text);
    lines.push(DisplayLine::overlay(text, res.column));
}

fn scrollbar_char(row: usize, height: usize, thumb: usize, count: usize) -> char {
    if count <= height {
        ' '
    } else if row == 0 {
        ARROW_UP
    } else if row + 1 == height {
        ARROW_DOWN
    } else if row == thumb {
        THUMB
    } else {
        TRACK
    }
}

fn digits(mut n: usize) -> usize {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}

fn draw_command_list(
    lines: &mut Vec<DisplayLine>,
    list: &mut CommandList,
    history: &dyn CommandHistory,
    viewport: Viewport,
    style: &PopupStyle,
) {
    let count = history.count();
    if count == 0 {
        return;
    }
    let (top, height) = list.clamp(count, viewport.height, style.max_height);
    let selected = list.selected_index(count);
    let thumb = list.thumb_row(count, height);
    let index_width = digits(count);
    let width = viewport.width;
    let limit = width.saturating_sub(1);

    for row in 0..height {
        let index = top + row;
        let is_selected = index == selected;

        let mut text = String::new();
        format_attributes(&mut text, style.attributes);
        text.push(scrollbar_char(row, height, thumb, count));
        let mut column = 1;
        if !is_selected {
            vt::sgr_reset(&mut text);
        }
        if width > column {
            text.push(if is_selected { MARKER } else { ' ' });
            column += 1;
        }
        let label = format!("{index:>index_width$}: ");
        column = layout_line(&mut text, &label, 0, column, width).column;

        // A narrow viewport may clip the label and leave no room for the entry.
        let entry = history.nth(index);
        let mut truncated = !entry.is_empty();
        if column < limit {
            let res = layout_line(&mut text, entry, 0, column, limit);
            column = res.column;
            truncated = res.offset < entry.len();
        }
        if truncated && column < width {
            text.push(ELLIPSIS);
            column += 1;
        }
        if is_selected {
            vt::sgr_reset(&mut text);
        }
        vt::erase_line(&mut text);
        lines.push(DisplayLine::overlay(text, column));
    }
}
