//! Differential redraw of the prompt and its popups.
//!
//! The buffer is laid out into display lines starting at the prompt origin.
//! Only the part of each line past the dirty watermark is written, each row
//! addressed with its own cursor position. When the layout no longer fits the
//! viewport the prompt turns into a pager: the origin moves to the top-left
//! corner and a `height`-row window follows the cursor, shifted with scroll
//! sequences instead of repainting.
//!
//! A flush with a clean buffer and no popup change writes nothing.

use core_state::{BufferState, CommandHistory, DirtyState, PopupStack};
use core_terminal::{OutputChannel, Point, vt};

use crate::layout::{DisplayLine, layout_line};
use crate::popups::{PopupStyle, draw_popup};
use crate::viewport::Viewport;

/// Spaces are cheaper than `ESC[K` for short stale tails.
const MAX_PADDING: usize = 8;

/// Position in layout space: `row` indexes display lines, not screen rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinePos {
    pub col: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Default)]
struct PromptLayout {
    lines: Vec<DisplayLine>,
    cursor: LinePos,
    dirty: LinePos,
    end: LinePos,
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn last_pos(lines: &[DisplayLine]) -> LinePos {
    let row = lines.len().saturating_sub(1);
    LinePos {
        col: lines.last().map_or(0, |l| l.columns),
        row,
    }
}

/// Split `text` at the dirty watermark and the cursor and lay out the three
/// segments, recording where each boundary lands.
fn layout_prompt(text: &str, cursor: usize, dirty_from: usize, origin_x: usize, width: usize) -> PromptLayout {
    let start = LinePos { col: origin_x, row: 0 };
    let mut layout = PromptLayout {
        lines: vec![DisplayLine::starting_at(origin_x)],
        cursor: start,
        dirty: start,
        end: start,
    };
    let offsets = [0, dirty_from.min(cursor), dirty_from.max(cursor), text.len()];

    for pair in offsets.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from < to {
            let segment = &text[from..to];
            let dirty = from >= dirty_from;
            let mut beg = 0;
            while beg < segment.len() {
                if layout.lines.last().is_some_and(|l| l.columns >= width) {
                    layout.lines.push(DisplayLine::starting_at(0));
                }
                let Some(line) = layout.lines.last_mut() else {
                    break;
                };
                let res = layout_line(&mut line.text, segment, beg, line.columns, width);
                if !dirty {
                    line.dirty_beg = line.text.len();
                    line.dirty_col = res.column;
                }
                line.columns = res.column;
                beg = res.offset;
            }
        }
        let pos = last_pos(&layout.lines);
        if to == cursor {
            layout.cursor = pos;
        }
        if to == dirty_from {
            layout.dirty = pos;
        }
    }

    layout.end = last_pos(&layout.lines);
    layout
}

/// Screen state carried between flushes.
#[derive(Debug, Clone)]
pub struct Redrawer {
    origin: Point,
    pager_top: usize,
    rendered_end: Option<LinePos>,
    rendered_lines: usize,
    rendered_rows: usize,
    popup_shown: bool,
    style: PopupStyle,
}

impl Redrawer {
    pub fn new(origin: Point, style: PopupStyle) -> Self {
        Self {
            origin,
            pager_top: 0,
            rendered_end: None,
            rendered_lines: 0,
            rendered_rows: 0,
            popup_shown: false,
            style,
        }
    }

    /// Screen position of the first prompt cell.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn pager_top(&self) -> usize {
        self.pager_top
    }

    pub fn style(&self) -> &PopupStyle {
        &self.style
    }

    fn clamped_origin(&self, viewport: Viewport) -> Point {
        Point::new(
            self.origin.x.min(to_u16(viewport.width.saturating_sub(1))),
            self.origin.y.min(to_u16(viewport.height.saturating_sub(1))),
        )
    }

    /// Bring the terminal in line with `buffer` and `popups`. Returns whether
    /// anything was written.
    pub fn flush(
        &mut self,
        channel: &mut OutputChannel,
        buffer: &mut BufferState,
        popups: &mut PopupStack,
        history: Option<&dyn CommandHistory>,
        viewport: Viewport,
    ) -> bool {
        if buffer.is_clean() && !popups.is_dirty() {
            return false;
        }
        let viewport = Viewport::new(viewport.width, viewport.height);
        let width = viewport.width;
        let height = viewport.height;
        let mut origin = self.clamped_origin(viewport);
        let mut dirty_from = match buffer.dirty() {
            DirtyState::Clean => buffer.len(),
            DirtyState::DirtyFrom(n) => n.min(buffer.len()),
        };
        let mut relayout = false;

        let mut layout = loop {
            let mut layout = layout_prompt(buffer.text(), buffer.cursor(), dirty_from, usize::from(origin.x), width);
            if let Some(popup) = popups.top_mut() {
                draw_popup(&mut layout.lines, popup, history, viewport, &self.style);
                layout.cursor = last_pos(&layout.lines);
            } else if layout.cursor.col >= width {
                layout.cursor = LinePos {
                    col: 0,
                    row: layout.cursor.row + 1,
                };
                if buffer.cursor() == buffer.len() {
                    layout.lines.push(DisplayLine::starting_at(0));
                }
            }
            if layout.lines.len() > height && origin.x != 0 {
                // Switching to pager mode: restart flush against the left edge.
                origin.x = 0;
                dirty_from = 0;
                relayout = true;
                continue;
            }
            break layout;
        };

        // Erase whatever the previous frame left past the new prompt end.
        let end = layout.end;
        let clear_to = match self.rendered_end {
            _ if relayout => Some(width),
            Some(prev) if prev.row == end.row => Some(prev.col),
            Some(_) if end.row < self.rendered_lines => Some(width),
            _ => None,
        };
        if let Some(to) = clear_to {
            let line = &mut layout.lines[end.row];
            let remaining = to.saturating_sub(line.columns);
            if remaining > MAX_PADDING {
                vt::erase_line(&mut line.text);
            } else if remaining > 0 {
                line.text.extend(std::iter::repeat_n(' ', remaining));
            }
        }

        let line_count = layout.lines.len();
        let pager_height = viewport.pager_height(line_count);
        let old_origin_y = usize::from(origin.y);
        let origin_y = old_origin_y.min(height - pager_height);
        let pager_top = viewport.clamp_cursor_into_view(self.pager_top, layout.cursor.row, line_count);

        let mut out = String::new();
        let popup_open = !popups.is_empty();
        if popup_open != self.popup_shown {
            vt::cursor_visible(&mut out, !popup_open);
        }
        if origin_y < old_origin_y {
            // Make room below the prompt the way a wrapping write would.
            vt::scroll(&mut out, i32::from(to_u16(old_origin_y - origin_y)));
        }

        if pager_top != self.pager_top {
            let shift = pager_top.abs_diff(self.pager_top);
            let exposed = if shift >= height {
                0..pager_height
            } else {
                vt::home(&mut out);
                let delta = i32::from(to_u16(shift));
                if pager_top > self.pager_top {
                    vt::scroll(&mut out, delta);
                    pager_height.saturating_sub(shift)..pager_height
                } else {
                    vt::scroll(&mut out, -delta);
                    0..shift.min(pager_height)
                }
            };
            for row in exposed {
                let line = &mut layout.lines[pager_top + row];
                line.mark_dirty();
                line.clear_tail |= shift >= height;
            }
        }

        for row in 0..pager_height {
            let line = &layout.lines[pager_top + row];
            if !line.is_dirty() {
                continue;
            }
            vt::cup(&mut out, Point::new(to_u16(line.dirty_col), to_u16(origin_y + row)));
            out.push_str(&line.text[line.dirty_beg..]);
            if line.clear_tail {
                vt::erase_line(&mut out);
            }
        }

        for row in pager_height..self.rendered_rows.min(height) {
            vt::cup(&mut out, Point::new(0, to_u16(origin_y + row)));
            vt::erase_line(&mut out);
        }

        let cursor_row = origin_y + layout.cursor.row - pager_top;
        let cursor_col = layout.cursor.col.min(width.saturating_sub(1));
        vt::cup(&mut out, Point::new(to_u16(cursor_col), to_u16(cursor_row)));

        tracing::trace!(
            target: "render.redraw",
            lines = line_count,
            pager_top,
            dirty_row = layout.dirty.row,
            relayout,
            bytes = out.len(),
            "flush"
        );
        channel.write_text(&out);

        self.origin = Point::new(origin.x, to_u16(origin_y));
        self.pager_top = pager_top;
        self.rendered_end = Some(end);
        self.rendered_lines = line_count;
        self.rendered_rows = pager_height;
        self.popup_shown = popup_open;
        buffer.mark_clean();
        popups.mark_clean();
        true
    }

    /// Wipe the prompt before the terminal reflows.
    pub fn erase_before_resize(&self, channel: &mut OutputChannel) {
        let mut out = String::new();
        vt::cup(&mut out, self.origin);
        vt::erase_below(&mut out);
        channel.write_text(&out);
    }

    /// Repaint everything for the new `viewport`.
    pub fn redraw_after_resize(
        &mut self,
        channel: &mut OutputChannel,
        buffer: &mut BufferState,
        popups: &mut PopupStack,
        history: Option<&dyn CommandHistory>,
        viewport: Viewport,
    ) -> bool {
        self.origin = self.clamped_origin(viewport);
        self.pager_top = 0;
        self.rendered_end = None;
        self.rendered_lines = 0;
        self.rendered_rows = 0;
        buffer.mark_all_dirty();
        popups.mark_dirty();
        self.flush(channel, buffer, popups, history, viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn segments_split_at_cursor_and_watermark() {
        let layout = layout_prompt("abcdefghij", 3, 6, 2, 5);
        let texts: Vec<&str> = layout.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["abc", "defgh", "ij"]);
        assert_eq!(layout.cursor, LinePos { col: 5, row: 0 });
        // Line 1 holds "def" clean and "gh" dirty.
        assert_eq!(layout.lines[1].dirty_beg, 3);
        assert_eq!(layout.lines[1].dirty_col, 3);
        assert_eq!(layout.lines[0].dirty_beg, 3);
        assert_eq!(layout.dirty, LinePos { col: 3, row: 1 });
        assert_eq!(layout.end, LinePos { col: 2, row: 2 });
    }

    #[test]
    fn fully_dirty_prompt_starts_at_origin() {
        let layout = layout_prompt("abc", 3, 0, 4, 80);
        assert_eq!(layout.lines[0].dirty_beg, 0);
        assert_eq!(layout.lines[0].dirty_col, 4);
        assert_eq!(layout.cursor, LinePos { col: 7, row: 0 });
    }

    #[test]
    fn clean_text_lines_are_not_dirty() {
        let layout = layout_prompt("hello", 2, 5, 0, 80);
        assert!(!layout.lines[0].is_dirty());
        assert_eq!(layout.cursor, LinePos { col: 2, row: 0 });
    }

    #[test]
    fn empty_buffer_is_a_single_line() {
        let layout = layout_prompt("", 0, 0, 7, 80);
        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.cursor, LinePos { col: 7, row: 0 });
    }
}
