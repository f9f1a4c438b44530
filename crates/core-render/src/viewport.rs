//! Visible terminal window and pager arithmetic.
//!
//! The prompt occupies `line_count` laid-out rows. When it does not fit, only a
//! window of `height` rows starting at the pager top is shown; the window
//! follows the cursor row.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    /// Degenerate sizes are raised to a single cell.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Rows of the pager for `line_count` laid-out lines.
    pub fn pager_height(&self, line_count: usize) -> usize {
        line_count.min(self.height)
    }

    /// Adjust `top` so `cursor_line` stays visible, then keep the window inside
    /// `[0, line_count)`.
    pub fn clamp_cursor_into_view(&self, top: usize, cursor_line: usize, line_count: usize) -> usize {
        let pager_height = self.pager_height(line_count);
        let top = top
            .min(cursor_line)
            .max((cursor_line + 1).saturating_sub(self.height));
        top.min(line_count.saturating_sub(pager_height))
    }
}
