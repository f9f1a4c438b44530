//! Candidate edit line with cursor and dirty watermark.
//!
//! Invariants:
//! - `cursor <= text.len()` and lands on a char boundary.
//! - `DirtyFrom(n)` always has `n <= text.len()`.
//! - Mutations only move the watermark down; only `mark_clean` resets it.
//! - While suspended every slice accessor returns `""`.

/// Lowest byte offset whose rendering may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyState {
    Clean,
    DirtyFrom(usize),
}

impl DirtyState {
    /// Combine with another dirty offset, keeping the lower bound.
    fn widen(self, offset: usize) -> Self {
        match self {
            Self::Clean => Self::DirtyFrom(offset),
            Self::DirtyFrom(n) => Self::DirtyFrom(n.min(offset)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BufferState {
    text: String,
    cursor: usize,
    dirty: DirtyState,
    suspended: bool,
}

impl Default for BufferState {
    fn default() -> Self {
        Self::new()
    }
}

fn floor_boundary(text: &str, mut offset: usize) -> usize {
    offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

impl BufferState {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            dirty: DirtyState::Clean,
            suspended: false,
        }
    }

    /// The live text, regardless of suspension. Editing logic uses this.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn dirty(&self) -> DirtyState {
        self.dirty
    }

    pub fn is_clean(&self) -> bool {
        self.dirty == DirtyState::Clean
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Replace `remove` bytes at `offset` with `insert`; the cursor ends up
    /// right after the inserted text. Out-of-range arguments are clamped.
    pub fn replace(&mut self, offset: usize, remove: usize, insert: &str) {
        let offset = floor_boundary(&self.text, offset);
        let end = floor_boundary(&self.text, offset.saturating_add(remove));
        self.text.replace_range(offset..end, insert);
        self.cursor = offset + insert.len();
        self.dirty = self.dirty.widen(offset);
    }

    /// Replace everything and put the cursor at the end.
    pub fn replace_all(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.cursor = self.text.len();
        self.dirty = DirtyState::DirtyFrom(0);
    }

    /// Move the cursor (clamped). Marks the state dirty without widening the
    /// text range, so a redraw only repositions the cursor.
    pub fn set_cursor(&mut self, offset: usize) {
        self.cursor = floor_boundary(&self.text, offset);
        self.dirty = self.dirty.widen(self.text.len());
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = DirtyState::DirtyFrom(0);
    }

    pub fn mark_clean(&mut self) {
        self.dirty = DirtyState::Clean;
    }

    pub fn suspend(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    /// Move the text out and reset to an empty, clean state.
    pub fn extract(&mut self) -> String {
        self.cursor = 0;
        self.dirty = DirtyState::Clean;
        self.suspended = false;
        std::mem::take(&mut self.text)
    }

    pub fn text_before_cursor(&self) -> &str {
        self.slice(0, self.cursor)
    }

    fn slice(&self, from: usize, to: usize) -> &str {
        if self.suspended {
            return "";
        }
        let to = to.min(self.text.len());
        let from = from.min(to);
        &self.text[from..to]
    }
}
