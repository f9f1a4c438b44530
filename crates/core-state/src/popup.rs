//! Modal popups layered over the edit line.
//!
//! At most two popups coexist: a CommandNumber prompt opened from inside a
//! CommandList. The stack refuses anything deeper.

use thiserror::Error;

/// Digits accepted by the CommandNumber prompt.
pub const COMMAND_NUMBER_MAX_INPUT: usize = 5;
/// Deepest popup nesting.
pub const MAX_POPUP_DEPTH: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PopupError {
    #[error("popup stack is full (depth {0})")]
    TooDeep(usize),
    #[error("{0:?} popup requires a non-empty history")]
    EmptyHistory(PopupKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    CopyToChar,
    CopyFromChar,
    CommandNumber,
    CommandList,
}

/// Bounded digit field of the CommandNumber prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandNumber {
    digits: String,
}

impl CommandNumber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a digit. Returns `false` if `ch` is not a digit or the field is full.
    pub fn push_digit(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() || self.digits.len() >= COMMAND_NUMBER_MAX_INPUT {
            return false;
        }
        self.digits.push(ch);
        true
    }

    pub fn pop_digit(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Parsed value, `None` when empty.
    pub fn value(&self) -> Option<usize> {
        self.digits.parse().ok()
    }

    /// The field as drawn: digits padded with spaces to full width.
    pub fn field(&self) -> String {
        format!("{:<width$}", self.digits, width = COMMAND_NUMBER_MAX_INPUT)
    }
}

/// Scroll window and selection over the full history.
///
/// `selected` may go out of range after a movement; [`CommandList::clamp`]
/// brings it and the window back before every draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandList {
    /// First visible entry; `None` until the first draw centers the selection.
    pub top: Option<usize>,
    pub selected: isize,
    /// Visible rows, updated by every clamp for page movements.
    pub height: usize,
}

impl CommandList {
    pub const INITIAL_HEIGHT: usize = 10;

    pub fn new(selected: usize) -> Self {
        Self {
            top: None,
            selected: isize::try_from(selected).unwrap_or(isize::MAX),
            height: Self::INITIAL_HEIGHT,
        }
    }

    pub fn move_by(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add(delta);
    }

    pub fn page(&mut self, pages: isize) {
        let step = isize::try_from(self.height).unwrap_or(isize::MAX);
        self.move_by(step.saturating_mul(pages));
    }

    /// Selected index after clamping to `count` entries.
    pub fn selected_index(&self, count: usize) -> usize {
        usize::try_from(self.selected.max(0))
            .unwrap_or(0)
            .min(count.saturating_sub(1))
    }

    /// Fit height, selection and window for `count` entries on a viewport
    /// `viewport_height` rows tall. Returns `(top, height)`.
    pub fn clamp(&mut self, count: usize, viewport_height: usize, max_height: usize) -> (usize, usize) {
        let height = count.min((viewport_height / 2).clamp(1, max_height.max(1)));
        let selected = self.selected_index(count);
        self.selected = isize::try_from(selected).unwrap_or(0);

        let mut top = self.top.unwrap_or_else(|| selected.saturating_sub(height / 2));
        top = top.min(selected);
        top = top.max((selected + 1).saturating_sub(height));
        top = top.min(count - height.min(count));

        self.top = Some(top);
        self.height = height;
        (top, height)
    }

    /// Row of the scrollbar thumb, between the arrows at row 0 and `height - 1`.
    pub fn thumb_row(&self, count: usize, height: usize) -> usize {
        let history_max = count.saturating_sub(1);
        if history_max == 0 {
            return 0;
        }
        let track_max = height.saturating_sub(3);
        let selected = self.selected_index(count);
        1 + (track_max * selected + history_max / 2) / history_max
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    CopyToChar,
    CopyFromChar,
    CommandNumber(CommandNumber),
    CommandList(CommandList),
}

impl Popup {
    pub fn kind(&self) -> PopupKind {
        match self {
            Self::CopyToChar => PopupKind::CopyToChar,
            Self::CopyFromChar => PopupKind::CopyFromChar,
            Self::CommandNumber(_) => PopupKind::CommandNumber,
            Self::CommandList(_) => PopupKind::CommandList,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopupStack {
    stack: Vec<Popup>,
    dirty: bool,
}

impl PopupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, popup: Popup) -> Result<(), PopupError> {
        if self.stack.len() >= MAX_POPUP_DEPTH {
            return Err(PopupError::TooDeep(self.stack.len()));
        }
        tracing::debug!(target: "editor.popup", kind = ?popup.kind(), depth = self.stack.len() + 1, "push");
        self.stack.push(popup);
        self.dirty = true;
        Ok(())
    }

    /// Dismiss every popup at once.
    pub fn done(&mut self) {
        if !self.stack.is_empty() {
            tracing::debug!(target: "editor.popup", depth = self.stack.len(), "done");
        }
        self.stack.clear();
        self.dirty = true;
    }

    pub fn top(&self) -> Option<&Popup> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Popup> {
        self.stack.last_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
