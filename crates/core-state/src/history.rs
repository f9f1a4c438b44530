//! Command history used by cooked reads.
//!
//! Navigation follows the classic console model: a `last_displayed` index
//! tracks the entry most recently recalled, and a *reset* flag set by `add`
//! makes the next "previous" recall return the newest entry itself instead of
//! stepping past it.

/// Direction for [`CommandHistory::retrieve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Previous,
    Next,
}

/// History collaborator consumed by the line editor.
pub trait CommandHistory {
    fn count(&self) -> usize;
    /// Index of the entry most recently shown.
    fn last_displayed(&self) -> usize;
    /// Entry at `last_displayed`, or `""` when empty.
    fn last_command(&self) -> &str;
    /// Entry at `index` (clamped), or `""` when empty.
    fn nth(&self, index: usize) -> &str;
    fn at_first_command(&self) -> bool;
    fn at_last_command(&self) -> bool;
    fn retrieve(&mut self, direction: SearchDirection) -> &str;
    /// Recall entry `index` (clamped) and make it the displayed one.
    fn retrieve_nth(&mut self, index: usize) -> &str;
    /// Search backward from `start` (exclusive, wrapping) for an entry that starts with `prefix`.
    fn find_matching(&mut self, prefix: &str, start: usize) -> Option<usize>;
    fn remove(&mut self, index: usize);
    fn swap(&mut self, a: usize, b: usize);
    fn add(&mut self, line: &str, suppress_duplicates: bool);
    fn clear(&mut self);
}

/// In-memory bounded history.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    commands: Vec<String>,
    capacity: usize,
    last_displayed: usize,
    reset: bool,
}

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MemoryHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::new(),
            capacity: capacity.max(1),
            last_displayed: 0,
            reset: false,
        }
    }

    /// Seed from an iterator, oldest first, as if each line had been added.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut h = Self::default();
        for line in lines {
            h.add(line.as_ref(), false);
        }
        h
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }

    fn prev_index(&self, index: usize) -> usize {
        if index == 0 {
            self.commands.len().saturating_sub(1)
        } else {
            index - 1
        }
    }

    fn next_index(&self, index: usize) -> usize {
        if index + 1 >= self.commands.len() {
            0
        } else {
            index + 1
        }
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.commands.len().saturating_sub(1))
    }
}

impl CommandHistory for MemoryHistory {
    fn count(&self) -> usize {
        self.commands.len()
    }

    fn last_displayed(&self) -> usize {
        self.last_displayed
    }

    fn last_command(&self) -> &str {
        self.commands
            .get(self.last_displayed)
            .map_or("", String::as_str)
    }

    fn nth(&self, index: usize) -> &str {
        self.commands
            .get(self.clamp_index(index))
            .map_or("", String::as_str)
    }

    fn at_first_command(&self) -> bool {
        !self.reset && self.last_displayed == 0
    }

    fn at_last_command(&self) -> bool {
        self.commands.is_empty() || self.last_displayed + 1 == self.commands.len()
    }

    fn retrieve(&mut self, direction: SearchDirection) -> &str {
        if self.commands.is_empty() {
            return "";
        }
        if self.reset {
            self.reset = false;
        } else {
            self.last_displayed = match direction {
                SearchDirection::Previous => self.prev_index(self.last_displayed),
                SearchDirection::Next => self.next_index(self.last_displayed),
            };
        }
        tracing::trace!(target: "history", ?direction, index = self.last_displayed, "retrieve");
        &self.commands[self.last_displayed]
    }

    fn retrieve_nth(&mut self, index: usize) -> &str {
        if self.commands.is_empty() {
            return "";
        }
        self.reset = false;
        self.last_displayed = self.clamp_index(index);
        &self.commands[self.last_displayed]
    }

    fn find_matching(&mut self, prefix: &str, start: usize) -> Option<usize> {
        if self.commands.is_empty() {
            return None;
        }
        let mut index = self.clamp_index(start);
        if self.reset {
            self.reset = false;
        } else {
            index = self.prev_index(index);
        }
        if prefix.is_empty() {
            return Some(index);
        }
        for _ in 0..self.commands.len() {
            if self.commands[index].starts_with(prefix) {
                return Some(index);
            }
            index = self.prev_index(index);
        }
        None
    }

    fn remove(&mut self, index: usize) {
        if index >= self.commands.len() {
            return;
        }
        self.commands.remove(index);
        if self.last_displayed > index || self.last_displayed >= self.commands.len() {
            self.last_displayed = self.last_displayed.saturating_sub(1);
        }
        tracing::debug!(target: "history", index, remaining = self.commands.len(), "removed entry");
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a < self.commands.len() && b < self.commands.len() {
            self.commands.swap(a, b);
        }
    }

    fn add(&mut self, line: &str, suppress_duplicates: bool) {
        if line.is_empty() {
            return;
        }
        if suppress_duplicates {
            self.commands.retain(|c| c != line);
        }
        if self.commands.last().map(String::as_str) != Some(line) {
            if self.commands.len() >= self.capacity {
                self.commands.remove(0);
            }
            self.commands.push(line.to_owned());
        }
        self.last_displayed = self.commands.len() - 1;
        self.reset = true;
        tracing::debug!(target: "history", len = line.len(), count = self.commands.len(), "added entry");
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.last_displayed = 0;
        self.reset = true;
        tracing::debug!(target: "history", "cleared");
    }
}
