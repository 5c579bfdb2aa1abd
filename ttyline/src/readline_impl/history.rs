// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::EditBuffer;

/// Previously submitted lines, oldest first, and a navigation index into them.
///
/// `index == entries.len()` means "editing a fresh line". Entries are never removed or
/// deduplicated.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn entries(&self) -> &[String] { &self.entries }

    #[must_use]
    pub fn index(&self) -> usize { self.index }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Move through history by `offset` and load the result into `buffer`.
    ///
    /// - Going below the oldest entry pins the index at 0 and leaves `buffer` alone.
    /// - Landing on an entry replaces `buffer` with it, cursor at the end.
    /// - Landing at (or past) the end clears `buffer`, back to a fresh line.
    pub fn navigate(&mut self, offset: isize, buffer: &mut EditBuffer) {
        match self.index.checked_add_signed(offset) {
            None => self.index = 0,
            Some(index) if index < self.entries.len() => {
                self.index = index;
                buffer.replace(&self.entries[index]);
            }
            Some(_) => {
                self.index = self.entries.len();
                buffer.clear();
            }
        }
    }

    /// Append a submitted line. If the user was on a fresh line, they stay on a fresh
    /// line for the next read.
    pub fn commit(&mut self, line: impl Into<String>) {
        if self.index == self.entries.len() {
            self.index += 1;
        }
        self.entries.push(line.into());
    }
}
