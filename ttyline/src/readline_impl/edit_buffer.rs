// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// The line being edited, and the edit cursor inside it.
///
/// Nothing here fails. Requests that make no sense (backspace at the start, delete at the
/// end, typing into a full buffer, moving past either end) are absorbed, and the state
/// either stays the same or clamps to the nearest valid value. This way a burst of fast
/// typing can never surface an error to the user.
///
/// Invariant after every operation: `0 <= cursor <= len <= limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
    overwrite: bool,
    limit: usize,
}

impl EditBuffer {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            chars: Vec::new(),
            cursor: 0,
            overwrite: false,
            limit,
        }
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize { self.chars.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.chars.is_empty() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn is_overwrite(&self) -> bool { self.overwrite }

    #[must_use]
    pub fn limit(&self) -> usize { self.limit }

    #[must_use]
    pub fn text(&self) -> String { self.chars.iter().collect() }

    /// Text to the left of the cursor.
    #[must_use]
    pub fn before_cursor(&self) -> &[char] { &self.chars[..self.cursor] }

    /// Text from the cursor to the end.
    #[must_use]
    pub fn after_cursor(&self) -> &[char] { &self.chars[self.cursor..] }

    /// Replace the character under the cursor when overwriting (and not at the end),
    /// otherwise insert. Dropped when the buffer is full.
    pub fn insert_or_overwrite(&mut self, ch: char) {
        if self.chars.len() >= self.limit {
            return;
        }
        if self.overwrite && self.cursor < self.chars.len() {
            self.chars[self.cursor] = ch;
        } else {
            self.chars.insert(self.cursor, ch);
        }
        self.move_cursor(1);
    }

    pub fn delete_backward(&mut self, to_line_start: bool) {
        if self.cursor == 0 {
            return;
        }
        if to_line_start {
            self.chars.drain(..self.cursor);
            self.set_cursor(0);
        } else {
            self.chars.remove(self.cursor - 1);
            self.move_cursor(-1);
        }
    }

    pub fn delete_forward(&mut self, to_line_end: bool) {
        if self.cursor >= self.chars.len() {
            return;
        }
        if to_line_end {
            self.chars.truncate(self.cursor);
        } else {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let target = self.cursor.saturating_add_signed(delta);
        self.set_cursor(target);
    }

    pub fn set_cursor(&mut self, index: usize) { self.cursor = index.min(self.chars.len()); }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    pub fn toggle_overwrite(&mut self) { self.overwrite = !self.overwrite; }

    /// Swap in a whole new line (eg: a history entry), truncated to the limit, with the
    /// cursor at its end.
    pub fn replace(&mut self, text: &str) {
        self.chars = text.chars().take(self.limit).collect();
        self.cursor = self.chars.len();
    }
}
