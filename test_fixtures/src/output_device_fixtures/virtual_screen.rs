// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! An in-memory terminal grid that understands the small subset of ANSI escape
//! sequences the line editor emits. Tests write to it through [`std::io::Write`] and then
//! assert on the visible cells and the cursor, instead of on raw escape sequences.
//!
//! Supported:
//! - `CSI row ; col H` (and `f`): move to an absolute 1-based position.
//! - `CSI col G`: move to an absolute 1-based column.
//! - `CSI ? 25 l` / `CSI ? 25 h`: hide / show the cursor.
//! - `CSI n SP q`: set the cursor style.
//! - `CSI 2 J` and `CSI K`: clear the screen / the rest of the line.
//! - `\r`, `\n`, `\x08`, and printable characters, with the "pending wrap" behavior of
//!   real terminals at the right margin, and scrolling at the bottom row.
//!
//! Everything else (colors, other modes) is parsed and ignored.

use std::{io::{Result, Write},
          sync::{Arc, Mutex, MutexGuard, PoisonError}};

/// Cloning shares the same screen, like [`super::StdoutMock`].
#[derive(Clone, Debug)]
pub struct VirtualScreen {
    pub state: Arc<Mutex<ScreenState>>,
}

#[derive(Debug)]
pub struct ScreenState {
    pub width: u16,
    pub height: u16,
    pub grid: Vec<Vec<char>>,
    pub cursor_row: u16,
    pub cursor_col: u16,
    pub pending_wrap: bool,
    pub cursor_visible: bool,
    pub cursor_style: Option<u16>,
    pub scroll_count: usize,
    parser: ParserState,
    utf8_pending: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParserState {
    Ground,
    Escape,
    Csi(String),
}

impl VirtualScreen {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let state = ScreenState {
            width,
            height,
            grid: vec![vec![' '; usize::from(width)]; usize::from(height)],
            cursor_row: 0,
            cursor_col: 0,
            pending_wrap: false,
            cursor_visible: true,
            cursor_style: None,
            scroll_count: 0,
            parser: ParserState::Ground,
            utf8_pending: vec![],
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place the cursor before anything is written, eg: to simulate a prompt that starts
    /// in the middle of the screen.
    pub fn set_cursor(&self, row: u16, col: u16) {
        let mut state = self.lock();
        state.cursor_row = row.min(state.height.saturating_sub(1));
        state.cursor_col = col.min(state.width.saturating_sub(1));
        state.pending_wrap = false;
    }

    /// `(row, col)`, 0-based.
    #[must_use]
    pub fn cursor(&self) -> (u16, u16) {
        let state = self.lock();
        (state.cursor_row, state.cursor_col)
    }

    #[must_use]
    pub fn is_cursor_visible(&self) -> bool { self.lock().cursor_visible }

    #[must_use]
    pub fn cursor_style(&self) -> Option<u16> { self.lock().cursor_style }

    #[must_use]
    pub fn scroll_count(&self) -> usize { self.lock().scroll_count }

    #[must_use]
    pub fn cell(&self, row: u16, col: u16) -> char {
        self.lock().grid[usize::from(row)][usize::from(col)]
    }

    /// The text of one row, with trailing blanks removed.
    #[must_use]
    pub fn row_text(&self, row: u16) -> String {
        let state = self.lock();
        let text: String = state.grid[usize::from(row)].iter().collect();
        text.trim_end().to_string()
    }

    /// All rows, with trailing blanks removed from each.
    #[must_use]
    pub fn rows(&self) -> Vec<String> {
        let height = self.lock().height;
        (0..height).map(|row| self.row_text(row)).collect()
    }

    /// All non-empty rows joined with `\n`. Handy for snapshot style assertions.
    #[must_use]
    pub fn visible_text(&self) -> String {
        let rows = self.rows();
        let last_non_empty = rows.iter().rposition(|it| !it.is_empty());
        match last_non_empty {
            Some(index) => rows[..=index].join("\n"),
            None => String::new(),
        }
    }
}

impl ScreenState {
    fn feed(&mut self, byte: u8) {
        match std::mem::replace(&mut self.parser, ParserState::Ground) {
            ParserState::Ground => self.feed_ground(byte),
            ParserState::Escape => {
                if byte == b'[' {
                    self.parser = ParserState::Csi(String::new());
                }
            }
            ParserState::Csi(mut params) => match byte {
                0x20..=0x3F => {
                    params.push(char::from(byte));
                    self.parser = ParserState::Csi(params);
                }
                0x40..=0x7E => self.dispatch_csi(&params, char::from(byte)),
                _ => {}
            },
        }
    }

    fn feed_ground(&mut self, byte: u8) {
        if byte == 0x1b {
            self.utf8_pending.clear();
            self.parser = ParserState::Escape;
            return;
        }

        if byte < 0x80 {
            self.utf8_pending.clear();
            self.put_char(char::from(byte));
            return;
        }

        self.utf8_pending.push(byte);
        match std::str::from_utf8(&self.utf8_pending) {
            Ok(text) => {
                let chars: Vec<char> = text.chars().collect();
                self.utf8_pending.clear();
                for ch in chars {
                    self.put_char(ch);
                }
            }
            Err(error) if error.error_len().is_some() => {
                self.utf8_pending.clear();
                self.put_char(char::REPLACEMENT_CHARACTER);
            }
            Err(_) => { /* Incomplete sequence, wait for more bytes. */ }
        }
    }

    fn dispatch_csi(&mut self, params: &str, final_byte: char) {
        let numbers = |params: &str| -> Vec<u16> {
            params
                .trim_start_matches('?')
                .trim_end()
                .split(';')
                .map(|it| it.trim().parse::<u16>().unwrap_or(0))
                .collect()
        };

        match final_byte {
            'H' | 'f' => {
                let args = numbers(params);
                let row = args.first().copied().unwrap_or(1).max(1) - 1;
                let col = args.get(1).copied().unwrap_or(1).max(1) - 1;
                self.cursor_row = row.min(self.height.saturating_sub(1));
                self.cursor_col = col.min(self.width.saturating_sub(1));
                self.pending_wrap = false;
            }
            'G' => {
                let col = numbers(params).first().copied().unwrap_or(1).max(1) - 1;
                self.cursor_col = col.min(self.width.saturating_sub(1));
                self.pending_wrap = false;
            }
            'h' | 'l' if params == "?25" => self.cursor_visible = final_byte == 'h',
            'q' if params.ends_with(' ') => {
                self.cursor_style = numbers(params).first().copied();
            }
            'J' if params == "2" => {
                for row in &mut self.grid {
                    row.fill(' ');
                }
            }
            'K' => {
                let col = usize::from(self.cursor_col);
                self.grid[usize::from(self.cursor_row)][col..].fill(' ');
            }
            _ => {}
        }
    }

    fn put_char(&mut self, ch: char) {
        match ch {
            '\r' => {
                self.cursor_col = 0;
                self.pending_wrap = false;
            }
            '\n' => {
                self.line_feed();
                self.pending_wrap = false;
            }
            '\x08' => {
                self.cursor_col = self.cursor_col.saturating_sub(1);
                self.pending_wrap = false;
            }
            it if it.is_control() => {}
            it => {
                if self.pending_wrap {
                    self.cursor_col = 0;
                    self.line_feed();
                    self.pending_wrap = false;
                }
                self.grid[usize::from(self.cursor_row)][usize::from(self.cursor_col)] = it;
                if self.cursor_col + 1 >= self.width {
                    self.pending_wrap = true;
                } else {
                    self.cursor_col += 1;
                }
            }
        }
    }

    fn line_feed(&mut self) {
        if self.cursor_row + 1 >= self.height {
            self.grid.remove(0);
            self.grid.push(vec![' '; usize::from(self.width)]);
            self.scroll_count += 1;
        } else {
            self.cursor_row += 1;
        }
    }
}

impl Write for VirtualScreen {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut state = self.lock();
        for byte in buf {
            state.feed(*byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}
