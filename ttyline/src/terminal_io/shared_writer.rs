// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter},
          io::{self, Write}};

use crate::SafeTerminalState;

pub type Text = Vec<u8>;

/// Cloneable object that implements [`Write`] and prints to the terminal without
/// corrupting a read that is in flight on the associated [`crate::Readline`].
///
/// # Create a new instance by creating a `Readline` instance
///
/// A [`SharedWriter`] is returned by [`crate::Readline::new()`], and more can be had from
/// [`crate::Readline::shared_writer()`] or by cloning an existing one.
///
/// # Nothing is output without terminating with a newline, unless you call [`SharedWriter::flush()`]
///
/// Bytes given to [`Write::write()`] are buffered until the buffer ends with a line feed
/// (`'\n'`). Call [`SharedWriter::flush()`] to print a partial line. The inherent
/// [`SharedWriter::write_text()`] and [`SharedWriter::write_line()`] skip the buffer.
///
/// Each print is a single terminal operation: it waits its turn behind renders and other
/// writes (first come, first served) and then runs to completion.
pub struct SharedWriter {
    /// Holds the data to be written to the terminal.
    pub buffer: Text,

    safe_terminal_state: SafeTerminalState,
}

impl Debug for SharedWriter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedWriter")
            .field("buffer", &String::from_utf8_lossy(&self.buffer))
            .finish_non_exhaustive()
    }
}

impl SharedWriter {
    #[must_use]
    pub fn new(safe_terminal_state: SafeTerminalState) -> Self {
        Self {
            buffer: Text::default(),
            safe_terminal_state,
        }
    }

    /// Print `text` right away.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be written to.
    pub fn write_text(&self, text: &str) -> io::Result<()> {
        self.safe_terminal_state.lock().write(text)
    }

    /// Print `text` followed by a new line, right away.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be written to.
    pub fn write_line(&self, text: &str) -> io::Result<()> {
        self.write_text(&format!("{text}\n"))
    }

    fn print_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.write_text(&text)
    }
}

/// Custom [Clone] implementation for [`SharedWriter`]. This ensures that each new
/// instance gets its own buffer to write data into, while sharing the terminal.
impl Clone for SharedWriter {
    fn clone(&self) -> Self { Self::new(self.safe_terminal_state.clone()) }
}

impl Write for SharedWriter {
    fn write(&mut self, payload: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(payload);
        if self.buffer.ends_with(b"\n") {
            self.print_buffer()?;
        }
        Ok(payload.len())
    }

    fn flush(&mut self) -> io::Result<()> { self.print_buffer() }
}
