// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io, sync::{Arc, MutexGuard, PoisonError}};

use crate::{Position, SafeRawTerminal, SendRawTerminal, Size, StdMutex};

/// Where the viewport size and the cursor position come from.
///
/// A real terminal answers both through `crossterm`. A mock device has no terminal to
/// ask, so it is given a fixed size and a starting cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalQuery {
    Crossterm,
    Fixed { size: Size, cursor: Position },
}

impl TerminalQuery {
    /// # Errors
    ///
    /// Returns an error if the terminal does not report its size.
    pub fn size(&self) -> io::Result<Size> {
        match self {
            TerminalQuery::Crossterm => {
                let (columns, rows) = crossterm::terminal::size()?;
                Ok(Size::new(columns, rows))
            }
            TerminalQuery::Fixed { size, .. } => Ok(*size),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the terminal does not answer the cursor position query. This
    /// needs raw mode to be enabled.
    pub fn cursor_position(&self) -> io::Result<Position> {
        match self {
            TerminalQuery::Crossterm => {
                let (col, row) = crossterm::cursor::position()?;
                Ok(Position { row, col })
            }
            TerminalQuery::Fixed { cursor, .. } => Ok(*cursor),
        }
    }

    /// Whether [`Self::cursor_position`] reflects what is on screen right now, as
    /// opposed to a value fixed at construction time.
    #[must_use]
    pub fn is_live(&self) -> bool { matches!(self, TerminalQuery::Crossterm) }
}

/// This struct represents an output device that can be used to write to the terminal.
/// - It is safe to clone.
/// - To write to it, see the example in [`Self::lock()`].
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct OutputDevice {
    pub resource: SafeRawTerminal,
    pub query: TerminalQuery,
    pub is_mock: bool,
}

impl OutputDevice {
    #[must_use]
    pub fn new_stdout() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stdout())),
            query: TerminalQuery::Crossterm,
            is_mock: false,
        }
    }

    /// A device for tests: output goes to `resource`, the viewport is `size`, and the
    /// cursor starts at the top left.
    pub fn new_mock(resource: impl std::io::Write + Send + 'static, size: Size) -> Self {
        Self::new_mock_at(resource, size, Position::default())
    }

    /// Same as [`Self::new_mock`], with the cursor starting at `cursor`.
    pub fn new_mock_at(
        resource: impl std::io::Write + Send + 'static,
        size: Size,
        cursor: Position,
    ) -> Self {
        Self {
            resource: Arc::new(StdMutex::new(resource)),
            query: TerminalQuery::Fixed { size, cursor },
            is_mock: true,
        }
    }
}

impl OutputDevice {
    /// Locks the output device for writing. To use it, use the following code:
    ///
    /// ```
    /// use ttyline::OutputDevice;
    ///
    /// let device = OutputDevice::new_stdout();
    /// { // Don't lock again in this scope, it would deadlock.
    ///     let _ = device.lock().write_all(b"Hello, world!\n");
    /// }
    /// ```
    ///
    /// A poisoned lock is recovered, so this never panics.
    pub fn lock(&self) -> MutexGuard<'_, SendRawTerminal> {
        self.resource.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
