// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Cursor arithmetic over a fixed width, wrapping viewport. Every character occupies
//! exactly one cell. Positions are 0-based, unlike the 1-based ANSI escape sequences.

/// A cell on the screen, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub row: u16,
    pub col: u16,
}

#[must_use]
pub fn pos(row: u16, col: u16) -> Position { Position { row, col } }

/// Size of the viewport in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub col_width: u16,
    pub row_height: u16,
}

impl Size {
    #[must_use]
    pub fn new(col_width: u16, row_height: u16) -> Self {
        Self {
            col_width: col_width.max(1),
            row_height: row_height.max(1),
        }
    }

    fn last_row(&self) -> u16 { self.row_height.saturating_sub(1) }
}

impl Default for Size {
    fn default() -> Self { Self::new(80, 24) }
}

/// Result of moving the cursor forward. When the movement runs past the bottom row the
/// terminal scrolls, and every position captured before the move is now
/// `scrolled_rows` rows higher on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub position: Position,
    pub scrolled_rows: u16,
}

/// Linear number of cells from `from` to `to`, ie: `width × Δrow + Δcol`. Negative when
/// `to` comes before `from`.
#[must_use]
pub fn cell_distance(from: Position, to: Position, col_width: u16) -> i64 {
    i64::from(col_width) * (i64::from(to.row) - i64::from(from.row))
        + (i64::from(to.col) - i64::from(from.col))
}

/// Where the cursor ends up after printing `cells` characters starting at `from`,
/// wrapping at the right margin.
#[must_use]
pub fn advance(from: Position, cells: usize, size: Size) -> Advance {
    let width = u64::from(size.col_width);
    let linear = u64::from(from.col) + cells as u64;
    let target_row = u64::from(from.row) + linear / width;
    let col = linear % width;
    clamp_to_viewport(target_row, col, size)
}

/// Where the cursor ends up after a `\r\n`.
#[must_use]
pub fn next_line(from: Position, size: Size) -> Advance {
    clamp_to_viewport(u64::from(from.row) + 1, 0, size)
}

fn clamp_to_viewport(target_row: u64, col: u64, size: Size) -> Advance {
    let last_row = u64::from(size.last_row());
    let scrolled_rows = target_row.saturating_sub(last_row);
    let row = target_row.min(last_row);
    Advance {
        position: Position {
            row: u16::try_from(row).unwrap_or(u16::MAX),
            col: u16::try_from(col).unwrap_or(u16::MAX),
        },
        scrolled_rows: u16::try_from(scrolled_rows).unwrap_or(u16::MAX),
    }
}

/// Move a previously captured position up by `rows`, to follow the content after the
/// screen scrolled. Content that scrolled off the top is pinned to row 0.
#[must_use]
pub fn shift_up(it: Position, rows: u16) -> Position {
    Position {
        row: it.row.saturating_sub(rows),
        col: it.col,
    }
}
