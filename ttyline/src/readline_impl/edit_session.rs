// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{EditBuffer, Position, ReadMode, Size, advance};

/// One in-progress read, from the first render of its prompt until it ends.
///
/// It is parked in [`super::TerminalState`] while the read is in flight, so that a
/// concurrent write can move it out of the way and redraw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub buffer: EditBuffer,
    pub prompt: String,
    pub intercept: bool,
    pub mode: ReadMode,
    /// Anchor the whole line is redrawn from.
    pub start_position: Position,
    /// Extent reached by the previous render. Cells between a shorter new render and
    /// this position are blanked.
    pub last_rendered_end: Position,
}

impl EditSession {
    #[must_use]
    pub fn new(
        buffer: EditBuffer,
        prompt: impl Into<String>,
        intercept: bool,
        mode: ReadMode,
        start_position: Position,
        viewport: Size,
    ) -> Self {
        let prompt = prompt.into();
        let last_rendered_end =
            advance(start_position, prompt.chars().count(), viewport).position;
        Self {
            buffer,
            prompt,
            intercept,
            mode,
            start_position,
            last_rendered_end,
        }
    }
}

/// Cursor and viewport as last known after any terminal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderState {
    pub cursor: Position,
    pub viewport: Size,
}
