// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! All the bytes that reach the terminal are produced here. Every routine works on a
//! `&mut dyn Write` that the caller has already locked, and keeps the cursor arithmetic
//! in step with what a wrapping, scrolling terminal does with those bytes.

use std::io::{self, Write};

use crossterm::{
    QueueableCommand,
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    style::Print,
};

use super::{
    EditSession, Position, RenderState, Size, advance, cell_distance, next_line, shift_up,
};

/// Emits text and follows the cursor as it goes.
///
/// A run of characters that fills a row exactly leaves a real terminal in its "pending
/// wrap" state: the cursor sits on the last column until the next character arrives. The
/// arithmetic already places it on the next row, so the tracker remembers that the
/// terminal is one step behind. A following character or `\n` catches the terminal up
/// on its own. [`Self::settle`] does it explicitly with a `\r\n`.
#[derive(Debug)]
pub struct CursorTracker {
    position: Position,
    size: Size,
    scrolled_rows: u16,
    pending_wrap: bool,
}

impl CursorTracker {
    #[must_use]
    pub fn new(position: Position, size: Size) -> Self {
        Self {
            position,
            size,
            scrolled_rows: 0,
            pending_wrap: false,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position { self.position }

    /// Rows scrolled since this tracker was created.
    #[must_use]
    pub fn scrolled_rows(&self) -> u16 { self.scrolled_rows }

    /// # Errors
    ///
    /// Returns an error if the output can't be written to.
    pub fn move_to(&mut self, out: &mut dyn Write, to: Position) -> io::Result<()> {
        out.queue(MoveTo(to.col, to.row))?;
        self.position = to;
        self.pending_wrap = false;
        Ok(())
    }

    /// Print characters that are known to be printable.
    ///
    /// # Errors
    ///
    /// Returns an error if the output can't be written to.
    pub fn print_chars(&mut self, out: &mut dyn Write, chars: &[char]) -> io::Result<()> {
        if chars.is_empty() {
            return Ok(());
        }
        let text: String = chars.iter().collect();
        out.queue(Print(text))?;
        let moved = advance(self.position, chars.len(), self.size);
        self.position = moved.position;
        self.scrolled_rows = self.scrolled_rows.saturating_add(moved.scrolled_rows);
        self.pending_wrap = moved.position.col == 0;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the output can't be written to.
    pub fn print_blanks(&mut self, out: &mut dyn Write, count: usize) -> io::Result<()> {
        self.print_chars(out, &vec![' '; count])
    }

    /// Print arbitrary text. `\n` starts a new row (emitted as `\r\n` since raw mode does
    /// not translate it), a lone `\r` returns to the first column, and other control
    /// characters are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the output can't be written to.
    pub fn print_text(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        self.print_text_with(out, text, |_, _| Ok(()))
    }

    /// Same as [`Self::print_text`], calling `before_newline` at the end of every row
    /// that is terminated by a `\n`.
    fn print_text_with(
        &mut self,
        out: &mut dyn Write,
        text: &str,
        mut before_newline: impl FnMut(&mut Self, &mut dyn Write) -> io::Result<()>,
    ) -> io::Result<()> {
        let mut run: Vec<char> = vec![];
        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.print_chars(out, &run)?;
                    run.clear();
                    before_newline(self, out)?;
                    self.newline(out)?;
                }
                '\r' => {
                    self.print_chars(out, &run)?;
                    run.clear();
                    self.carriage_return(out)?;
                }
                it if it.is_control() => {}
                it => run.push(it),
            }
        }
        self.print_chars(out, &run)
    }

    fn newline(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.queue(Print("\r\n"))?;
        if self.pending_wrap {
            // The arithmetic is already on the new row.
            self.pending_wrap = false;
            return Ok(());
        }
        let moved = next_line(self.position, self.size);
        self.position = moved.position;
        self.scrolled_rows = self.scrolled_rows.saturating_add(moved.scrolled_rows);
        Ok(())
    }

    fn carriage_return(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.pending_wrap {
            return self.settle(out);
        }
        out.queue(Print("\r"))?;
        self.position.col = 0;
        Ok(())
    }

    /// Bring the terminal in line with the arithmetic when a row was filled exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the output can't be written to.
    pub fn settle(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.pending_wrap {
            out.queue(Print("\r\n"))?;
            self.pending_wrap = false;
        }
        Ok(())
    }
}

/// Redraw the session from its anchor and leave the cursor at the visual edit point.
///
/// 1. Hide the cursor, move to the anchor, print the prompt.
/// 2. Print the text before the edit point (omitted when intercepted) and remember the
///    visual cursor.
/// 3. Print the text after the edit point (omitted when intercepted).
/// 4. Blank every cell between the new end and the previous end, if the line shrank.
/// 5. Shift the captured positions up by the rows that scrolled along the way.
/// 6. Set the cursor shape from the edit mode, move to the visual cursor, show it.
///
/// # Errors
///
/// Returns an error if the output can't be written to.
pub fn render_session(
    out: &mut dyn Write,
    session: &mut EditSession,
    render_state: &mut RenderState,
) -> io::Result<()> {
    let size = render_state.viewport;
    let mut tracker = CursorTracker::new(session.start_position, size);

    out.queue(Hide)?;
    tracker.move_to(out, session.start_position)?;
    tracker.print_text(out, &session.prompt)?;
    if !session.intercept {
        tracker.print_chars(out, session.buffer.before_cursor())?;
    }
    tracker.settle(out)?;
    let visual_cursor = tracker.position();
    let scrolled_before_visual = tracker.scrolled_rows();

    if !session.intercept {
        tracker.print_chars(out, session.buffer.after_cursor())?;
    }
    tracker.settle(out)?;
    let new_end = tracker.position();
    let scrolled_before_end = tracker.scrolled_rows();

    let previous_end = shift_up(session.last_rendered_end, scrolled_before_end);
    let shortfall = cell_distance(new_end, previous_end, size.col_width);
    if shortfall > 0 {
        tracker.print_blanks(out, usize::try_from(shortfall).unwrap_or_default())?;
        tracker.settle(out)?;
    }

    let scrolled = tracker.scrolled_rows();
    session.start_position = shift_up(session.start_position, scrolled);
    session.last_rendered_end = shift_up(new_end, scrolled - scrolled_before_end);
    let visual_cursor = shift_up(visual_cursor, scrolled - scrolled_before_visual);

    out.queue(if session.buffer.is_overwrite() {
        SetCursorStyle::BlinkingBlock
    } else {
        SetCursorStyle::BlinkingBar
    })?;
    tracker.move_to(out, visual_cursor)?;
    out.queue(Show)?;
    out.flush()?;

    render_state.cursor = visual_cursor;
    Ok(())
}

/// Write `text` over a session that is being rendered, then redraw the session below it.
///
/// The text is printed from the session anchor. Cells of the old rendering that the text
/// does not cover are blanked, the anchor moves to where the text ends, and the session
/// is rendered again from there.
///
/// # Errors
///
/// Returns an error if the output can't be written to.
pub fn write_over_session(
    out: &mut dyn Write,
    session: &mut EditSession,
    render_state: &mut RenderState,
    text: &str,
) -> io::Result<()> {
    let size = render_state.viewport;
    let stale_end = session.last_rendered_end;
    let mut tracker = CursorTracker::new(session.start_position, size);

    out.queue(Hide)?;
    tracker.move_to(out, session.start_position)?;
    tracker.print_text_with(out, text, |tracker, out| {
        let stale_end = shift_up(stale_end, tracker.scrolled_rows());
        let here = tracker.position();
        let blanks = if here.row < stale_end.row {
            i64::from(size.col_width) - i64::from(here.col)
        } else if here.row == stale_end.row {
            i64::from(stale_end.col) - i64::from(here.col)
        } else {
            0
        };
        if blanks > 0 {
            tracker.print_blanks(out, usize::try_from(blanks).unwrap_or_default())?;
        }
        Ok(())
    })?;

    let text_end = tracker.position();
    let scrolled_before_pad = tracker.scrolled_rows();
    let shortfall = cell_distance(
        text_end,
        shift_up(stale_end, scrolled_before_pad),
        size.col_width,
    );
    if shortfall > 0 {
        tracker.print_blanks(out, usize::try_from(shortfall).unwrap_or_default())?;
        tracker.settle(out)?;
        let text_end = shift_up(text_end, tracker.scrolled_rows() - scrolled_before_pad);
        tracker.move_to(out, text_end)?;
    } else {
        tracker.settle(out)?;
    }

    // Everything up to the old extent is blank now.
    session.start_position = tracker.position();
    session.last_rendered_end = tracker.position();
    render_session(out, session, render_state)
}

/// Write `text` at the tracked cursor when no session is active.
///
/// # Errors
///
/// Returns an error if the output can't be written to.
pub fn write_plain(
    out: &mut dyn Write,
    render_state: &mut RenderState,
    text: &str,
) -> io::Result<()> {
    let mut tracker = CursorTracker::new(render_state.cursor, render_state.viewport);
    tracker.print_text(out, text)?;
    tracker.settle(out)?;
    out.flush()?;
    render_state.cursor = tracker.position();
    Ok(())
}

/// Leave the session: restore the cursor shape, move past the rendered line and start a
/// fresh row.
///
/// # Errors
///
/// Returns an error if the output can't be written to.
pub fn finish_session(
    out: &mut dyn Write,
    session: &EditSession,
    render_state: &mut RenderState,
) -> io::Result<()> {
    let mut tracker = CursorTracker::new(session.last_rendered_end, render_state.viewport);
    out.queue(SetCursorStyle::DefaultUserShape)?;
    tracker.move_to(out, session.last_rendered_end)?;
    tracker.print_text(out, "\n")?;
    out.queue(Show)?;
    out.flush()?;
    render_state.cursor = tracker.position();
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ttyline_test_fixtures::VirtualScreen;

    use super::*;
    use crate::{EditBuffer, ReadMode, pos};

    fn session_at(start: Position, prompt: &str, text: &str, size: Size) -> EditSession {
        let mut buffer = EditBuffer::new(256);
        buffer.replace(text);
        let mut it = EditSession::new(buffer, prompt, false, ReadMode::line(), start, size);
        it.last_rendered_end = start;
        it
    }

    fn render_state(cursor: Position, size: Size) -> RenderState {
        RenderState {
            cursor,
            viewport: size,
        }
    }

    /// The `count` cells that follow `from` in reading order, wrapping at `width`.
    fn cells_from(screen: &VirtualScreen, from: Position, count: i64, width: u16) -> Vec<char> {
        let start = i64::from(from.row) * i64::from(width) + i64::from(from.col);
        (start..start + count)
            .map(|linear| {
                let row = u16::try_from(linear / i64::from(width)).unwrap();
                let col = u16::try_from(linear % i64::from(width)).unwrap();
                screen.cell(row, col)
            })
            .collect()
    }

    #[test]
    fn test_tracker_wraps_and_scrolls() {
        let size = Size::new(5, 2);
        let mut screen = VirtualScreen::new(5, 2);
        screen.set_cursor(1, 3);
        let mut tracker = CursorTracker::new(pos(1, 3), size);
        tracker.print_text(&mut screen, "abcd").unwrap();
        tracker.settle(&mut screen).unwrap();
        assert_eq!(tracker.position(), pos(1, 2));
        assert_eq!(tracker.scrolled_rows(), 1);
        assert_eq!(screen.cursor(), (1, 2));
        assert_eq!(screen.row_text(0), "   ab");
        assert_eq!(screen.row_text(1), "cd");
    }

    #[test]
    fn test_tracker_exact_row_then_newline_does_not_skip_a_row() {
        let size = Size::new(4, 5);
        let mut screen = VirtualScreen::new(4, 5);
        let mut tracker = CursorTracker::new(pos(0, 0), size);
        tracker.print_text(&mut screen, "abcd\nef").unwrap();
        tracker.settle(&mut screen).unwrap();
        assert_eq!(tracker.position(), pos(1, 2));
        assert_eq!(screen.cursor(), (1, 2));
        assert_eq!(screen.row_text(1), "ef");
    }

    #[test]
    fn test_tracker_drops_control_characters() {
        let size = Size::new(10, 2);
        let mut screen = VirtualScreen::new(10, 2);
        let mut tracker = CursorTracker::new(pos(0, 0), size);
        tracker.print_text(&mut screen, "a\x07b\tc\rZ").unwrap();
        assert_eq!(tracker.position(), pos(0, 1));
        assert_eq!(screen.row_text(0), "Zbc");
    }

    #[test]
    fn test_render_places_visual_cursor() {
        let size = Size::new(20, 5);
        let mut screen = VirtualScreen::new(20, 5);
        let mut session = session_at(pos(2, 0), "> ", "hello", size);
        session.buffer.move_cursor(-2);
        let mut state = render_state(pos(2, 0), size);

        render_session(&mut screen, &mut session, &mut state).unwrap();

        assert_eq!(screen.row_text(2), "> hello");
        assert_eq!(screen.cursor(), (2, 5));
        assert_eq!(state.cursor, pos(2, 5));
        assert_eq!(session.last_rendered_end, pos(2, 7));
        assert!(screen.is_cursor_visible());
    }

    #[test]
    fn test_render_blanks_shrunk_tail() {
        let size = Size::new(20, 5);
        let mut screen = VirtualScreen::new(20, 5);
        let mut session = session_at(pos(0, 0), "> ", "hello world", size);
        let mut state = render_state(pos(0, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();
        assert_eq!(screen.row_text(0), "> hello world");

        session.buffer.replace("hi");
        render_session(&mut screen, &mut session, &mut state).unwrap();
        assert_eq!(screen.row_text(0), "> hi");
        assert_eq!(screen.cursor(), (0, 4));
        assert_eq!(session.last_rendered_end, pos(0, 4));
    }

    #[test]
    fn test_render_intercepted_hides_text() {
        let size = Size::new(20, 5);
        let mut screen = VirtualScreen::new(20, 5);
        let mut session = session_at(pos(0, 0), "pw: ", "secret", size);
        session.intercept = true;
        let mut state = render_state(pos(0, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();
        assert_eq!(screen.row_text(0), "pw:");
        assert_eq!(screen.cursor(), (0, 4));
    }

    #[test]
    fn test_render_scroll_shifts_anchor() {
        let size = Size::new(5, 3);
        let mut screen = VirtualScreen::new(5, 3);
        let mut session = session_at(pos(2, 0), "> ", "abcdef", size);
        let mut state = render_state(pos(2, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();

        assert_eq!(session.start_position, pos(1, 0));
        assert_eq!(session.last_rendered_end, pos(2, 3));
        assert_eq!(screen.row_text(1), "> abc");
        assert_eq!(screen.row_text(2), "def");
        assert_eq!(screen.cursor(), (2, 3));
    }

    #[test]
    fn test_write_over_session_moves_line_down() {
        let size = Size::new(20, 5);
        let mut screen = VirtualScreen::new(20, 5);
        let mut session = session_at(pos(0, 0), "> ", "abcdefgh", size);
        let mut state = render_state(pos(0, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();

        write_over_session(&mut screen, &mut session, &mut state, "X\n").unwrap();

        assert_eq!(screen.row_text(0), "X");
        assert_eq!(screen.row_text(1), "> abcdefgh");
        assert_eq!(session.start_position, pos(1, 0));
        assert_eq!(screen.cursor(), (1, 10));
    }

    #[test]
    fn test_write_without_newline_continues_on_same_row() {
        let size = Size::new(20, 5);
        let mut screen = VirtualScreen::new(20, 5);
        let mut session = session_at(pos(0, 0), "> ", "abcdefgh", size);
        let mut state = render_state(pos(0, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();

        write_over_session(&mut screen, &mut session, &mut state, "ab").unwrap();

        assert_eq!(screen.row_text(0), "ab> abcdefgh");
        assert_eq!(session.start_position, pos(0, 2));
    }

    #[test]
    fn test_write_plain_then_finish() {
        let size = Size::new(20, 5);
        let mut screen = VirtualScreen::new(20, 5);
        let mut state = render_state(pos(0, 0), size);
        write_plain(&mut screen, &mut state, "hello\nworld").unwrap();
        assert_eq!(state.cursor, pos(1, 5));
        assert_eq!(screen.row_text(0), "hello");
        assert_eq!(screen.row_text(1), "world");

        let mut session = session_at(pos(1, 5), "?", "", size);
        render_session(&mut screen, &mut session, &mut state).unwrap();
        finish_session(&mut screen, &session, &mut state).unwrap();
        assert_eq!(state.cursor, pos(2, 0));
        assert_eq!(screen.cursor(), (2, 0));
        assert_eq!(screen.row_text(1), "world?");
    }

    #[test]
    fn test_render_shrink_from_three_rows_to_one_blanks_every_stale_cell() {
        let size = Size::new(7, 6);
        let mut screen = VirtualScreen::new(7, 6);
        let mut session = session_at(pos(0, 0), "> ", "abcdefghijklmnopq", size);
        let mut state = render_state(pos(0, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();
        assert_eq!(screen.rows()[..3].to_vec(), vec!["> abcde", "fghijkl", "mnopq"]);
        let previous_end = session.last_rendered_end;
        assert_eq!(previous_end, pos(2, 5));

        session.buffer.replace("xy");
        render_session(&mut screen, &mut session, &mut state).unwrap();

        let new_end = session.last_rendered_end;
        assert_eq!(new_end, pos(0, 4));
        let blanked = cell_distance(new_end, previous_end, size.col_width);
        assert_eq!(blanked, 15);
        let stale = cells_from(&screen, new_end, blanked, size.col_width);
        assert_eq!(stale, vec![' '; 15]);
        assert_eq!(screen.rows()[..3].to_vec(), vec!["> xy", "", ""]);
        assert_eq!(screen.cursor(), (0, 4));
        assert_eq!(state.cursor, pos(0, 4));
    }

    #[test]
    fn test_render_shrink_after_scrolling_from_bottom_row() {
        let size = Size::new(7, 3);
        let mut screen = VirtualScreen::new(7, 3);
        let mut session = session_at(pos(2, 0), "> ", "abcdefghijklmnopq", size);
        let mut state = render_state(pos(2, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();

        assert_eq!(screen.scroll_count(), 2);
        assert_eq!(session.start_position, pos(0, 0));
        assert_eq!(session.last_rendered_end, pos(2, 5));
        assert_eq!(screen.rows(), vec!["> abcde", "fghijkl", "mnopq"]);
        assert_eq!(screen.cursor(), (2, 5));

        let previous_end = session.last_rendered_end;
        session.buffer.replace("xy");
        render_session(&mut screen, &mut session, &mut state).unwrap();

        let new_end = session.last_rendered_end;
        let blanked = cell_distance(new_end, previous_end, size.col_width);
        assert_eq!(blanked, 15);
        assert_eq!(
            cells_from(&screen, new_end, blanked, size.col_width),
            vec![' '; 15]
        );
        assert_eq!(screen.rows(), vec!["> xy", "", ""]);
        assert_eq!(screen.scroll_count(), 2);
        assert_eq!(screen.cursor(), (0, 4));
    }

    #[test]
    fn test_write_line_over_two_row_input_blanks_stale_rows() {
        let size = Size::new(7, 6);
        let mut screen = VirtualScreen::new(7, 6);
        let mut session = session_at(pos(0, 0), "> ", "abcdefgh", size);
        let mut state = render_state(pos(0, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();
        assert_eq!(screen.rows()[..2].to_vec(), vec!["> abcde", "fgh"]);
        assert_eq!(session.last_rendered_end, pos(1, 3));

        write_over_session(&mut screen, &mut session, &mut state, "XY\n").unwrap();

        assert_eq!(cells_from(&screen, pos(0, 2), 5, size.col_width), vec![' '; 5]);
        assert_eq!(screen.rows()[..4].to_vec(), vec!["XY", "> abcde", "fgh", ""]);
        assert_eq!(session.start_position, pos(1, 0));
        assert_eq!(session.last_rendered_end, pos(2, 3));
        assert_eq!(screen.cursor(), (2, 3));
        assert_eq!(screen.scroll_count(), 0);
    }

    #[test]
    fn test_write_line_over_two_row_input_on_bottom_row_scrolls() {
        let size = Size::new(7, 3);
        let mut screen = VirtualScreen::new(7, 3);
        let mut session = session_at(pos(2, 0), "> ", "abcdefgh", size);
        let mut state = render_state(pos(2, 0), size);
        render_session(&mut screen, &mut session, &mut state).unwrap();
        assert_eq!(screen.scroll_count(), 1);
        assert_eq!(session.start_position, pos(1, 0));
        assert_eq!(screen.rows(), vec!["", "> abcde", "fgh"]);

        write_over_session(&mut screen, &mut session, &mut state, "XY\n").unwrap();

        assert_eq!(screen.scroll_count(), 2);
        assert_eq!(cells_from(&screen, pos(0, 2), 5, size.col_width), vec![' '; 5]);
        assert_eq!(screen.rows(), vec!["XY", "> abcde", "fgh"]);
        assert_eq!(session.start_position, pos(1, 0));
        assert_eq!(session.last_rendered_end, pos(2, 3));
        assert_eq!(screen.cursor(), (2, 3));
    }
}
