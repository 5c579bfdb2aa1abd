// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io, sync::Arc};

use crossterm::{event::KeyEvent,
                terminal::{disable_raw_mode, enable_raw_mode}};
use thiserror::Error;
use tokio::sync::Mutex;

use super::{DispatchOutcome, EditBuffer, EditSession, FairLock, History, ReadMode,
            RenderState, SafeTerminalState, TerminalState, dispatch_event};
use crate::{InputDevice, OutputDevice, ReadlineConfig, SharedWriter};

/// # Mental model and overview
///
/// This is a replacement for [`std::io::BufRead::read_line`] that lets other tasks and
/// threads keep printing to the terminal while the user is typing, without garbling the
/// line being edited.
///
/// Two locks make this work:
/// 1. The reader lock (a [`tokio::sync::Mutex`]) is held for a whole read, across every
///    `.await` on the next key. A second [`Self::read_line()`] waits for the first to
///    end. It guards the [`InputDevice`] and the [`History`].
/// 2. The terminal lock (a [`FairLock`]) is held for one terminal operation at a time:
///    starting a session, redrawing it after a key, ending it, or one write. Writers
///    only ever take this lock, and are served in the order they arrived.
///
/// The reader always takes the reader lock first and the terminal lock second.
///
/// # Writing while a read is in flight
///
/// The session being edited is parked in the [`TerminalState`]. A write moves to the
/// start of the session's line, prints its text over it, blanks what is left of the old
/// line, and then redraws the prompt and the input after the text. To the user the input
/// line simply moves down.
///
/// # Inputs and dependency injection
///
/// [`Self::new()`] takes an [`OutputDevice`] and an [`InputDevice`]. Real ones write to
/// stdout and read `crossterm` events. Tests pass a [`crate::OutputDevice::new_mock()`]
/// and a scripted stream of key events.
///
/// # When to terminate the session
///
/// There is no `close()` function. Drop the [`Readline`] and the terminal comes out of
/// raw mode.
pub struct Readline {
    pub safe_terminal_state: SafeTerminalState,
    reader: Mutex<ReaderState>,
    is_raw_mode: bool,
}

/// Only touched by the task that holds the reader lock.
#[allow(missing_debug_implementations)]
pub struct ReaderState {
    pub input_device: InputDevice,
    pub history: History,
    /// Insert / overwrite mode carries over from one read to the next.
    pub is_overwrite: bool,
}

impl std::fmt::Debug for Readline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Readline")
            .field("is_raw_mode", &self.is_raw_mode)
            .finish_non_exhaustive()
    }
}

/// Error returned from [`Readline`] and the typed readers built on it.
#[derive(Debug, Error)]
pub enum ReadlineError {
    /// An internal I/O error occurred.
    #[error(transparent)]
    IO(#[from] io::Error),

    /// The terminal could not report its size or the cursor position.
    #[error("terminal does not report its size or cursor position")]
    UnsupportedTerminal(#[source] io::Error),

    /// Input ended (Ctrl-D, or the input stream closed) before a value was read.
    #[error("input closed")]
    InputClosed,

    /// The user pressed Ctrl-C before a value was read.
    #[error("interrupted")]
    Interrupted,
}

/// Events emitted by [`Readline::read_line()`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ReadlineEvent {
    /// The user entered a line of text.
    Line(String),

    /// The user pressed Ctrl-D, or the input stream ended.
    Eof,

    /// The user pressed Ctrl-C.
    Interrupted,
}

/// Events emitted by [`Readline::read_key()`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum KeyReadEvent {
    Key(KeyEvent),
    Eof,
    Interrupted,
}

impl Readline {
    /// Create a new instance with an associated [`SharedWriter`].
    ///
    /// A real (non mock) output device puts the terminal in raw mode until the returned
    /// instance is dropped.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::UnsupportedTerminal`] if the size or the cursor position
    ///   can't be queried.
    /// - [`ReadlineError::IO`] if raw mode can't be enabled.
    pub fn new(
        config: ReadlineConfig,
        output_device: OutputDevice,
        input_device: InputDevice,
    ) -> Result<(Self, SharedWriter), ReadlineError> {
        let is_raw_mode = !output_device.is_mock;

        // Enable raw mode. Drop will disable raw mode.
        if is_raw_mode {
            enable_raw_mode()?;
        }

        let render_state = match query_render_state(&output_device) {
            Ok(it) => it,
            Err(error) => {
                if is_raw_mode {
                    _ = disable_raw_mode();
                }
                tracing::warn!(%error, "terminal queries failed");
                return Err(ReadlineError::UnsupportedTerminal(error));
            }
        };

        let terminal_state = TerminalState::new(output_device, render_state, config);
        let safe_terminal_state = Arc::new(FairLock::new(terminal_state));

        let readline = Readline {
            safe_terminal_state: safe_terminal_state.clone(),
            reader: Mutex::new(ReaderState {
                input_device,
                history: History::new(),
                is_overwrite: false,
            }),
            is_raw_mode,
        };

        let shared_writer = SharedWriter::new(safe_terminal_state);

        Ok((readline, shared_writer))
    }

    /// Another handle that writes to this terminal.
    #[must_use]
    pub fn shared_writer(&self) -> SharedWriter {
        SharedWriter::new(self.safe_terminal_state.clone())
    }

    /// A copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> ReadlineConfig { self.safe_terminal_state.lock().config.clone() }

    /// Change the configuration. Reads that already started keep their prompt and
    /// length limit.
    pub fn update_config(&self, update: impl FnOnce(&mut ReadlineConfig)) {
        update(&mut self.safe_terminal_state.lock().config);
    }

    /// Whether a read is in flight.
    #[must_use]
    pub fn is_reading(&self) -> bool { self.safe_terminal_state.lock().session.is_some() }

    /// Submitted lines, oldest first. Waits for a read in flight to end.
    pub async fn history(&self) -> Vec<String> {
        self.reader.lock().await.history.entries().to_vec()
    }

    /// Waits for a read in flight to end.
    pub async fn add_history_entry(&self, entry: impl Into<String>) {
        self.reader.lock().await.history.commit(entry);
    }
}

impl Readline {
    /// Read a line after the configured input prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read from or written to.
    pub async fn read_line(&self, intercept: bool) -> Result<ReadlineEvent, ReadlineError> {
        let prompt = self.config().input_prompt();
        self.read_line_with_prompt(&prompt, intercept).await
    }

    /// Read a line after `prompt`. With `intercept` the typed characters are not shown.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read from or written to.
    pub async fn read_line_with_prompt(
        &self,
        prompt: &str,
        intercept: bool,
    ) -> Result<ReadlineEvent, ReadlineError> {
        let (outcome, buffer) = self.run_session(prompt, intercept, ReadMode::line()).await?;
        Ok(match outcome {
            DispatchOutcome::Submit => ReadlineEvent::Line(buffer.text()),
            DispatchOutcome::Interrupted => ReadlineEvent::Interrupted,
            _ => ReadlineEvent::Eof,
        })
    }

    /// Wait for one key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read from or written to.
    pub async fn read_key(&self, intercept: bool) -> Result<KeyReadEvent, ReadlineError> {
        self.read_key_with_prompt("", intercept).await
    }

    /// Wait for one key press after `prompt`. Without `intercept` a printable key is
    /// echoed after the prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read from or written to.
    pub async fn read_key_with_prompt(
        &self,
        prompt: &str,
        intercept: bool,
    ) -> Result<KeyReadEvent, ReadlineError> {
        let (outcome, _) = self.run_session(prompt, intercept, ReadMode::Key).await?;
        Ok(match outcome {
            DispatchOutcome::KeyPressed(key_event) => KeyReadEvent::Key(key_event),
            DispatchOutcome::Interrupted => KeyReadEvent::Interrupted,
            _ => KeyReadEvent::Eof,
        })
    }

    /// Print `text`. Safe to call from any task at any time, including while a read is
    /// in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be written to.
    pub fn write(&self, text: &str) -> Result<(), ReadlineError> {
        tracing::trace!(len = text.len(), "write");
        self.safe_terminal_state.lock().write(text)?;
        Ok(())
    }

    /// Print `text` followed by a new line.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be written to.
    pub fn write_line(&self, text: &str) -> Result<(), ReadlineError> {
        self.write(&format!("{text}\n"))
    }

    /// Runs one session to completion. Returns how it ended and the final buffer.
    async fn run_session(
        &self,
        prompt: &str,
        intercept: bool,
        mode: ReadMode,
    ) -> Result<(DispatchOutcome, EditBuffer), ReadlineError> {
        let mut reader_guard = self.reader.lock().await;
        let reader = &mut *reader_guard;

        tracing::debug!(prompt, intercept, ?mode, "session start");

        // Ends the session on screen if this future is dropped mid read, or on error.
        let _session_guard = SessionGuard {
            safe_terminal_state: &self.safe_terminal_state,
        };

        {
            let mut terminal = self.safe_terminal_state.lock();
            terminal.refresh_viewport();
            terminal.refresh_cursor();
            let RenderState { cursor, viewport } = terminal.render_state;
            let buffer = EditBuffer::new(terminal.config.text_length_limit)
                .with_overwrite(reader.is_overwrite);
            let session = EditSession::new(buffer, prompt, intercept, mode, cursor, viewport);
            terminal.start_session(session)?;
        }

        let (outcome, finished) = loop {
            let Some(event) = reader.input_device.next().await else {
                let finished = self.safe_terminal_state.lock().finish_session()?;
                break (DispatchOutcome::Eof, finished);
            };
            let event = event?;

            let mut terminal = self.safe_terminal_state.lock();
            let Some(session) = terminal.session.as_mut() else {
                break (DispatchOutcome::Eof, None);
            };
            let outcome =
                dispatch_event(mode, &event, &mut session.buffer, &mut reader.history);
            reader.is_overwrite = session.buffer.is_overwrite();
            terminal.render()?;

            if outcome != DispatchOutcome::Continue {
                let finished = terminal.finish_session()?;
                break (outcome, finished);
            }
        };

        let buffer = finished
            .map(|it| it.buffer)
            .unwrap_or_else(|| EditBuffer::new(0));

        tracing::debug!(?outcome, len = buffer.len(), "session end");

        Ok((outcome, buffer))
    }
}

fn query_render_state(output_device: &OutputDevice) -> io::Result<RenderState> {
    Ok(RenderState {
        viewport: output_device.query.size()?,
        cursor: output_device.query.cursor_position()?,
    })
}

struct SessionGuard<'a> {
    safe_terminal_state: &'a FairLock<TerminalState>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) { self.safe_terminal_state.lock().abandon_session(); }
}

impl Drop for Readline {
    fn drop(&mut self) {
        if self.is_raw_mode {
            _ = disable_raw_mode();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use futures_util::StreamExt as _;
    use pretty_assertions::assert_eq;
    use ttyline_test_fixtures::{VirtualScreen, char_key, ctrl, gen_input_stream,
                                gen_pending_input_stream, key, typed, typed_line};

    use super::*;
    use crate::{CrosstermEventResult, PinnedInputStream, Size, pos};

    fn readline_on_screen(
        screen: &VirtualScreen,
        input: PinnedInputStream,
    ) -> (Readline, SharedWriter) {
        let size = {
            let state = screen.state.lock().unwrap();
            Size::new(state.width, state.height)
        };
        Readline::new(
            ReadlineConfig::default(),
            OutputDevice::new_mock(screen.clone(), size),
            InputDevice::new_from_stream(input),
        )
        .unwrap()
    }

    /// Yields `events` and then blocks forever, like a user who stopped typing.
    fn then_wait(events: Vec<CrosstermEventResult>) -> PinnedInputStream {
        Box::pin(gen_input_stream(events).chain(gen_pending_input_stream()))
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    #[tokio::test]
    async fn test_read_line_terminates_on_enter() {
        let screen = VirtualScreen::new(40, 5);
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(typed_line("hi")));

        let result = readline.read_line(false).await.unwrap();

        assert_eq!(result, ReadlineEvent::Line("hi".to_string()));
        assert_eq!(readline.history().await, vec!["hi".to_string()]);
        assert_eq!(screen.row_text(0), ">>> hi");
        assert_eq!(screen.cursor(), (1, 0));
        assert!(!readline.is_reading());
    }

    #[tokio::test]
    async fn test_read_line_ctrl_c_and_ctrl_d() {
        let screen = VirtualScreen::new(40, 5);
        let mut events = typed("ab");
        events.push(ctrl(KeyCode::Char('c')));
        events.push(ctrl(KeyCode::Char('d')));
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(events));

        assert_eq!(
            readline.read_line(false).await.unwrap(),
            ReadlineEvent::Interrupted
        );
        assert_eq!(readline.read_line(false).await.unwrap(), ReadlineEvent::Eof);
        // Input is exhausted.
        assert_eq!(readline.read_line(false).await.unwrap(), ReadlineEvent::Eof);
        assert!(readline.history().await.is_empty());
        assert_eq!(screen.rows()[..3].to_vec(), vec![">>> ab", ">>>", ">>>"]);
    }

    #[tokio::test]
    async fn test_read_line_io_error_ends_session() {
        let screen = VirtualScreen::new(40, 5);
        let events: Vec<CrosstermEventResult> = vec![
            char_key('a'),
            Err(io::Error::other("device gone")),
        ];
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(events));

        let result = readline.read_line(false).await;

        assert!(matches!(result, Err(ReadlineError::IO(_))));
        assert!(!readline.is_reading());
        assert_eq!(screen.cursor(), (1, 0));
    }

    #[tokio::test]
    async fn test_history_recall_across_reads() {
        let screen = VirtualScreen::new(40, 5);
        let mut events = typed_line("one");
        events.push(key(KeyCode::Up));
        events.push(key(KeyCode::Enter));
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(events));

        assert_eq!(
            readline.read_line(false).await.unwrap(),
            ReadlineEvent::Line("one".to_string())
        );
        assert_eq!(
            readline.read_line(false).await.unwrap(),
            ReadlineEvent::Line("one".to_string())
        );
        assert_eq!(readline.history().await, ["one", "one"]);
    }

    #[tokio::test]
    async fn test_overwrite_mode_carries_over() {
        let screen = VirtualScreen::new(40, 5);
        let mut events = vec![key(KeyCode::Insert)];
        events.extend(typed_line("abc"));
        events.push(char_key('x'));
        events.push(key(KeyCode::Enter));
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(events));

        readline.read_line(false).await.unwrap();
        assert_eq!(screen.cursor_style(), Some(0));

        readline.read_line(false).await.unwrap();
        assert!(readline.reader.lock().await.is_overwrite);
    }

    #[tokio::test]
    async fn test_intercepted_read_hides_input() {
        let screen = VirtualScreen::new(40, 5);
        let (readline, _) =
            readline_on_screen(&screen, gen_input_stream(typed_line("secret")));

        let result = readline.read_line_with_prompt("password: ", true).await.unwrap();

        assert_eq!(result, ReadlineEvent::Line("secret".to_string()));
        assert_eq!(screen.row_text(0), "password:");
    }

    #[tokio::test]
    async fn test_read_key_echoes_unless_intercepted() {
        let screen = VirtualScreen::new(40, 5);
        let events = vec![char_key('y'), char_key('n'), key(KeyCode::F(1))];
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(events));

        let first = readline.read_key_with_prompt("ok? ", false).await.unwrap();
        let second = readline.read_key_with_prompt("ok? ", true).await.unwrap();
        let third = readline.read_key(false).await.unwrap();

        assert_eq!(
            first,
            KeyReadEvent::Key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE))
        );
        assert_eq!(
            second,
            KeyReadEvent::Key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE))
        );
        assert_eq!(
            third,
            KeyReadEvent::Key(KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE))
        );
        assert_eq!(screen.rows()[..3].to_vec(), vec!["ok? y", "ok?", ""]);
        // Key reads never touch history.
        assert!(readline.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_while_reading_moves_line_down() {
        let screen = VirtualScreen::new(40, 5);
        let mut events = typed("ab");
        events.push(key(KeyCode::Left));
        let (readline, _) = readline_on_screen(&screen, then_wait(events));
        let readline = Arc::new(readline);

        let reader_task = tokio::spawn({
            let readline = readline.clone();
            async move { readline.read_line_with_prompt("> ", false).await }
        });

        wait_until(|| screen.row_text(0) == "> ab" && screen.cursor() == (0, 3)).await;

        readline.write_line("X").unwrap();

        assert_eq!(screen.row_text(0), "X");
        assert_eq!(screen.row_text(1), "> ab");
        assert_eq!(screen.cursor(), (1, 3));
        assert!(readline.is_reading());
        {
            let terminal = readline.safe_terminal_state.lock();
            let session = terminal.session.as_ref().unwrap();
            assert_eq!(session.start_position, pos(1, 0));
            assert_eq!(session.buffer.cursor(), 1);
        }

        // Cancelling the read finishes the line.
        reader_task.abort();
        assert!(reader_task.await.is_err());
        assert!(!readline.is_reading());

        readline.write_line("after").unwrap();
        assert_eq!(screen.visible_text(), "X\n> ab\nafter");
    }

    #[tokio::test]
    async fn test_second_read_waits_for_first() {
        let screen = VirtualScreen::new(40, 5);
        let mut events = typed_line("first");
        events.extend(typed_line("second"));
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(events));
        let readline = Arc::new(readline);

        let one = tokio::spawn({
            let readline = readline.clone();
            async move { readline.read_line(false).await }
        });
        let two = tokio::spawn({
            let readline = readline.clone();
            async move { readline.read_line(false).await }
        });

        let one = one.await.unwrap().unwrap();
        let two = two.await.unwrap().unwrap();

        assert_eq!(one, ReadlineEvent::Line("first".to_string()));
        assert_eq!(two, ReadlineEvent::Line("second".to_string()));
        assert_eq!(screen.rows()[..2].to_vec(), vec![">>> first", ">>> second"]);
    }

    #[tokio::test]
    async fn test_update_config_changes_prompt() {
        let screen = VirtualScreen::new(40, 5);
        let (readline, _) = readline_on_screen(&screen, gen_input_stream(typed_line("a")));

        readline.update_config(|config| config.enable_prompt = false);
        assert!(!readline.config().enable_prompt);

        readline.read_line(false).await.unwrap();
        assert_eq!(screen.row_text(0), "a");
    }
}
