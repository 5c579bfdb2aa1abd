// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io, sync::Arc};

use super::{EditSession, FairLock, RenderState, finish_session, render_session,
            write_over_session, write_plain};
use crate::{OutputDevice, ReadlineConfig};

pub type SafeTerminalState = Arc<FairLock<TerminalState>>;

/// Everything that has to be consistent with what is on screen. It is only ever touched
/// while holding the [`FairLock`] around it, which makes every terminal operation
/// (a render, a write, the end of a session) atomic with respect to the others.
#[allow(missing_debug_implementations)]
pub struct TerminalState {
    pub output_device: OutputDevice,
    pub render_state: RenderState,
    /// The read in flight, if any.
    pub session: Option<EditSession>,
    pub config: ReadlineConfig,
}

impl TerminalState {
    #[must_use]
    pub fn new(
        output_device: OutputDevice,
        render_state: RenderState,
        config: ReadlineConfig,
    ) -> Self {
        Self {
            output_device,
            render_state,
            session: None,
            config,
        }
    }

    /// Pick up a resize. When the terminal can't report its size, the last known
    /// viewport is kept.
    pub fn refresh_viewport(&mut self) {
        if let Ok(size) = self.output_device.query.size() {
            self.render_state.viewport = size;
        }
    }

    /// Start following the terminal's own cursor again, if it can be asked. Output that
    /// bypassed this crate is accounted for this way.
    pub fn refresh_cursor(&mut self) {
        if !self.output_device.query.is_live() {
            return;
        }
        if let Ok(cursor) = self.output_device.query.cursor_position() {
            self.render_state.cursor = cursor;
        }
    }

    /// # Errors
    ///
    /// Returns an error if the output device can't be written to.
    pub fn start_session(&mut self, session: EditSession) -> io::Result<()> {
        self.session = Some(session);
        self.render()
    }

    /// # Errors
    ///
    /// Returns an error if the output device can't be written to.
    pub fn render(&mut self) -> io::Result<()> {
        self.refresh_viewport();
        let TerminalState {
            output_device,
            render_state,
            session,
            ..
        } = self;
        let Some(session) = session else {
            return Ok(());
        };
        render_session(&mut *output_device.lock(), session, render_state)
    }

    /// End the session and move to a fresh row below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the output device can't be written to. The session is
    /// cleared either way.
    pub fn finish_session(&mut self) -> io::Result<Option<EditSession>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        finish_session(
            &mut *self.output_device.lock(),
            &session,
            &mut self.render_state,
        )?;
        Ok(Some(session))
    }

    /// Same as [`Self::finish_session`], for a read that was cancelled. There is nobody
    /// left to report an error to, so it is ignored.
    pub fn abandon_session(&mut self) {
        _ = self.finish_session();
    }

    /// Print `text` without corrupting a read in flight.
    ///
    /// With a session active the text goes where the line was, and the line is redrawn
    /// after it. Otherwise it is printed at the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the output device can't be written to.
    pub fn write(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.refresh_viewport();
        let TerminalState {
            output_device,
            render_state,
            session,
            ..
        } = self;
        let mut out = output_device.lock();
        match session {
            Some(session) => write_over_session(&mut *out, session, render_state, text),
            None => write_plain(&mut *out, render_state, text),
        }
    }
}
