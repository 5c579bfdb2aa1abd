// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::io::Write as _;

use miette::IntoDiagnostic as _;

use crate::{InputDevice, OutputDevice, Readline, ReadlineConfig, ReadlineEvent,
            SharedWriter, StdinIsPipedResult, StdoutIsPipedResult, TTYResult,
            is_fully_uninteractive_terminal, is_stdin_piped, is_stdout_piped};

/// A [`Readline`] on the real terminal, plus the [`SharedWriter`] that came with it.
#[derive(Debug)]
pub struct TerminalConsole {
    pub readline: Readline,
    pub shared_writer: SharedWriter,
}

impl TerminalConsole {
    /// Create a new instance of [`TerminalConsole`].
    ///
    /// # Example
    ///
    /// ```
    /// async fn foo() -> miette::Result<()> {
    ///     use ttyline::{ReadlineConfig, TerminalConsole};
    ///     let Some(console) = TerminalConsole::try_new(ReadlineConfig::default())? else {
    ///         return Err(miette::miette!("Not an interactive terminal"));
    ///     };
    ///     console.println("hello");
    ///     Ok(())
    /// }
    /// ```
    ///
    /// # Returns
    /// 1. [`None`] if the terminal is not fully interactive, and the [`Readline`] is not
    ///    created. This is the case when:
    ///    - `stdin` is piped, eg: `echo "foo" | cargo run --example background_clock`.
    ///    - `stdout` is piped, eg: `cargo run --example background_clock | cat`.
    ///    - none of `stdin`, `stdout`, `stderr` is a TTY, eg: when running in `cargo test`.
    /// 2. Otherwise, a [`TerminalConsole`] in raw mode, which is restored on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode can't be entered, or the terminal doesn't report its
    /// size and the cursor position.
    pub fn try_new(config: ReadlineConfig) -> miette::Result<Option<TerminalConsole>> {
        if let StdinIsPipedResult::StdinIsPiped = is_stdin_piped() {
            return Ok(None);
        }
        if let StdoutIsPipedResult::StdoutIsPiped = is_stdout_piped() {
            return Ok(None);
        }
        if let TTYResult::IsNotInteractive = is_fully_uninteractive_terminal() {
            return Ok(None);
        }

        let output_device = OutputDevice::new_stdout();
        let input_device = InputDevice::new_event_stream();

        let (readline, shared_writer) =
            Readline::new(config, output_device, input_device).into_diagnostic()?;

        Ok(Some(TerminalConsole {
            readline,
            shared_writer,
        }))
    }

    #[must_use]
    pub fn clone_shared_writer(&self) -> SharedWriter { self.shared_writer.clone() }

    /// Replacement for [`std::io::Stdin::read_line()`] that doesn't block other writers.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be read from or written to.
    pub async fn read_line(&self) -> miette::Result<ReadlineEvent> {
        self.readline.read_line(false).await.into_diagnostic()
    }

    /// Print `content` followed by a new line. Works concurrently with
    /// [`Self::read_line()`].
    pub fn println<T>(&self, content: T)
    where
        T: std::fmt::Display,
    {
        _ = self.shared_writer.write_line(&content.to_string());
    }

    /// Print whatever was written to [`Self::shared_writer`] without a trailing `\n`.
    pub fn flush(&mut self) { _ = self.shared_writer.flush(); }
}
