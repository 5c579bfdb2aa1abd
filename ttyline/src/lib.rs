// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// https://github.com/rust-lang/rust-clippy
// https://rust-lang.github.io/rust-clippy/master/index.html
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

//! The `ttyline` library reads lines and single keys from the terminal, with in-place
//! editing and history recall, while any other thread or task keeps printing to the
//! same terminal. Output from those writers shows up above the line being edited, and
//! the prompt, the typed text, and the cursor are redrawn below it.
//!
//! # Why use this crate
//!
//! 1. Because
//!    [`read_line()`](https://doc.rust-lang.org/std/io/struct.Stdin.html#method.read_line)
//!    is blocking, and it does not know about anybody else printing.
//!
//!     - When another thread writes to `stdout` while `read_line()` is waiting, the text
//!       lands wherever the caret happens to be, in the middle of what the user is
//!       typing.
//!     - The user's input is then visually split across the output, even though the
//!       program receives it intact.
//!
//! 2. A `read_line()` that is blocked can't be cancelled. [`Readline::read_line()`] is a
//!    future, so it can be dropped. The line being edited is closed on screen and the
//!    next write starts below it.
//!
//! # Features
//!
//! 1. Read a line with [`Readline::read_line()`], or a single key with
//!    [`Readline::read_key()`]. Either one can be "intercepted", meaning the typed
//!    characters are not shown, eg: for passwords.
//!
//! 2. Print with [`Readline::write()`] and [`Readline::write_line()`] from anywhere, at
//!    any time. A [`SharedWriter`] does the same, implements [`std::io::Write`], and can
//!    be cloned and moved into other tasks and threads.
//!
//! 3. Typed readers that keep asking until the answer is valid:
//!    [`Readline::read_i32()`], [`Readline::read_f64()`],
//!    [`Readline::read_date_time()`], [`Readline::read_duration()`],
//!    [`Readline::select()`], [`Readline::yes_or_no()`],
//!    [`Readline::press_any_key_to_continue()`], and the generic
//!    [`Readline::read_for()`]. Their messages come in English and Chinese, see
//!    [`Locale`].
//!
//! 4. Tokio tracing. Log output to the display can go through a [`SharedWriter`], so
//!    log lines never garble the line being edited. See [`tracing_setup::init()`].
//!
//! 5. Plug in your own devices. [`Readline::new()`] takes an [`OutputDevice`] and an
//!    [`InputDevice`]. Tests use this to replace the terminal with a scripted stream of
//!    key events and an in-memory screen.
//!
//! This crate can detect when your terminal is not in interactive mode. Eg: when you pipe
//! the output of your program to another program. In this case
//! [`TerminalConsole::try_new()`] returns [`None`].
//!
//! ```bash
//! # This will work.
//! cargo run --example background_clock
//!
//! # This won't do anything. Just exits with no error.
//! echo "hello" | cargo run --example background_clock
//! ```
//!
//! ## Input Editing Behavior
//!
//! - Left, Right: Move the cursor left / right.
//! - Up, Down: Scroll through input history. Down past the newest entry clears the line.
//! - Home, End: Jump to the start / end of the line.
//!     - When the "emacs" feature (on by default) is enabled, Ctrl-A and Ctrl-E have the
//!       same effect.
//! - Backspace, Delete: Erase the character before / under the cursor. With Ctrl held,
//!   erase everything before / from the cursor.
//! - Insert: Toggle between insert and overwrite mode. The cursor is a bar in insert
//!   mode and a block in overwrite mode. The mode carries over to the next read.
//! - Esc: Erase the whole line.
//! - With the "emacs" feature: Ctrl-U erases to the start of the line, Ctrl-K erases to
//!   the end of the line.
//! - Ctrl-C: End the read with [`ReadlineEvent::Interrupted`].
//! - Ctrl-D: End the read with [`ReadlineEvent::Eof`].
//! - Enter: Submit the line. It is added to the in-memory history.
//!
//! Lines that don't fit in the terminal wrap onto the next rows, and the screen scrolls
//! when the input reaches the bottom.
//!
//! # Examples
//!
//! ```bash
//! cargo run --example background_clock
//! ```
//!
//! # How to use this crate
//!
//! ## [`TerminalConsole::try_new()`], which is the main entry point for most use cases
//!
//! 1. To read user input, call [`TerminalConsole::read_line()`], or any method of the
//!    [`TerminalConsole::readline`] field.
//! 2. Call [`TerminalConsole::clone_shared_writer()`] to get a [`SharedWriter`] that you
//!    can use to write to the terminal concurrently, using [`std::write!`] or
//!    [`std::writeln!`].
//! 3. If you use [`std::writeln!`] then there's no need to [`TerminalConsole::flush()`]
//!    because the `\n` prints the buffer. When there's no `\n` in the buffer, call
//!    [`std::io::Write::flush()`] on the [`SharedWriter`].
//!
//! ## [`Readline`] overview (please see the docs for this struct for details)
//!
//! - There is at most one read in flight per [`Readline`]. A second read waits until
//!   the first one is done.
//! - Writes never wait for a read to finish. They only wait for the terminal, which is
//!   handed out one operation at a time, in the order it was asked for.
//! - Drop the [`Readline`] to take the terminal out of raw mode.
//!
//! ## [`tracing_setup::init()`]
//!
//! Sets up Tokio [`tracing_subscriber`] with the display and / or a log file as the
//! output destination. Use [`TracingConfig`] to choose `stdout`, `stderr`, or a
//! [`SharedWriter`] for the display, the log file path, and the log level.

// Attach sources.
pub mod public_api;
pub mod readline_impl;
pub mod terminal_io;
pub mod tracing_logging;

// Re-export the public API.
pub use public_api::*;
pub use readline_impl::*;
pub use terminal_io::*;
pub use tracing_logging::*;

// External crates.
use std::{io, pin::Pin, sync::Arc};

use crossterm::event::Event;
use futures_core::Stream;

pub type StdMutex<T> = std::sync::Mutex<T>;

pub type SendRawTerminal = dyn std::io::Write + Send;
pub type SafeRawTerminal = Arc<StdMutex<SendRawTerminal>>;

/// Same shape as the items of [`crossterm::event::EventStream`].
pub type CrosstermEventResult = Result<Event, io::Error>;
pub type PinnedInputStream = Pin<Box<dyn Stream<Item = CrosstermEventResult> + Send>>;

/// Default for [`ReadlineConfig::text_length_limit`].
pub const TEXT_LENGTH_LIMIT: usize = 256;
