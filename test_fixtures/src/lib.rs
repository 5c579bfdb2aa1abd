// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # Introduction
//!
//! This is a test fixtures library that provides reusable components for testing the
//! `ttyline` crate. It is meant to be used as a
//! [`dev-dependency`](https://doc.rust-lang.org/cargo/reference/specifying-dependencies.html#dev-dependencies).
//!
//! It provides fixtures to test async input streams and terminal output, so the line
//! editor can be tested "end to end" without a real terminal.
//! 1. The input stream fixtures generate scripted key events.
//! 2. The output fixtures capture what would be written to `stdout`. [`StdoutMock`]
//!    keeps the raw bytes, and [`VirtualScreen`] interprets the cursor movement escape
//!    sequences so tests can assert on what a user would actually see.
//!
//! This crate does not depend on `ttyline`, so that `ttyline` unit tests can use it
//! without pulling in a second copy of the crate under test.
//!
//! # async_stream_fixtures
//!
//! Here's an example of how create a stream of `T` from a `Vec<T>`.
//!
//! ```
//! # async fn example() {
//! use futures_util::StreamExt;
//! use ttyline_test_fixtures::gen_input_stream;
//!
//! let mut input_stream = gen_input_stream(vec![1, 2, 3]);
//! for _ in 1..=3 {
//!     input_stream.next().await;
//! }
//! pretty_assertions::assert_eq!(input_stream.next().await, None);
//! # }
//! ```
//!
//! # virtual_screen
//!
//! ```
//! use std::io::Write;
//! use ttyline_test_fixtures::VirtualScreen;
//!
//! let mut screen = VirtualScreen::new(10, 3);
//! screen.write_all(b"\x1b[2;3Hhi").unwrap();
//! assert_eq!(screen.row_text(1), "  hi");
//! assert_eq!(screen.cursor(), (1, 4));
//! ```

// Attach sources.
pub mod input_device_fixtures;
pub mod output_device_fixtures;

// Re-export.
pub use input_device_fixtures::*;
pub use output_device_fixtures::*;
