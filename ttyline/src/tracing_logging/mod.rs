// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Set up `tracing` so that log output to the display goes through a [`crate::SharedWriter`]
//! and never garbles a line being edited. See [`tracing_setup::init()`].

// Attach sources.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_setup;

// Re-export.
pub use tracing_config::*;
pub use tracing_setup::*;
