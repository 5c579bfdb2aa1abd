// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod locale;
pub mod prompts;
pub mod readline_config;
pub mod terminal_console;

// Re-export.
pub use locale::*;
pub use prompts::*;
pub use readline_config::*;
pub use terminal_console::*;
