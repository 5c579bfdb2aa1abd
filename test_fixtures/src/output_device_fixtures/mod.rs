// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod stdout_mock;
pub mod virtual_screen;

// Re-export.
pub use stdout_mock::*;
pub use virtual_screen::*;
