// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod input_device;
pub mod output_device;
pub mod shared_writer;
pub mod term;

// Re-export.
pub use input_device::*;
pub use output_device::*;
pub use shared_writer::*;
pub use term::*;
