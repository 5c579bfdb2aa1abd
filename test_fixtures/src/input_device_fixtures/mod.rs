// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod async_stream_fixtures;
pub mod key_event_fixtures;

// Re-export.
pub use async_stream_fixtures::*;
pub use key_event_fixtures::*;
