// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod edit_buffer;
pub mod edit_session;
pub mod fair_lock;
pub mod geometry;
pub mod history;
pub mod key_dispatch;
pub mod readline;
pub mod render;
pub mod terminal_state;

// Re-export.
pub use edit_buffer::*;
pub use edit_session::*;
pub use fair_lock::*;
pub use geometry::*;
pub use history::*;
pub use key_dispatch::*;
pub use readline::*;
pub use render::*;
pub use terminal_state::*;
