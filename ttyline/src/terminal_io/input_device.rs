// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crossterm::event::EventStream;
use futures_util::{FutureExt as _, StreamExt as _};

use crate::{CrosstermEventResult, PinnedInputStream};

/// This struct represents an input device that can be used to read key events from the
/// terminal. Tests swap in a scripted stream with [`InputDevice::new_from_stream`].
#[allow(missing_debug_implementations)]
pub struct InputDevice {
    pub resource: PinnedInputStream,
}

impl InputDevice {
    #[must_use]
    pub fn new_event_stream() -> InputDevice {
        InputDevice {
            resource: Box::pin(EventStream::new()),
        }
    }

    #[must_use]
    pub fn new_from_stream(resource: PinnedInputStream) -> InputDevice {
        InputDevice { resource }
    }
}

impl InputDevice {
    /// The next event, or [`None`] once the stream has ended (input closed).
    pub async fn next(&mut self) -> Option<CrosstermEventResult> {
        self.resource.next().fuse().await
    }
}
