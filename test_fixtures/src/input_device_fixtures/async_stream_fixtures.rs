// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{pin::Pin, time::Duration};

use async_stream::stream;
use futures_core::Stream;

pub type PinnedInputStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Turn a [`Vec`] into a stream that yields each item once, then ends. This is the
/// stand-in for `crossterm::event::EventStream` in tests.
pub fn gen_input_stream<T>(generator_vec: Vec<T>) -> PinnedInputStream<T>
where
    T: Send + 'static,
{
    let it = stream! {
        for item in generator_vec {
            yield item;
        }
    };
    Box::pin(it)
}

/// Same as [`gen_input_stream`], but waits `delay` before yielding each item. Useful to
/// give concurrently running writer tasks a chance to run between keystrokes.
pub fn gen_input_stream_with_delay<T>(
    generator_vec: Vec<T>,
    delay: Duration,
) -> PinnedInputStream<T>
where
    T: Send + 'static,
{
    let it = stream! {
        for item in generator_vec {
            tokio::time::sleep(delay).await;
            yield item;
        }
    };
    Box::pin(it)
}

/// A stream that never yields. Use it when a test needs a reader that stays blocked
/// waiting for the next key.
#[must_use]
pub fn gen_pending_input_stream<T>() -> PinnedInputStream<T>
where
    T: Send + 'static,
{
    Box::pin(futures_util::stream::pending())
}
