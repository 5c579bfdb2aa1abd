// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Shorthand for building the `crossterm` key events that tests feed into the editor.

use std::io;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Same shape as the items of `crossterm::event::EventStream`.
pub type CrosstermEventResult = Result<Event, io::Error>;

#[must_use]
pub fn key(code: KeyCode) -> CrosstermEventResult {
    Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

#[must_use]
pub fn ctrl(code: KeyCode) -> CrosstermEventResult {
    Ok(Event::Key(KeyEvent::new(code, KeyModifiers::CONTROL)))
}

#[must_use]
pub fn char_key(ch: char) -> CrosstermEventResult {
    let modifiers = if ch.is_uppercase() {
        KeyModifiers::SHIFT
    } else {
        KeyModifiers::NONE
    };
    Ok(Event::Key(KeyEvent::new(KeyCode::Char(ch), modifiers)))
}

#[must_use]
pub fn enter() -> CrosstermEventResult { key(KeyCode::Enter) }

/// One key event per character of `text`.
#[must_use]
pub fn typed(text: &str) -> Vec<CrosstermEventResult> {
    text.chars().map(char_key).collect()
}

/// The key events to type `text` and then press Enter.
#[must_use]
pub fn typed_line(text: &str) -> Vec<CrosstermEventResult> {
    let mut it = typed(text);
    it.push(enter());
    it
}
