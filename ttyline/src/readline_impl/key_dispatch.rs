// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{EditBuffer, History};

/// How a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Edit a line until `terminate_on` is pressed.
    Line { terminate_on: KeyCode },
    /// The first key ends the session.
    Key,
}

impl ReadMode {
    #[must_use]
    pub fn line() -> Self {
        ReadMode::Line {
            terminate_on: KeyCode::Enter,
        }
    }
}

/// What the session loop should do after a key was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Re-render and wait for the next key.
    Continue,
    /// The terminator was pressed, the line is in the buffer and was added to history.
    Submit,
    /// Single key mode got its key.
    KeyPressed(KeyEvent),
    /// Ctrl-D.
    Eof,
    /// Ctrl-C.
    Interrupted,
}

/// Apply one input event to the session state.
///
/// Events other than key presses (resize, mouse, focus, key release) are ignored.
pub fn dispatch_event(
    mode: ReadMode,
    event: &Event,
    buffer: &mut EditBuffer,
    history: &mut History,
) -> DispatchOutcome {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            dispatch_key(mode, *key_event, buffer, history)
        }
        _ => DispatchOutcome::Continue,
    }
}

/// Priority order in line mode:
/// 1. The terminator submits the line.
/// 2. Ctrl-C and Ctrl-D end the session without touching history.
/// 3. Editing keys.
/// 4. Printable characters are typed into the buffer.
/// 5. Anything else is ignored.
///
/// In key mode the first key ends the session. If it is printable it is also put in the
/// buffer, so that it is echoed when the session is not intercepted.
pub fn dispatch_key(
    mode: ReadMode,
    key_event: KeyEvent,
    buffer: &mut EditBuffer,
    history: &mut History,
) -> DispatchOutcome {
    let KeyEvent {
        code, modifiers, ..
    } = key_event;

    let terminate_on = match mode {
        ReadMode::Line { terminate_on } => terminate_on,
        ReadMode::Key => {
            if let Some(outcome) = try_end_of_input(code, modifiers) {
                return outcome;
            }
            if let KeyCode::Char(ch) = code {
                if is_text_input(ch, modifiers) {
                    buffer.insert_or_overwrite(ch);
                }
            }
            return DispatchOutcome::KeyPressed(key_event);
        }
    };

    if code == terminate_on {
        history.commit(buffer.text());
        return DispatchOutcome::Submit;
    }

    if let Some(outcome) = try_end_of_input(code, modifiers) {
        return outcome;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    if apply_emacs_binding(code, modifiers, buffer) {
        return DispatchOutcome::Continue;
    }

    match code {
        KeyCode::Up => history.navigate(-1, buffer),
        KeyCode::Down => history.navigate(1, buffer),
        KeyCode::Left => buffer.move_cursor(-1),
        KeyCode::Right => buffer.move_cursor(1),
        KeyCode::Backspace => buffer.delete_backward(ctrl),
        KeyCode::Delete => buffer.delete_forward(ctrl),
        KeyCode::Insert => buffer.toggle_overwrite(),
        KeyCode::Home => buffer.set_cursor(0),
        KeyCode::End => buffer.set_cursor(buffer.len()),
        KeyCode::Esc => buffer.clear(),
        KeyCode::Char(ch) if is_text_input(ch, modifiers) => {
            buffer.insert_or_overwrite(ch);
        }
        _ => {}
    }

    DispatchOutcome::Continue
}

fn try_end_of_input(code: KeyCode, modifiers: KeyModifiers) -> Option<DispatchOutcome> {
    if modifiers != KeyModifiers::CONTROL {
        return None;
    }
    match code {
        KeyCode::Char('c') => Some(DispatchOutcome::Interrupted),
        KeyCode::Char('d') => Some(DispatchOutcome::Eof),
        _ => None,
    }
}

/// Ctrl-A (home), Ctrl-E (end), Ctrl-U (delete to line start), Ctrl-K (delete to line
/// end). Returns `true` if the key was consumed.
#[cfg(feature = "emacs")]
fn apply_emacs_binding(code: KeyCode, modifiers: KeyModifiers, buffer: &mut EditBuffer) -> bool {
    if modifiers != KeyModifiers::CONTROL {
        return false;
    }
    match code {
        KeyCode::Char('a') => buffer.set_cursor(0),
        KeyCode::Char('e') => buffer.set_cursor(buffer.len()),
        KeyCode::Char('u') => buffer.delete_backward(true),
        KeyCode::Char('k') => buffer.delete_forward(true),
        _ => return false,
    }
    true
}

#[cfg(not(feature = "emacs"))]
fn apply_emacs_binding(_: KeyCode, _: KeyModifiers, _: &mut EditBuffer) -> bool { false }

/// A character is typed into the buffer unless it is a control character, or it comes
/// with exactly one of Ctrl / Alt held (a chord). Ctrl+Alt together is AltGr on some
/// keyboards, and produces text.
fn is_text_input(ch: char, modifiers: KeyModifiers) -> bool {
    let chord = modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
    !ch.is_control()
        && (chord.is_empty() || chord == (KeyModifiers::CONTROL | KeyModifiers::ALT))
}
