// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Locale, LocaleKey, ReadlineError, TEXT_LENGTH_LIMIT};

/// The glyphs that start each kind of line the typed readers print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptGlyphs {
    pub info: String,
    pub warn: String,
    pub error: String,
    pub question: String,
    pub input: String,
}

impl Default for PromptGlyphs {
    fn default() -> Self {
        Self {
            info: "[#]".into(),
            warn: "[!]".into(),
            error: "[X]".into(),
            question: "[?]".into(),
            input: ">>>".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Info,
    Warn,
    Error,
    Question,
    Input,
}

/// Settings shared by every read on one [`crate::Readline`]. Change them with
/// [`crate::Readline::update_config()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadlineConfig {
    pub prompts: PromptGlyphs,
    /// Typing stops at this many characters.
    pub text_length_limit: usize,
    /// Without it, no glyphs are printed at all.
    pub enable_prompt: bool,
    /// Print an empty line after a typed reader got its value.
    pub append_extra_empty_line_after_input: bool,
    pub locale: Locale,
    /// Process exit code for applications that quit when input closes. See
    /// [`ReadlineConfig::exit_code_on()`].
    pub exit_code: i32,
}

impl Default for ReadlineConfig {
    fn default() -> Self {
        Self {
            prompts: PromptGlyphs::default(),
            text_length_limit: TEXT_LENGTH_LIMIT,
            enable_prompt: true,
            append_extra_empty_line_after_input: true,
            locale: Locale::detect(),
            exit_code: -1,
        }
    }
}

impl ReadlineConfig {
    /// The glyph for `kind` followed by a space, or nothing when prompts are disabled.
    #[must_use]
    pub fn prefix(&self, kind: PromptKind) -> String {
        if !self.enable_prompt {
            return String::new();
        }
        let glyph = match kind {
            PromptKind::Info => &self.prompts.info,
            PromptKind::Warn => &self.prompts.warn,
            PromptKind::Error => &self.prompts.error,
            PromptKind::Question => &self.prompts.question,
            PromptKind::Input => &self.prompts.input,
        };
        format!("{glyph} ")
    }

    #[must_use]
    pub fn input_prompt(&self) -> String { self.prefix(PromptKind::Input) }

    #[must_use]
    pub fn text(&self, key: LocaleKey) -> &'static str { self.locale.text(key) }

    /// The code to pass to [`std::process::exit`] when `error` ended a read: the
    /// configured [`Self::exit_code`] once input has closed, `None` for anything else.
    #[must_use]
    pub fn exit_code_on(&self, error: &ReadlineError) -> Option<i32> {
        match error {
            ReadlineError::InputClosed => Some(self.exit_code),
            _ => None,
        }
    }
}
