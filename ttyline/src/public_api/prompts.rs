// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Typed readers built on [`Readline::read_line()`] and [`Readline::read_key()`]. Each
//! one prints its message, keeps asking until the answer parses, and prints an empty
//! line afterwards if [`crate::ReadlineConfig::append_extra_empty_line_after_input`] is
//! set.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use crossterm::event::KeyCode;
use strum::IntoEnumIterator;

use crate::{KeyReadEvent, LocaleKey, PromptKind, Readline, ReadlineError, ReadlineEvent};

impl Readline {
    /// Print `text` after the glyph for `kind`, then a new line.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal can't be written to.
    pub fn write_line_prefixed(&self, kind: PromptKind, text: &str) -> Result<(), ReadlineError> {
        let prefix = self.config().prefix(kind);
        self.write_line(&format!("{prefix}{text}"))
    }

    /// Print `message`, then read lines until `parse` accepts one. Each rejected line is
    /// answered with `error_message`.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::InputClosed`] on Ctrl-D or end of input.
    /// - [`ReadlineError::Interrupted`] on Ctrl-C.
    /// - [`ReadlineError::IO`] if the terminal fails.
    pub async fn read_for<T>(
        &self,
        message: &str,
        error_message: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, ReadlineError> {
        self.write_line_prefixed(PromptKind::Info, message)?;
        loop {
            let input = self.read_value_line().await?;
            if let Some(value) = parse(&input) {
                self.append_extra_empty_line()?;
                return Ok(value);
            }
            self.write_line_prefixed(PromptKind::Error, error_message)?;
        }
    }

    /// Any line is accepted. Without a `message`, a localized default is printed.
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_string(&self, message: Option<&str>) -> Result<String, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterAString);
        self.read_for(&message, "", |it| Some(it.to_string())).await
    }

    /// Lines are trimmed and parsed with [`FromStr`].
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_parsed<T: FromStr>(&self, message: &str) -> Result<T, ReadlineError> {
        let error_message = self.config().text(LocaleKey::InvalidInput);
        self.read_for(message, error_message, |it| it.trim().parse().ok())
            .await
    }

    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_i32(&self, message: Option<&str>) -> Result<i32, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterAnInteger);
        self.read_parsed(&message).await
    }

    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_i64(&self, message: Option<&str>) -> Result<i64, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterAnInteger);
        self.read_parsed(&message).await
    }

    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_f32(&self, message: Option<&str>) -> Result<f32, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterANumber);
        self.read_parsed(&message).await
    }

    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_f64(&self, message: Option<&str>) -> Result<f64, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterANumber);
        self.read_parsed(&message).await
    }

    /// Accepts the formats of [`parse_date_time()`].
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_date_time(
        &self,
        message: Option<&str>,
    ) -> Result<NaiveDateTime, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterADateTime);
        let error_message = self.config().text(LocaleKey::InvalidInput);
        self.read_for(&message, error_message, parse_date_time).await
    }

    /// Accepts the formats of [`parse_duration()`].
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn read_duration(&self, message: Option<&str>) -> Result<TimeDelta, ReadlineError> {
        let message = self.message_or(message, LocaleKey::EnterATimeSpan);
        let error_message = self.config().text(LocaleKey::InvalidInput);
        self.read_for(&message, error_message, parse_duration).await
    }

    /// List `options` numbered from 1 and read until one of the numbers is entered.
    /// Returns the 0-based index of the chosen option.
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn select<S: AsRef<str>>(
        &self,
        message: &str,
        options: &[S],
    ) -> Result<usize, ReadlineError> {
        let config = self.config();
        self.write_line_prefixed(PromptKind::Question, message)?;
        self.write_line_prefixed(PromptKind::Info, config.text(LocaleKey::SelectAnOption))?;
        for (index, option) in options.iter().enumerate() {
            self.write_line(&format!(" {}. {}", index + 1, option.as_ref()))?;
        }

        loop {
            let input = self.read_value_line().await?;
            let error_key = match input.trim().parse::<i64>() {
                Ok(number) => match usize::try_from(number) {
                    Ok(number) if (1..=options.len()).contains(&number) => {
                        self.append_extra_empty_line()?;
                        return Ok(number - 1);
                    }
                    _ => LocaleKey::EnterAnIntegerInSpecifiedRangeToSelectAnOption,
                },
                Err(_) => LocaleKey::EnterAnIntegerToSelectAnOption,
            };
            self.write_line_prefixed(PromptKind::Error, config.text(error_key))?;
        }
    }

    /// [`Self::select()`] over the variants of `E`, listed by their [`Display`] names.
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn select_enum<E>(&self, message: &str) -> Result<E, ReadlineError>
    where
        E: IntoEnumIterator + Display,
    {
        let mut variants: Vec<E> = E::iter().collect();
        let names: Vec<String> = variants.iter().map(ToString::to_string).collect();
        let index = self.select(message, &names).await?;
        Ok(variants.swap_remove(index))
    }

    /// Ask a yes / no question, answered by a single key: `y` or `n`, or Enter for the
    /// `default` when there is one.
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn yes_or_no(
        &self,
        message: &str,
        default: Option<bool>,
    ) -> Result<bool, ReadlineError> {
        let config = self.config();
        let tail = match default {
            None => "(y/n)",
            Some(true) => "(Y/n)",
            Some(false) => "(y/N)",
        };
        let prompt = format!("{}{message} {tail} ", config.prefix(PromptKind::Question));

        let answer = loop {
            let key_event = match self.read_key_with_prompt(&prompt, false).await? {
                KeyReadEvent::Key(it) => it,
                KeyReadEvent::Eof => return Err(ReadlineError::InputClosed),
                KeyReadEvent::Interrupted => return Err(ReadlineError::Interrupted),
            };
            match (key_event.code, default) {
                (KeyCode::Enter, Some(default)) => break default,
                (KeyCode::Char('y' | 'Y'), _) => break true,
                (KeyCode::Char('n' | 'N'), _) => break false,
                _ => self.write_line_prefixed(
                    PromptKind::Error,
                    config.text(LocaleKey::InvalidInput),
                )?,
            }
        };

        self.append_extra_empty_line()?;
        Ok(answer)
    }

    /// Wait for any key. The key is not echoed.
    ///
    /// # Errors
    ///
    /// See [`Self::read_for()`].
    pub async fn press_any_key_to_continue(
        &self,
        message: Option<&str>,
    ) -> Result<(), ReadlineError> {
        let message = self.message_or(message, LocaleKey::PressAnyKeyToContinue);
        let prompt = format!("{}{message}", self.config().prefix(PromptKind::Info));
        match self.read_key_with_prompt(&prompt, true).await? {
            KeyReadEvent::Key(_) => self.append_extra_empty_line(),
            KeyReadEvent::Eof => Err(ReadlineError::InputClosed),
            KeyReadEvent::Interrupted => Err(ReadlineError::Interrupted),
        }
    }

    async fn read_value_line(&self) -> Result<String, ReadlineError> {
        match self.read_line(false).await? {
            ReadlineEvent::Line(it) => Ok(it),
            ReadlineEvent::Eof => Err(ReadlineError::InputClosed),
            ReadlineEvent::Interrupted => Err(ReadlineError::Interrupted),
        }
    }

    fn append_extra_empty_line(&self) -> Result<(), ReadlineError> {
        if self.config().append_extra_empty_line_after_input {
            self.write_line("")?;
        }
        Ok(())
    }

    fn message_or(&self, message: Option<&str>, key: LocaleKey) -> String {
        message.map_or_else(|| self.config().text(key).to_string(), ToString::to_string)
    }
}

const DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a local date and time. Accepted:
/// - `2024-05-01 13:45`, `2024-05-01 13:45:30`, with an optional fraction of a second.
/// - The same with a `T` separator, or with `/` between the date parts.
/// - A date alone, meaning midnight.
/// - RFC 3339 with an offset, eg: `2024-05-01T13:45:30+02:00`, converted to its local
///   wall time.
#[must_use]
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(it) = DateTime::parse_from_rfc3339(text) {
        return Some(it.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Parse a time span: `[-]d` (whole days) or `[-][d.]hh:mm[:ss[.fraction]]`, where hours
/// are below 24, minutes and seconds below 60, and the fraction has at most 9 digits.
#[must_use]
pub fn parse_duration(text: &str) -> Option<TimeDelta> {
    let text = text.trim();
    let (is_negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let it = match text.split_once(':') {
        None => TimeDelta::try_days(parse_digits(text)?)?,
        Some((head, rest)) => parse_clock(head, rest)?,
    };

    Some(if is_negative { -it } else { it })
}

fn parse_clock(head: &str, rest: &str) -> Option<TimeDelta> {
    let (days, hours) = match head.split_once('.') {
        Some((days, hours)) => (parse_digits(days)?, parse_digits(hours)?),
        None => (0, parse_digits(head)?),
    };

    let mut parts = rest.split(':');
    let minutes = parts.next().and_then(parse_digits)?;
    let (seconds, nanos) = match parts.next() {
        None => (0, 0),
        Some(seconds) => match seconds.split_once('.') {
            Some((seconds, fraction)) => (parse_digits(seconds)?, parse_fraction(fraction)?),
            None => (parse_digits(seconds)?, 0),
        },
    };

    if parts.next().is_some() || hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    TimeDelta::try_days(days)?
        .checked_add(&TimeDelta::try_seconds(hours * 3_600 + minutes * 60 + seconds)?)?
        .checked_add(&TimeDelta::nanoseconds(nanos))
}

fn parse_digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|it| it.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_fraction(text: &str) -> Option<i64> {
    if text.len() > 9 {
        return None;
    }
    let value = parse_digits(text)?;
    let scale = 10_i64.pow(9 - u32::try_from(text.len()).ok()?);
    Some(value * scale)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use strum_macros::{Display, EnumIter};
    use test_case::test_case;
    use ttyline_test_fixtures::{VirtualScreen, char_key, ctrl, gen_input_stream, key,
                                typed_line};

    use super::*;
    use crate::{CrosstermEventResult, InputDevice, Locale, OutputDevice, ReadlineConfig,
                SharedWriter, Size};

    fn readline_with(
        events: Vec<CrosstermEventResult>,
        append_extra_empty_line_after_input: bool,
    ) -> (Readline, SharedWriter, VirtualScreen) {
        let screen = VirtualScreen::new(80, 20);
        let config = ReadlineConfig {
            locale: Locale::English,
            append_extra_empty_line_after_input,
            ..ReadlineConfig::default()
        };
        let (readline, shared_writer) = Readline::new(
            config,
            OutputDevice::new_mock(screen.clone(), Size::new(80, 20)),
            InputDevice::new_from_stream(gen_input_stream(events)),
        )
        .unwrap();
        (readline, shared_writer, screen)
    }

    fn lines(texts: &[&str]) -> Vec<CrosstermEventResult> {
        texts.iter().flat_map(|it| typed_line(it)).collect()
    }

    #[tokio::test]
    async fn test_read_i32_retries_until_valid() {
        let (readline, _, screen) = readline_with(lines(&["abc", " 42 "]), true);

        let value = readline.read_i32(None).await.unwrap();

        assert_eq!(value, 42);
        assert_eq!(screen.visible_text(), [
            "[#] Enter an integer",
            ">>> abc",
            "[X] Invalid input, please try again.",
            ">>>  42",
        ]
        .join("\n"));
        // The extra empty line.
        assert_eq!(screen.cursor(), (5, 0));
    }

    #[tokio::test]
    async fn test_read_string_accepts_anything() {
        let (readline, _, screen) = readline_with(lines(&[""]), false);
        let value = readline.read_string(Some("Name")).await.unwrap();
        assert_eq!(value, "");
        assert_eq!(screen.row_text(0), "[#] Name");
        assert_eq!(screen.cursor(), (2, 0));
    }

    #[tokio::test]
    async fn test_read_for_custom_validator() {
        let (readline, _, screen) = readline_with(lines(&["cat", "dog"]), false);
        let value = readline
            .read_for("Pet", "Only dogs", |it| (it == "dog").then(|| it.len()))
            .await
            .unwrap();
        assert_eq!(value, 3);
        assert_eq!(screen.row_text(2), "[X] Only dogs");
    }

    #[tokio::test]
    async fn test_read_for_end_of_input() {
        let (readline, _, _) = readline_with(lines(&["x"]), false);
        let result = readline.read_f64(None).await;
        assert!(matches!(result, Err(ReadlineError::InputClosed)));

        let (readline, _, _) = readline_with(vec![ctrl(KeyCode::Char('c'))], false);
        let result = readline.read_i64(None).await;
        assert!(matches!(result, Err(ReadlineError::Interrupted)));
    }

    #[tokio::test]
    async fn test_select() {
        let (readline, _, screen) = readline_with(lines(&["x", "0", "-1", "2"]), false);

        let index = readline.select("Pick a color", &["red", "green"]).await.unwrap();

        assert_eq!(index, 1);
        assert_eq!(screen.rows()[..10].to_vec(), vec![
            "[?] Pick a color",
            "[#] Select an option:",
            " 1. red",
            " 2. green",
            ">>> x",
            "[X] Enter the number of an option to select it.",
            ">>> 0",
            "[X] Enter a number from the list to select an option.",
            ">>> -1",
            "[X] Enter a number from the list to select an option.",
        ]);
        assert_eq!(screen.row_text(10), ">>> 2");
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
    enum Fruit {
        Apple,
        Banana,
        Cherry,
    }

    #[tokio::test]
    async fn test_select_enum() {
        let (readline, _, screen) = readline_with(lines(&["3"]), false);
        let fruit: Fruit = readline.select_enum("Fruit?").await.unwrap();
        assert_eq!(fruit, Fruit::Cherry);
        assert_eq!(screen.row_text(3), " 2. Banana");
    }

    #[test_case(vec![char_key('y')], None, true; "y without default")]
    #[test_case(vec![char_key('N')], Some(true), false; "n over default yes")]
    #[test_case(vec![key(KeyCode::Enter)], Some(true), true; "enter picks yes")]
    #[test_case(vec![key(KeyCode::Enter)], Some(false), false; "enter picks no")]
    #[test_case(
        vec![key(KeyCode::Enter), char_key('x'), char_key('n')], None, false;
        "enter without default is rejected"
    )]
    #[tokio::test]
    async fn test_yes_or_no(
        events: Vec<CrosstermEventResult>,
        default: Option<bool>,
        expected: bool,
    ) {
        let (readline, _, _) = readline_with(events, false);
        let answer = readline.yes_or_no("Continue?", default).await.unwrap();
        assert_eq!(answer, expected);
    }

    #[tokio::test]
    async fn test_yes_or_no_screen() {
        let events = vec![char_key('x'), char_key('y')];
        let (readline, _, screen) = readline_with(events, true);

        assert!(readline.yes_or_no("Continue?", Some(false)).await.unwrap());

        assert_eq!(screen.visible_text(), [
            "[?] Continue? (y/N) x",
            "[X] Invalid input, please try again.",
            "[?] Continue? (y/N) y",
        ]
        .join("\n"));
        assert_eq!(screen.cursor(), (4, 0));
    }

    #[tokio::test]
    async fn test_yes_or_no_input_closed() {
        let (readline, _, _) = readline_with(vec![], false);
        let result = readline.yes_or_no("Continue?", None).await;
        assert!(matches!(result, Err(ReadlineError::InputClosed)));
    }

    #[tokio::test]
    async fn test_press_any_key_to_continue() {
        let (readline, _, screen) = readline_with(vec![char_key('q')], false);
        readline.press_any_key_to_continue(None).await.unwrap();
        assert_eq!(screen.visible_text(), "[#] Press any key to continue...");
        assert_eq!(screen.cursor(), (1, 0));
    }

    #[tokio::test]
    async fn test_read_date_time_and_duration() {
        let (readline, _, _) =
            readline_with(lines(&["yesterday", "2024-05-01 13:45", "1.02:03:04.5"]), false);

        let date_time = readline.read_date_time(None).await.unwrap();
        assert_eq!(
            date_time,
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_time(NaiveTime::from_hms_opt(13, 45, 0).unwrap())
        );

        let duration = readline.read_duration(None).await.unwrap();
        assert_eq!(
            duration,
            TimeDelta::try_seconds(86_400 + 2 * 3_600 + 3 * 60 + 4).unwrap()
                + TimeDelta::milliseconds(500)
        );
    }

    #[test_case("2024-05-01 13:45:30" => Some((2024, 5, 1, 13, 45, 30)))]
    #[test_case("2024/05/01 08:00" => Some((2024, 5, 1, 8, 0, 0)))]
    #[test_case("2024-05-01T13:45:30+02:00" => Some((2024, 5, 1, 13, 45, 30)))]
    #[test_case(" 2024-05-01 " => Some((2024, 5, 1, 0, 0, 0)))]
    #[test_case("2024-13-01" => None)]
    #[test_case("" => None)]
    fn test_parse_date_time(text: &str) -> Option<(i32, u32, u32, u32, u32, u32)> {
        use chrono::{Datelike, Timelike};
        parse_date_time(text).map(|it| {
            (it.year(), it.month(), it.day(), it.hour(), it.minute(), it.second())
        })
    }

    #[test_case("3" => Some(3 * 86_400_000))]
    #[test_case("00:01" => Some(60_000))]
    #[test_case("01:02:03" => Some(3_723_000))]
    #[test_case("-0:00:01.25" => Some(-1_250))]
    #[test_case("2.00:00" => Some(2 * 86_400_000))]
    #[test_case("24:00" => None)]
    #[test_case("00:60" => None)]
    #[test_case("1:2:3:4" => None)]
    #[test_case("1.5" => None)]
    #[test_case("abc" => None)]
    #[test_case("" => None)]
    fn test_parse_duration(text: &str) -> Option<i64> {
        parse_duration(text).map(|it| it.num_milliseconds())
    }
}
