// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum::EnumProperty;
use strum_macros::{AsRefStr, Display, EnumIter, EnumProperty, EnumString};

/// Keys of the user facing messages printed by the typed readers. Each key carries its
/// translations as `en` and `zh` properties.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, AsRefStr, EnumString, EnumProperty,
)]
pub enum LocaleKey {
    #[strum(props(en = "Invalid input, please try again.", zh = "输入无效, 请重试."))]
    InvalidInput,

    #[strum(props(en = "Press any key to continue...", zh = "按任意键继续..."))]
    PressAnyKeyToContinue,

    #[strum(props(en = "Select an option:", zh = "请选择一个选项:"))]
    SelectAnOption,

    #[strum(props(en = "Enter a string", zh = "请输入一个字符串"))]
    EnterAString,

    #[strum(props(en = "Enter an integer", zh = "请输入一个整数"))]
    EnterAnInteger,

    #[strum(props(en = "Enter a number", zh = "请输入一个数字"))]
    EnterANumber,

    #[strum(props(en = "Enter a date and time", zh = "请输入一个日期时间"))]
    EnterADateTime,

    #[strum(props(en = "Enter a time span", zh = "请输入一个时间间隔"))]
    EnterATimeSpan,

    #[strum(props(
        en = "Enter the number of an option to select it.",
        zh = "请输入选项的序号以选择."
    ))]
    EnterAnIntegerToSelectAnOption,

    #[strum(props(
        en = "Enter a number from the list to select an option.",
        zh = "请输入列表范围内的序号以选择."
    ))]
    EnterAnIntegerInSpecifiedRangeToSelectAnOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, Display)]
pub enum Locale {
    #[default]
    English,
    /// Simplified Chinese.
    Chinese,
}

impl Locale {
    /// Name of the [`LocaleKey`] property that holds the text in this locale.
    #[must_use]
    pub fn property(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Chinese => "zh",
        }
    }

    /// The message for `key`. A key without a translation yields `""`.
    #[must_use]
    pub fn text(self, key: LocaleKey) -> &'static str {
        key.get_str(self.property()).unwrap_or_default()
    }

    /// Pick the locale from `LC_ALL`, `LC_MESSAGES` and `LANG`, in that order of
    /// precedence, like POSIX does.
    #[must_use]
    pub fn detect() -> Self { Self::detect_from(|name| std::env::var(name).ok()) }

    /// Same as [`Self::detect()`], with the environment supplied by `lookup`.
    pub fn detect_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .into_iter()
            .filter_map(lookup)
            .find(|it| !it.is_empty())
            .map_or(Locale::English, |it| Self::from_tag(&it))
    }

    /// A language tag such as `zh_CN.UTF-8`, `zh-Hant` or `en_US`. Any Chinese tag maps
    /// to [`Locale::Chinese`], everything else to [`Locale::English`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default();
        if language.eq_ignore_ascii_case("zh") {
            Locale::Chinese
        } else {
            Locale::English
        }
    }
}
