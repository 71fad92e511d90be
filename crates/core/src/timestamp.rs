//! Timestamp display formatting.
//!
//! A [`TimestampFormatter`] turns an epoch-seconds value into one of the
//! display variants named by [`FormatSelector`]. It owns three capabilities:
//! a [`Clock`] (only consulted by [`FormatSelector::Relative`]), a display
//! time zone, and a [`LocaleFormatter`] for names and patterns.
//!
//! ```text
//! t  03:04 PM
//! T  03:04:09 PM
//! d  3/5/2024
//! D  3/5/2024, 03:04 PM
//! f  March 5th, 2024 at 03:04:09 PM GMT+00:00
//! F  Tuesday, March 5th, 2024 at 03:04:09 PM GMT+00:00
//! R  3 hours ago
//! ```

use crate::clock::{Clock, SystemClock};
use crate::error::FormatError;
use crate::locale::{EnUs, LocaleFormatter};
use crate::message::epoch_seconds_to_datetime;
use crate::relative::relative_time;
use chrono::{DateTime, Datelike, Local, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatSelector {
    ShortTime,
    LongTime,
    ShortDate,
    DateAndTime,
    FullDateTimeWithZone,
    FullDateTimeWithWeekdayAndZone,
    Relative,
    #[default]
    Default,
}

impl FormatSelector {
    pub const ALL: [FormatSelector; 8] = [
        Self::ShortTime,
        Self::LongTime,
        Self::ShortDate,
        Self::DateAndTime,
        Self::FullDateTimeWithZone,
        Self::FullDateTimeWithWeekdayAndZone,
        Self::Relative,
        Self::Default,
    ];

    /// Parse a one-letter markup code (`t`, `T`, `d`, `D`, `f`, `F`, `R`) or a
    /// snake_case selector name. Anything else selects [`Self::Default`].
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        let selector = match code {
            "t" | "short_time" => Some(Self::ShortTime),
            "T" | "long_time" => Some(Self::LongTime),
            "d" | "short_date" => Some(Self::ShortDate),
            "D" | "date_and_time" => Some(Self::DateAndTime),
            "f" | "full_date_time_with_zone" => Some(Self::FullDateTimeWithZone),
            "F" | "full_date_time_with_weekday_and_zone" => {
                Some(Self::FullDateTimeWithWeekdayAndZone)
            }
            "R" | "relative" => Some(Self::Relative),
            "default" => Some(Self::Default),
            _ => None,
        };
        selector.unwrap_or_else(|| {
            tracing::warn!(code, "unknown timestamp format selector, using default");
            Self::Default
        })
    }

    pub fn code(&self) -> Option<char> {
        match self {
            Self::ShortTime => Some('t'),
            Self::LongTime => Some('T'),
            Self::ShortDate => Some('d'),
            Self::DateAndTime => Some('D'),
            Self::FullDateTimeWithZone => Some('f'),
            Self::FullDateTimeWithWeekdayAndZone => Some('F'),
            Self::Relative => Some('R'),
            Self::Default => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ShortTime => "short_time",
            Self::LongTime => "long_time",
            Self::ShortDate => "short_date",
            Self::DateAndTime => "date_and_time",
            Self::FullDateTimeWithZone => "full_date_time_with_zone",
            Self::FullDateTimeWithWeekdayAndZone => "full_date_time_with_weekday_and_zone",
            Self::Relative => "relative",
            Self::Default => "default",
        }
    }

    /// Only relative output depends on the clock.
    pub fn is_clock_dependent(&self) -> bool {
        matches!(self, Self::Relative)
    }
}

/// English ordinal suffix for a day of month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn ordinal_day(day: u32) -> String {
    format!("{day}{}", ordinal_suffix(day))
}

/// `GMT+HH:MM` / `GMT-HH:MM` for an offset east of UTC in seconds.
pub fn gmt_offset(local_minus_utc: i32) -> String {
    let sign = if local_minus_utc < 0 { '-' } else { '+' };
    let total_minutes = local_minus_utc.unsigned_abs() / 60;
    format!("GMT{sign}{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

pub struct TimestampFormatter<C = SystemClock, Tz = Local>
where
    Tz: TimeZone,
{
    clock: C,
    time_zone: Tz,
    locale: Box<dyn LocaleFormatter + Send + Sync>,
}

impl TimestampFormatter {
    /// System clock, system time zone, en-US.
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
            time_zone: Local,
            locale: Box::new(EnUs),
        }
    }
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, Tz> TimestampFormatter<C, Tz>
where
    C: Clock,
    Tz: TimeZone,
{
    pub fn with_clock<C2: Clock>(self, clock: C2) -> TimestampFormatter<C2, Tz> {
        TimestampFormatter {
            clock,
            time_zone: self.time_zone,
            locale: self.locale,
        }
    }

    pub fn with_time_zone<Tz2: TimeZone>(self, time_zone: Tz2) -> TimestampFormatter<C, Tz2> {
        TimestampFormatter {
            clock: self.clock,
            time_zone,
            locale: self.locale,
        }
    }

    pub fn with_locale<L>(mut self, locale: L) -> Self
    where
        L: LocaleFormatter + Send + Sync + 'static,
    {
        self.locale = Box::new(locale);
        self
    }

    pub fn with_boxed_locale(mut self, locale: Box<dyn LocaleFormatter + Send + Sync>) -> Self {
        self.locale = locale;
        self
    }

    pub fn time_zone(&self) -> &Tz {
        &self.time_zone
    }

    /// Format epoch seconds with the formatter's own locale.
    pub fn format(
        &self,
        epoch_seconds: i64,
        selector: FormatSelector,
    ) -> Result<String, FormatError> {
        self.format_in(epoch_seconds, selector, self.locale.as_ref())
    }

    /// Format epoch seconds with a caller-supplied locale.
    pub fn format_in(
        &self,
        epoch_seconds: i64,
        selector: FormatSelector,
        locale: &dyn LocaleFormatter,
    ) -> Result<String, FormatError> {
        let instant = epoch_seconds_to_datetime(epoch_seconds)?;
        Ok(self.render(&instant, selector, locale))
    }

    /// Format a textual epoch-seconds value (`"1709294400"`). Non-numeric
    /// input is an [`FormatError::InvalidTimestamp`].
    pub fn format_raw(&self, raw: &str, selector: FormatSelector) -> Result<String, FormatError> {
        let seconds = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| FormatError::InvalidTimestamp(raw.to_string()))?;
        self.format(seconds, selector)
    }

    pub fn format_datetime(&self, instant: &DateTime<Utc>, selector: FormatSelector) -> String {
        self.render(instant, selector, self.locale.as_ref())
    }

    fn render(
        &self,
        instant: &DateTime<Utc>,
        selector: FormatSelector,
        locale: &dyn LocaleFormatter,
    ) -> String {
        let zoned = instant.with_timezone(&self.time_zone);
        let local = zoned.naive_local();

        match selector {
            FormatSelector::ShortTime => locale.short_time(&local),
            FormatSelector::LongTime => locale.long_time(&local),
            FormatSelector::ShortDate => locale.short_date(&local),
            FormatSelector::DateAndTime => {
                format!("{}, {}", locale.short_date(&local), locale.short_time(&local))
            }
            FormatSelector::FullDateTimeWithZone => self.full_with_zone(&zoned, locale),
            FormatSelector::FullDateTimeWithWeekdayAndZone => format!(
                "{}, {}",
                locale.weekday_name(&local),
                self.full_with_zone(&zoned, locale)
            ),
            FormatSelector::Relative => {
                let now = self.clock.now().with_timezone(&self.time_zone);
                locale.relative_phrase(relative_time(&zoned, &now))
            }
            FormatSelector::Default => locale.default_date_time(&local),
        }
    }

    fn full_with_zone(&self, zoned: &DateTime<Tz>, locale: &dyn LocaleFormatter) -> String {
        let local = zoned.naive_local();
        let offset = zoned.offset().fix().local_minus_utc();
        format!(
            "{} {}, {} at {} {}",
            locale.month_name(&local),
            ordinal_day(local.day()),
            local.year(),
            locale.long_time(&local),
            gmt_offset(offset)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::locale::PosixLocale;
    use chrono::{FixedOffset, NaiveDateTime};

    // 2024-03-05T15:04:09Z
    const SAMPLE: i64 = 1_709_651_049;

    fn utc_formatter() -> TimestampFormatter<FixedClock, Utc> {
        TimestampFormatter::new()
            .with_clock(FixedClock(Utc.timestamp_opt(SAMPLE, 0).unwrap()))
            .with_time_zone(Utc)
    }

    struct Stub;

    impl LocaleFormatter for Stub {
        fn short_time(&self, _: &NaiveDateTime) -> String {
            "ST".to_string()
        }
        fn long_time(&self, _: &NaiveDateTime) -> String {
            "LT".to_string()
        }
        fn short_date(&self, _: &NaiveDateTime) -> String {
            "SD".to_string()
        }
        fn default_date_time(&self, _: &NaiveDateTime) -> String {
            "DEFAULT".to_string()
        }
        fn month_name(&self, _: &NaiveDateTime) -> String {
            "Month".to_string()
        }
        fn weekday_name(&self, _: &NaiveDateTime) -> String {
            "Weekday".to_string()
        }
    }

    #[test]
    fn ordinal_suffixes_follow_english_rules() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (30, "30th"),
            (31, "31st"),
        ];
        for (day, expected) in cases {
            assert_eq!(ordinal_day(day), expected, "day {day}");
        }
    }

    #[test]
    fn gmt_offset_pads_hours_and_minutes() {
        assert_eq!(gmt_offset(0), "GMT+00:00");
        assert_eq!(gmt_offset(5 * 3600 + 30 * 60), "GMT+05:30");
        assert_eq!(gmt_offset(-(3 * 3600 + 30 * 60)), "GMT-03:30");
    }

    #[test]
    fn selectors_render_en_us_in_utc() {
        let f = utc_formatter();
        let render = |selector| f.format(SAMPLE, selector).expect("valid timestamp");
        assert_eq!(render(FormatSelector::ShortTime), "03:04 PM");
        assert_eq!(render(FormatSelector::LongTime), "03:04:09 PM");
        assert_eq!(render(FormatSelector::ShortDate), "3/5/2024");
        assert_eq!(render(FormatSelector::DateAndTime), "3/5/2024, 03:04 PM");
        assert_eq!(
            render(FormatSelector::FullDateTimeWithZone),
            "March 5th, 2024 at 03:04:09 PM GMT+00:00"
        );
        assert_eq!(
            render(FormatSelector::FullDateTimeWithWeekdayAndZone),
            "Tuesday, March 5th, 2024 at 03:04:09 PM GMT+00:00"
        );
        assert_eq!(render(FormatSelector::Relative), "just now");
        assert_eq!(render(FormatSelector::Default), "3/5/2024, 3:04:09 PM");
    }

    #[test]
    fn zone_offset_shifts_fields_and_suffix() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let f = utc_formatter().with_time_zone(tz);
        assert_eq!(
            f.format(SAMPLE, FormatSelector::FullDateTimeWithZone).unwrap(),
            "March 5th, 2024 at 10:04:09 AM GMT-05:00"
        );

        let tz = FixedOffset::east_opt(10 * 3600).unwrap();
        let f = utc_formatter().with_time_zone(tz);
        assert_eq!(
            f.format(SAMPLE, FormatSelector::FullDateTimeWithZone).unwrap(),
            "March 6th, 2024 at 01:04:09 AM GMT+10:00"
        );
    }

    #[test]
    fn relative_selector_uses_injected_clock() {
        let f = utc_formatter();
        assert_eq!(f.format(SAMPLE - 59, FormatSelector::Relative).unwrap(), "59 seconds ago");
        assert_eq!(f.format(SAMPLE - 60, FormatSelector::Relative).unwrap(), "1 minute ago");
        assert_eq!(
            f.format(SAMPLE + 3 * 3600, FormatSelector::Relative).unwrap(),
            "in 3 hours"
        );
    }

    #[test]
    fn formatting_is_repeatable() {
        let f = utc_formatter();
        for selector in FormatSelector::ALL {
            assert_eq!(f.format(SAMPLE, selector), f.format(SAMPLE, selector));
        }
    }

    #[test]
    fn caller_locale_overrides_default() {
        let f = utc_formatter();
        assert_eq!(
            f.format_in(SAMPLE, FormatSelector::DateAndTime, &Stub).unwrap(),
            "SD, ST"
        );
        assert_eq!(
            f.format_in(SAMPLE, FormatSelector::FullDateTimeWithWeekdayAndZone, &Stub)
                .unwrap(),
            "Weekday, Month 5th, 2024 at LT GMT+00:00"
        );
    }

    #[test]
    fn posix_locale_renders_localized_month() {
        let f = utc_formatter().with_locale(PosixLocale::from_tag("de_DE").unwrap());
        let out = f.format(SAMPLE, FormatSelector::FullDateTimeWithZone).unwrap();
        assert!(out.starts_with("März 5th, 2024 at "), "{out}");
    }

    #[test]
    fn invalid_raw_input_is_rejected() {
        let f = utc_formatter();
        assert!(matches!(
            f.format_raw("not-a-number", FormatSelector::ShortTime),
            Err(FormatError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            f.format(i64::MAX, FormatSelector::ShortTime),
            Err(FormatError::InvalidTimestamp(_))
        ));
        assert_eq!(
            f.format_raw(" 1709651049 ", FormatSelector::ShortDate).unwrap(),
            "3/5/2024"
        );
    }

    #[test]
    fn unknown_codes_fall_back_to_default() {
        assert_eq!(FormatSelector::from_code("x"), FormatSelector::Default);
        assert_eq!(FormatSelector::from_code(""), FormatSelector::Default);
        assert_eq!(FormatSelector::from_code("R"), FormatSelector::Relative);
        assert_eq!(FormatSelector::from_code("r"), FormatSelector::Default);
        for selector in FormatSelector::ALL {
            assert_eq!(FormatSelector::from_code(selector.name()), selector);
            if let Some(code) = selector.code() {
                assert_eq!(FormatSelector::from_code(&code.to_string()), selector);
            }
        }
    }
}
