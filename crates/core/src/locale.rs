//! Locale-dependent pieces of timestamp rendering.
//!
//! The formatter hands wall-clock values that are already shifted into the
//! display zone, so implementations never deal with offsets. [`EnUs`] is the
//! default. [`PosixLocale`] draws month names and date/time patterns from
//! chrono's locale tables.

use crate::relative::{english_phrase, RelativeTime};
use chrono::NaiveDateTime;

pub const DEFAULT_LOCALE_TAG: &str = "en-US";

pub trait LocaleFormatter {
    /// Hour and minute.
    fn short_time(&self, local: &NaiveDateTime) -> String;
    /// Hour, minute and second.
    fn long_time(&self, local: &NaiveDateTime) -> String;
    fn short_date(&self, local: &NaiveDateTime) -> String;
    fn default_date_time(&self, local: &NaiveDateTime) -> String;
    fn month_name(&self, local: &NaiveDateTime) -> String;
    fn weekday_name(&self, local: &NaiveDateTime) -> String;

    /// Relative phrases are English for every locale unless an
    /// implementation overrides this.
    fn relative_phrase(&self, relative: RelativeTime) -> String {
        english_phrase(relative)
    }
}

/// United States English, matching what browsers render for `en-US`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnUs;

impl LocaleFormatter for EnUs {
    fn short_time(&self, local: &NaiveDateTime) -> String {
        local.format("%I:%M %p").to_string()
    }

    fn long_time(&self, local: &NaiveDateTime) -> String {
        local.format("%I:%M:%S %p").to_string()
    }

    fn short_date(&self, local: &NaiveDateTime) -> String {
        local.format("%-m/%-d/%Y").to_string()
    }

    fn default_date_time(&self, local: &NaiveDateTime) -> String {
        local.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }

    fn month_name(&self, local: &NaiveDateTime) -> String {
        local.format("%B").to_string()
    }

    fn weekday_name(&self, local: &NaiveDateTime) -> String {
        local.format("%A").to_string()
    }
}

/// A locale from the POSIX locale database bundled with chrono.
///
/// Only names and date/time patterns are localized. Relative phrases and the
/// ordinal suffix in the long layouts stay English.
#[derive(Debug, Clone, Copy)]
pub struct PosixLocale {
    locale: chrono::Locale,
}

impl PosixLocale {
    pub fn new(locale: chrono::Locale) -> Self {
        Self { locale }
    }

    /// Accepts `de-DE`, `de_DE` and similar tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().replace('-', "_");
        chrono::Locale::try_from(normalized.as_str())
            .ok()
            .map(Self::new)
    }

    pub fn locale(&self) -> chrono::Locale {
        self.locale
    }

    fn render(&self, local: &NaiveDateTime, pattern: &str) -> String {
        // Patterns used here carry no offset, so pinning to UTC keeps the
        // wall-clock fields intact.
        local
            .and_utc()
            .format_localized(pattern, self.locale)
            .to_string()
    }
}

impl LocaleFormatter for PosixLocale {
    fn short_time(&self, local: &NaiveDateTime) -> String {
        self.render(local, "%R")
    }

    fn long_time(&self, local: &NaiveDateTime) -> String {
        self.render(local, "%X")
    }

    fn short_date(&self, local: &NaiveDateTime) -> String {
        self.render(local, "%x")
    }

    fn default_date_time(&self, local: &NaiveDateTime) -> String {
        self.render(local, "%c")
    }

    fn month_name(&self, local: &NaiveDateTime) -> String {
        self.render(local, "%B")
    }

    fn weekday_name(&self, local: &NaiveDateTime) -> String {
        self.render(local, "%A")
    }
}

/// Resolve a locale tag. English tags map to [`EnUs`]; unknown tags fall back
/// to it with a warning.
pub fn resolve_locale(tag: &str) -> Box<dyn LocaleFormatter + Send + Sync> {
    let trimmed = tag.trim();
    if is_english_us(trimmed) {
        return Box::new(EnUs);
    }
    match PosixLocale::from_tag(trimmed) {
        Some(locale) => Box::new(locale),
        None => {
            tracing::warn!(tag = trimmed, "unknown locale, falling back to {DEFAULT_LOCALE_TAG}");
            Box::new(EnUs)
        }
    }
}

fn is_english_us(tag: &str) -> bool {
    tag.is_empty()
        || tag.eq_ignore_ascii_case("en")
        || tag.eq_ignore_ascii_case("en-US")
        || tag.eq_ignore_ascii_case("en_US")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(15, 4, 9)
            .unwrap()
    }

    #[test]
    fn en_us_patterns_match_browser_output() {
        let dt = sample();
        assert_eq!(EnUs.short_time(&dt), "03:04 PM");
        assert_eq!(EnUs.long_time(&dt), "03:04:09 PM");
        assert_eq!(EnUs.short_date(&dt), "3/5/2024");
        assert_eq!(EnUs.default_date_time(&dt), "3/5/2024, 3:04:09 PM");
        assert_eq!(EnUs.month_name(&dt), "March");
        assert_eq!(EnUs.weekday_name(&dt), "Tuesday");
    }

    #[test]
    fn posix_locale_uses_localized_names() {
        let de = PosixLocale::from_tag("de-DE").expect("de_DE is bundled");
        let dt = sample();
        assert_eq!(de.month_name(&dt), "März");
        assert_eq!(de.weekday_name(&dt), "Dienstag");
        assert_eq!(de.short_time(&dt), "15:04");
    }

    #[test]
    fn posix_locale_keeps_english_relative_phrases() {
        let de = PosixLocale::from_tag("de-DE").expect("de_DE is bundled");
        let phrase = de.relative_phrase(RelativeTime {
            value: -3,
            unit: crate::relative::RelativeUnit::Hour,
        });
        assert_eq!(phrase, "3 hours ago");
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert!(PosixLocale::from_tag("xx-NOPE").is_none());
    }

    #[test]
    fn resolve_locale_falls_back_to_en_us() {
        let dt = sample();
        assert_eq!(resolve_locale("xx-NOPE").short_date(&dt), "3/5/2024");
        assert_eq!(resolve_locale("en").short_date(&dt), "3/5/2024");
    }
}
