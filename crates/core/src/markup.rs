//! Inline timestamp tokens in message text: `<t:1709651049:R>`.
//!
//! The code after the second colon is a [`FormatSelector`] code. A token
//! without one renders as [`FormatSelector::FullDateTimeWithZone`].

use crate::clock::Clock;
use crate::timestamp::{FormatSelector, TimestampFormatter};
use chrono::TimeZone;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<t:([^:>\s]+)(?::([^:>\s]+))?>").expect("timestamp token regex should compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampMarkup {
    /// Epoch seconds as written in the token. Validated when rendering.
    pub timestamp: String,
    pub selector: FormatSelector,
}

impl TimestampMarkup {
    /// Parse a single token. The whole input must be the token.
    pub fn parse(token: &str) -> Option<Self> {
        let caps = TOKEN_RE.captures(token.trim())?;
        let whole = caps.get(0)?;
        if whole.as_str().len() != token.trim().len() {
            return None;
        }
        Some(Self::from_captures(&caps))
    }

    fn from_captures(caps: &Captures<'_>) -> Self {
        let selector = caps
            .get(2)
            .map(|code| FormatSelector::from_code(code.as_str()))
            .unwrap_or(FormatSelector::FullDateTimeWithZone);
        Self {
            timestamp: caps[1].to_string(),
            selector,
        }
    }

    /// Rendered text, or `None` when the timestamp is not a valid instant.
    pub fn render<C: Clock, Tz: TimeZone>(
        &self,
        formatter: &TimestampFormatter<C, Tz>,
    ) -> Option<String> {
        match formatter.format_raw(&self.timestamp, self.selector) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(token = %self.timestamp, error = %err, "skipping timestamp token");
                None
            }
        }
    }
}

/// All tokens in `text`, in order of appearance.
pub fn find_markup(text: &str) -> Vec<TimestampMarkup> {
    TOKEN_RE
        .captures_iter(text)
        .map(|caps| TimestampMarkup::from_captures(&caps))
        .collect()
}

/// Replace every renderable token in `text`. Tokens with invalid timestamps
/// are left as written.
pub fn render_markup_text<C: Clock, Tz: TimeZone>(
    text: &str,
    formatter: &TimestampFormatter<C, Tz>,
) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures<'_>| {
            TimestampMarkup::from_captures(caps)
                .render(formatter)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Utc;

    fn formatter() -> TimestampFormatter<FixedClock, Utc> {
        TimestampFormatter::new()
            .with_clock(FixedClock(Utc.timestamp_opt(1_709_651_049, 0).unwrap()))
            .with_time_zone(Utc)
    }

    #[test]
    fn parse_reads_timestamp_and_code() {
        let markup = TimestampMarkup::parse("<t:1709651049:R>").expect("token");
        assert_eq!(markup.timestamp, "1709651049");
        assert_eq!(markup.selector, FormatSelector::Relative);
    }

    #[test]
    fn parse_without_code_uses_full_date() {
        let markup = TimestampMarkup::parse("<t:1709651049>").expect("token");
        assert_eq!(markup.selector, FormatSelector::FullDateTimeWithZone);
    }

    #[test]
    fn parse_rejects_surrounding_text() {
        assert!(TimestampMarkup::parse("see <t:1709651049:R>").is_none());
        assert!(TimestampMarkup::parse("<x:1709651049:R>").is_none());
    }

    #[test]
    fn unknown_code_renders_default() {
        let markup = TimestampMarkup::parse("<t:1709651049:Q>").unwrap();
        assert_eq!(markup.selector, FormatSelector::Default);
        assert_eq!(markup.render(&formatter()).unwrap(), "3/5/2024, 3:04:09 PM");
    }

    #[test]
    fn invalid_timestamp_renders_nothing() {
        let markup = TimestampMarkup::parse("<t:soon:R>").unwrap();
        assert_eq!(markup.render(&formatter()), None);
    }

    #[test]
    fn render_text_replaces_valid_tokens_only() {
        let text = "due <t:1709647449:R>, posted <t:1709651049:d>, bad <t:abc:t>";
        assert_eq!(
            render_markup_text(text, &formatter()),
            "due 1 hour ago, posted 3/5/2024, bad <t:abc:t>"
        );
        assert_eq!(find_markup(text).len(), 3);
    }
}
