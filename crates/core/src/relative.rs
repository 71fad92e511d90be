//! Relative-time unit selection ("3 hours ago", "in 2 days").
//!
//! Sub-month units cascade from the rounded second delta. The month delta is
//! the month-of-year difference in the display zone. It ignores both the day
//! of month and the year, so it always lies within ±11 and the year branch is
//! never taken. A target 29 days ahead that crosses a month boundary reports
//! "in 1 month"; one that crosses a year boundary reports "11 months ago".

use chrono::{DateTime, Datelike, TimeZone};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl RelativeUnit {
    pub fn singular(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Second => "seconds",
            Self::Minute => "minutes",
            Self::Hour => "hours",
            Self::Day => "days",
            Self::Week => "weeks",
            Self::Month => "months",
            Self::Year => "years",
        }
    }
}

/// A signed amount of one unit. Negative values are in the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelativeTime {
    pub value: i64,
    pub unit: RelativeUnit,
}

impl RelativeTime {
    pub fn is_now(&self) -> bool {
        self.value == 0
    }

    pub fn is_past(&self) -> bool {
        self.value < 0
    }
}

const SECONDS_LIMIT: i64 = 60;
const MINUTES_LIMIT: i64 = 60;
const HOURS_LIMIT: i64 = 24;
const DAYS_LIMIT: i64 = 7;
const WEEKS_LIMIT: i64 = 4;
const MONTHS_LIMIT: i64 = 12;

/// Pick the finest unit whose rounded magnitude stays below its rollover
/// limit. Limits are exclusive: exactly 60 seconds is one minute.
pub fn relative_time<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> RelativeTime {
    let delta_ms = target.timestamp_millis() - now.timestamp_millis();

    let seconds = round_half_up(delta_ms as f64 / 1000.0);
    if seconds.abs() < SECONDS_LIMIT {
        return RelativeTime {
            value: seconds,
            unit: RelativeUnit::Second,
        };
    }
    let minutes = round_half_up(seconds as f64 / 60.0);
    if minutes.abs() < MINUTES_LIMIT {
        return RelativeTime {
            value: minutes,
            unit: RelativeUnit::Minute,
        };
    }
    let hours = round_half_up(minutes as f64 / 60.0);
    if hours.abs() < HOURS_LIMIT {
        return RelativeTime {
            value: hours,
            unit: RelativeUnit::Hour,
        };
    }
    let days = round_half_up(hours as f64 / 24.0);
    if days.abs() < DAYS_LIMIT {
        return RelativeTime {
            value: days,
            unit: RelativeUnit::Day,
        };
    }
    let weeks = round_half_up(days as f64 / 7.0);
    if weeks.abs() < WEEKS_LIMIT {
        return RelativeTime {
            value: weeks,
            unit: RelativeUnit::Week,
        };
    }
    let months = i64::from(target.month0()) - i64::from(now.month0());
    if months.abs() < MONTHS_LIMIT {
        return RelativeTime {
            value: months,
            unit: RelativeUnit::Month,
        };
    }
    RelativeTime {
        value: i64::from(target.year()) - i64::from(now.year()),
        unit: RelativeUnit::Year,
    }
}

/// English phrasing: "3 hours ago", "in 1 minute", "just now".
pub fn english_phrase(relative: RelativeTime) -> String {
    if relative.is_now() {
        return "just now".to_string();
    }
    let amount = relative.value.unsigned_abs();
    let unit = if amount == 1 {
        relative.unit.singular()
    } else {
        relative.unit.plural()
    };
    if relative.is_past() {
        format!("{amount} {unit} ago")
    } else {
        format!("in {amount} {unit}")
    }
}

/// Round to the nearest integer, halves toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
