use anyhow::{Context, Result};
use chatline_core::markup::render_markup_text;
use chatline_core::{resolve_locale, FormatError, FormatSelector, SystemClock, TimestampFormatter};
use chatline_runtime_config::{ChatlineConfig, TimeZoneSetting};
use chrono::{DateTime, Local, Utc};

pub struct FormatOptions {
    pub style: Option<String>,
    pub locale: Option<String>,
    pub utc: bool,
}

/// Formatter in the zone picked by flags/config.
pub enum DisplayFormatter {
    Local(TimestampFormatter<SystemClock, Local>),
    Utc(TimestampFormatter<SystemClock, Utc>),
}

impl DisplayFormatter {
    pub fn from_config(config: &ChatlineConfig, locale: Option<&str>, force_utc: bool) -> Self {
        let tag = locale.unwrap_or(&config.timestamps.locale);
        let base = TimestampFormatter::new().with_boxed_locale(resolve_locale(tag));
        if force_utc || config.timestamps.time_zone == TimeZoneSetting::Utc {
            Self::Utc(base.with_time_zone(Utc))
        } else {
            Self::Local(base)
        }
    }

    pub fn format_raw(&self, raw: &str, selector: FormatSelector) -> Result<String, FormatError> {
        match self {
            Self::Local(f) => f.format_raw(raw, selector),
            Self::Utc(f) => f.format_raw(raw, selector),
        }
    }

    pub fn format_datetime(&self, instant: &DateTime<Utc>, selector: FormatSelector) -> String {
        match self {
            Self::Local(f) => f.format_datetime(instant, selector),
            Self::Utc(f) => f.format_datetime(instant, selector),
        }
    }

    pub fn render_markup(&self, text: &str) -> String {
        match self {
            Self::Local(f) => render_markup_text(text, f),
            Self::Utc(f) => render_markup_text(text, f),
        }
    }
}

pub fn run_format(config: &ChatlineConfig, timestamp: &str, opts: FormatOptions) -> Result<()> {
    let code = opts
        .style
        .as_deref()
        .unwrap_or(&config.timestamps.default_format);
    let selector = FormatSelector::from_code(code);
    let formatter = DisplayFormatter::from_config(config, opts.locale.as_deref(), opts.utc);
    let text = formatter
        .format_raw(timestamp, selector)
        .with_context(|| format!("Cannot format timestamp {timestamp:?}"))?;
    println!("{text}");
    Ok(())
}

pub fn run_markup(config: &ChatlineConfig, text: &str, opts: FormatOptions) -> Result<()> {
    let formatter = DisplayFormatter::from_config(config, opts.locale.as_deref(), opts.utc);
    println!("{}", formatter.render_markup(text));
    Ok(())
}
