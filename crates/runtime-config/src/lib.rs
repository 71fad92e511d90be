//! Runtime configuration for the chatline engine.
//!
//! Front ends read `chatline.toml` into these types and translate them into
//! engine builders. Missing keys take their defaults; values that cannot be
//! used are repaired by [`apply_compat_fallbacks`].

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "chatline.toml";

pub use chatline_core::DEFAULT_SEQUENTIAL_WINDOW_SECS;
pub use chatline_core::locale::DEFAULT_LOCALE_TAG as DEFAULT_LOCALE;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChatlineConfig {
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub timestamps: TimestampSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSettings {
    /// Maximum gap between two messages of one run.
    #[serde(default = "default_sequential_window_secs", alias = "grouping_range")]
    pub sequential_window_secs: i64,
    #[serde(default)]
    pub message_order: MessageOrderSetting,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            sequential_window_secs: DEFAULT_SEQUENTIAL_WINDOW_SECS,
            message_order: MessageOrderSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrderSetting {
    #[default]
    #[serde(alias = "newest-first", alias = "desc")]
    NewestFirst,
    #[serde(alias = "oldest-first", alias = "asc")]
    OldestFirst,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimestampSettings {
    /// Locale tag such as `en-US` or `de-DE`.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Selector code (`t`, `T`, `d`, `D`, `f`, `F`, `R`) or selector name.
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default)]
    pub time_zone: TimeZoneSetting,
}

impl Default for TimestampSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            default_format: default_format(),
            time_zone: TimeZoneSetting::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeZoneSetting {
    /// The host's configured zone.
    #[default]
    #[serde(alias = "system")]
    Local,
    #[serde(alias = "UTC", alias = "gmt")]
    Utc,
    /// Unknown values are normalized by compatibility fallbacks.
    #[serde(other)]
    Unknown,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_sequential_window_secs() -> i64 {
    DEFAULT_SEQUENTIAL_WINDOW_SECS
}
fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}
fn default_format() -> String {
    "default".to_string()
}

/// Repair values that parsed but cannot be used.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut ChatlineConfig) -> bool {
    let mut changed = false;

    if config.timestamps.time_zone == TimeZoneSetting::Unknown {
        config.timestamps.time_zone = TimeZoneSetting::Local;
        changed = true;
    }

    if config.timestamps.locale.trim().is_empty() {
        config.timestamps.locale = default_locale();
        changed = true;
    }

    if config.timestamps.default_format.trim().is_empty() {
        config.timestamps.default_format = default_format();
        changed = true;
    }

    if config.timeline.sequential_window_secs < 0 {
        config.timeline.sequential_window_secs = DEFAULT_SEQUENTIAL_WINDOW_SECS;
        changed = true;
    }

    changed
}

/// Parse `chatline.toml` contents and apply fallbacks.
pub fn parse_config(content: &str) -> Result<ChatlineConfig, toml::de::Error> {
    let mut config: ChatlineConfig = toml::from_str(content)?;
    apply_compat_fallbacks(&mut config);
    Ok(config)
}
