use chatline_core::{FormatSelector, ListStatus, TimelineEntry};
use chrono::NaiveDate;

use crate::format_cmd::DisplayFormatter;

/// Output format for timeline data.
#[derive(Debug, Clone, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Structured output envelope for `--format json`.
#[derive(Debug, serde::Serialize)]
pub struct TimelineEnvelope<'a> {
    pub version: &'static str,
    pub status: ListStatus,
    pub entries: &'a [TimelineEntry],
}

impl<'a> TimelineEnvelope<'a> {
    pub fn new(status: ListStatus, entries: &'a [TimelineEntry]) -> Self {
        Self {
            version: "0.1",
            status,
            entries,
        }
    }
}

const SENDER_COLUMN: usize = 12;

/// Plain-text rendering: one line per row, sender shown only at run starts.
pub fn render_text(
    status: ListStatus,
    entries: &[TimelineEntry],
    formatter: &DisplayFormatter,
) -> String {
    let mut lines = Vec::new();

    if let Some(placeholder) = status.placeholder_text() {
        lines.push(placeholder.to_string());
        return lines.join("\n");
    }
    if let ListStatus::Populated {
        show_start_of_conversation,
        show_loading_older,
    } = status
    {
        if show_loading_older {
            lines.push("… loading older messages".to_string());
        }
        if show_start_of_conversation {
            lines.push("Start of conversation".to_string());
        }
    }

    for entry in entries {
        match entry {
            TimelineEntry::DayDivider { date } => lines.push(divider(&day_label(*date))),
            TimelineEntry::UnreadDivider => lines.push(divider("Unread Messages")),
            TimelineEntry::Message(message) => {
                let time = formatter.format_datetime(&message.timestamp, FormatSelector::ShortTime);
                let sender = if message.annotation.is_sequential {
                    String::new()
                } else {
                    message.sender_id.clone().unwrap_or_else(|| "?".to_string())
                };
                let tail = if message.annotation.is_last_of_run { " ┘" } else { "" };
                lines.push(format!(
                    "{:<width$} {time}  {}{tail}",
                    truncate(&sender, SENDER_COLUMN),
                    message.id,
                    width = SENDER_COLUMN
                ));
            }
        }
    }
    lines.join("\n")
}

fn day_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn divider(label: &str) -> String {
    format!("──── {label} ────")
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("alice", 12), "alice");
        assert_eq!(truncate("a-very-long-sender-name", 8), "a-very-…");
    }

    #[test]
    fn day_label_is_long_english_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(day_label(date), "Tuesday, March 5, 2024");
    }

    #[test]
    fn empty_status_renders_placeholder_only() {
        let formatter = DisplayFormatter::from_config(&Default::default(), None, true);
        let text = render_text(ListStatus::NoMessages, &[], &formatter);
        assert_eq!(text, "No messages");
    }
}
