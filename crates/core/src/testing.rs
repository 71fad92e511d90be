use crate::Message;
use chrono::{DateTime, TimeZone, Utc};

/// UTC instant from calendar fields.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("valid test datetime")
}

/// Top-level message with all required fields.
pub fn message(id: &str, sender: &str, timestamp: DateTime<Utc>) -> Message {
    Message::new(id, timestamp, sender)
}

/// Messages from one sender spaced `gap_secs` apart, oldest first.
pub fn burst(
    prefix: &str,
    sender: &str,
    start: DateTime<Utc>,
    count: usize,
    gap_secs: i64,
) -> Vec<Message> {
    (0..count)
        .map(|n| {
            let offset = chrono::Duration::seconds(gap_secs * n as i64);
            message(&format!("{prefix}{}", n + 1), sender, start + offset)
        })
        .collect()
}
