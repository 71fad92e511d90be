//! Per-message timeline annotations.
//!
//! A grouping pass filters thread replies and malformed records, puts the
//! remaining messages in chronological order, then makes one indexed pass
//! that looks at the immediate neighbours of each message:
//!
//! - a message starts a new day when its local date differs from the
//!   previous message's date (the first message always starts one);
//! - a message is sequential when the previous message has the same sender,
//!   is at most `window` older, and no day boundary lies between them;
//! - a sequential message is the last of its run when the next message does
//!   not continue it;
//! - the message whose id equals `first_unread_id` gets the unread divider.
//!
//! Each call is self-contained. Nothing is cached between passes.

use crate::message::Message;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SEQUENTIAL_WINDOW_SECS: i64 = 300;

/// Order in which the caller supplies messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageOrder {
    /// Store order: most recent message first.
    #[default]
    NewestFirst,
    OldestFirst,
}

impl MessageOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewestFirst => "newest-first",
            Self::OldestFirst => "oldest-first",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Annotation {
    pub is_new_day: bool,
    /// Continues the previous message's run; render without a sender header.
    pub is_sequential: bool,
    /// Sequential, and the run stops right after this message.
    pub is_last_of_run: bool,
    pub show_unread_divider_before: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedMessage {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Calendar date in the grouping time zone.
    pub date: NaiveDate,
    pub annotation: Annotation,
}

/// Result of one grouping pass: annotations in display order (oldest first)
/// with lookup by message id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimelineAnnotations {
    entries: Vec<AnnotatedMessage>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl TimelineAnnotations {
    fn from_entries(entries: Vec<AnnotatedMessage>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(pos, entry)| (entry.id.clone(), pos))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.index.get(id).map(|&pos| &self.entries[pos].annotation)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotatedMessage> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[AnnotatedMessage] {
        &self.entries
    }

    /// Id of the message carrying the unread divider, if any.
    pub fn unread_marker(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.annotation.show_unread_divider_before)
            .map(|entry| entry.id.as_str())
    }

    pub fn into_map(self) -> HashMap<String, Annotation> {
        self.entries
            .into_iter()
            .map(|entry| (entry.id, entry.annotation))
            .collect()
    }
}

impl<'a> IntoIterator for &'a TimelineAnnotations {
    type Item = &'a AnnotatedMessage;
    type IntoIter = std::slice::Iter<'a, AnnotatedMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone)]
pub struct TimelineGrouper<Tz = Local>
where
    Tz: TimeZone,
{
    window: Duration,
    order: MessageOrder,
    time_zone: Tz,
}

impl TimelineGrouper {
    /// 300 second window, newest-first input, system time zone.
    pub fn new() -> Self {
        Self {
            window: Duration::seconds(DEFAULT_SEQUENTIAL_WINDOW_SECS),
            order: MessageOrder::default(),
            time_zone: Local,
        }
    }
}

impl Default for TimelineGrouper {
    fn default() -> Self {
        Self::new()
    }
}

/// A message that survived filtering.
struct Visible<'a> {
    id: &'a str,
    sender: Option<&'a str>,
    at: DateTime<Utc>,
    date: NaiveDate,
}

impl<Tz: TimeZone> TimelineGrouper<Tz> {
    /// Negative windows are treated as zero.
    pub fn with_window_secs(mut self, seconds: i64) -> Self {
        self.window = Duration::try_seconds(seconds.max(0)).unwrap_or(Duration::MAX);
        self
    }

    pub fn with_order(mut self, order: MessageOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_time_zone<Tz2: TimeZone>(self, time_zone: Tz2) -> TimelineGrouper<Tz2> {
        TimelineGrouper {
            window: self.window,
            order: self.order,
            time_zone,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn order(&self) -> MessageOrder {
        self.order
    }

    pub fn group(
        &self,
        messages: &[Message],
        first_unread_id: Option<&str>,
    ) -> TimelineAnnotations {
        let visible = self.visible_in_display_order(messages);
        let first_unread_id = first_unread_id.map(str::trim).filter(|id| !id.is_empty());
        let mut unread_placed = false;

        let mut entries = Vec::with_capacity(visible.len());
        for (i, current) in visible.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| &visible[p]);
            let next = visible.get(i + 1);

            let is_new_day = prev.is_none_or(|prev| prev.date != current.date);
            let is_sequential = prev.is_some_and(|prev| self.continues(prev, current));
            let is_last_of_run =
                is_sequential && !next.is_some_and(|next| self.continues(current, next));

            let show_unread_divider_before =
                !unread_placed && first_unread_id.is_some_and(|unread| unread == current.id);
            unread_placed |= show_unread_divider_before;

            entries.push(AnnotatedMessage {
                id: current.id.to_string(),
                sender_id: current.sender.map(str::to_string),
                timestamp: current.at,
                date: current.date,
                annotation: Annotation {
                    is_new_day,
                    is_sequential,
                    is_last_of_run,
                    show_unread_divider_before,
                },
            });
        }

        if let Some(unread) = first_unread_id {
            if !unread_placed {
                tracing::debug!(unread, "first unread message is not in the visible timeline");
            }
        }

        TimelineAnnotations::from_entries(entries)
    }

    /// `next` continues the run that `prev` belongs to.
    fn continues(&self, prev: &Visible<'_>, next: &Visible<'_>) -> bool {
        let same_sender = matches!((prev.sender, next.sender), (Some(a), Some(b)) if a == b);
        same_sender && prev.date == next.date && next.at - prev.at <= self.window
    }

    fn visible_in_display_order<'a>(&self, messages: &'a [Message]) -> Vec<Visible<'a>> {
        let mut visible: Vec<Visible<'a>> = messages
            .iter()
            .enumerate()
            .filter(|(_, message)| !message.is_thread_reply())
            .filter_map(|(position, message)| self.visible(position, message))
            .collect();
        if self.order == MessageOrder::NewestFirst {
            visible.reverse();
        }
        visible
    }

    fn visible<'a>(&self, position: usize, message: &'a Message) -> Option<Visible<'a>> {
        let Some(id) = message.id() else {
            tracing::debug!(position, "skipping message without id");
            return None;
        };
        let Some(raw) = message.timestamp.as_ref() else {
            tracing::debug!(position, id, "skipping message without timestamp");
            return None;
        };
        let at = match raw.to_datetime() {
            Ok(at) => at,
            Err(err) => {
                tracing::debug!(position, id, error = %err, "skipping message with bad timestamp");
                return None;
            }
        };
        Some(Visible {
            id,
            sender: message.sender(),
            at,
            date: at.with_timezone(&self.time_zone).date_naive(),
        })
    }
}

/// Group with the system time zone and newest-first input.
pub fn group(
    messages: &[Message],
    sequential_window_secs: i64,
    first_unread_id: Option<&str>,
) -> TimelineAnnotations {
    TimelineGrouper::new()
        .with_window_secs(sequential_window_secs)
        .group(messages, first_unread_id)
}
