//! Flattened display rows and list chrome decisions.

use crate::grouping::{AnnotatedMessage, TimelineAnnotations};
use chrono::NaiveDate;
use serde::Serialize;

/// One row of the rendered timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    DayDivider { date: NaiveDate },
    UnreadDivider,
    Message(AnnotatedMessage),
}

/// Expand annotations into rows. When both dividers apply to one message the
/// unread divider comes first, then the day divider, then the message.
pub fn build_entries(annotations: &TimelineAnnotations) -> Vec<TimelineEntry> {
    let mut rows = Vec::with_capacity(annotations.len() + 2);
    for message in annotations {
        if message.annotation.show_unread_divider_before {
            rows.push(TimelineEntry::UnreadDivider);
        }
        if message.annotation.is_new_day {
            rows.push(TimelineEntry::DayDivider { date: message.date });
        }
        rows.push(TimelineEntry::Message(message.clone()));
    }
    rows
}

/// What the list shows around (or instead of) the messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListStatus {
    /// Messages were loaded and there are none.
    NoMessages,
    /// Nothing loaded yet; invite the viewer to sign in.
    LoginPrompt,
    Populated {
        show_start_of_conversation: bool,
        show_loading_older: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListContext {
    pub is_loaded: bool,
    pub is_authenticated: bool,
    pub has_more: bool,
    pub loading_older: bool,
}

impl ListStatus {
    pub fn resolve(visible_messages: usize, ctx: ListContext) -> Self {
        if visible_messages == 0 {
            return if ctx.is_loaded {
                Self::NoMessages
            } else {
                Self::LoginPrompt
            };
        }
        Self::Populated {
            show_start_of_conversation: !ctx.has_more && ctx.is_authenticated,
            show_loading_older: ctx.loading_older && ctx.is_authenticated,
        }
    }

    pub fn placeholder_text(&self) -> Option<&'static str> {
        match self {
            Self::NoMessages => Some("No messages"),
            Self::LoginPrompt => Some("Ready to chat? Login now to join the fun."),
            Self::Populated { .. } => None,
        }
    }
}
