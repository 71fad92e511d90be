use anyhow::{bail, Context, Result};
use chatline_core::{
    build_entries, ListContext, ListStatus, Message, MessageOrder, TimelineAnnotations,
    TimelineGrouper,
};
use chatline_runtime_config::{ChatlineConfig, MessageOrderSetting, TimeZoneSetting};
use chrono::Utc;
use serde_json::Value;
use std::path::Path;

use crate::format_cmd::DisplayFormatter;
use crate::output::{render_text, OutputFormat, TimelineEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OrderArg {
    NewestFirst,
    OldestFirst,
}

impl From<OrderArg> for MessageOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::NewestFirst => MessageOrder::NewestFirst,
            OrderArg::OldestFirst => MessageOrder::OldestFirst,
        }
    }
}

pub struct TimelineOptions {
    pub window: Option<i64>,
    pub first_unread: Option<String>,
    pub order: Option<OrderArg>,
    pub authenticated: bool,
    pub has_more: bool,
    pub loading_older: bool,
    pub utc: bool,
    pub format: OutputFormat,
}

/// Accepts a JSON array, a `{"messages": [...]}` object, or one message per
/// line. Records that do not decode as a message are skipped. Only input that
/// is not JSON at all is an error.
pub fn parse_messages(content: &str) -> Result<Vec<Message>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let document = match serde_json::from_str::<Value>(trimmed) {
        Ok(document) => document,
        Err(_) => return parse_json_lines(content),
    };
    match document {
        Value::Array(records) => Ok(decode_records(records)),
        Value::Object(mut object) if object.contains_key("messages") => {
            match object.remove("messages") {
                Some(Value::Array(records)) => Ok(decode_records(records)),
                _ => bail!("\"messages\" must be an array"),
            }
        }
        record @ Value::Object(_) => Ok(decode_records(vec![record])),
        other => bail!("Expected an array of messages, found {}", json_kind(&other)),
    }
}

fn parse_json_lines(content: &str) -> Result<Vec<Message>> {
    let mut records = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Value = serde_json::from_str(line)
            .with_context(|| format!("Invalid message on line {}", lineno + 1))?;
        records.push(record);
    }
    Ok(decode_records(records))
}

fn decode_records(records: Vec<Value>) -> Vec<Message> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(position, record)| match serde_json::from_value::<Message>(record) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::debug!(position, error = %err, "skipping undecodable message record");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn message_order(config: &ChatlineConfig, flag: Option<OrderArg>) -> MessageOrder {
    match flag {
        Some(arg) => arg.into(),
        None => match config.timeline.message_order {
            MessageOrderSetting::NewestFirst => MessageOrder::NewestFirst,
            MessageOrderSetting::OldestFirst => MessageOrder::OldestFirst,
        },
    }
}

fn group_messages(
    config: &ChatlineConfig,
    messages: &[Message],
    opts: &TimelineOptions,
) -> TimelineAnnotations {
    let grouper = TimelineGrouper::new()
        .with_window_secs(opts.window.unwrap_or(config.timeline.sequential_window_secs))
        .with_order(message_order(config, opts.order));
    let first_unread = opts.first_unread.as_deref();
    if opts.utc || config.timestamps.time_zone == TimeZoneSetting::Utc {
        grouper.with_time_zone(Utc).group(messages, first_unread)
    } else {
        grouper.group(messages, first_unread)
    }
}

pub fn run_timeline(config: &ChatlineConfig, file: &Path, opts: TimelineOptions) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read messages from {}", file.display()))?;
    let messages = parse_messages(&content)
        .with_context(|| format!("Failed to parse messages in {}", file.display()))?;

    let annotations = group_messages(config, &messages, &opts);
    tracing::debug!(
        input = messages.len(),
        visible = annotations.len(),
        "grouped timeline"
    );

    let entries = build_entries(&annotations);
    let status = ListStatus::resolve(
        annotations.len(),
        ListContext {
            is_loaded: true,
            is_authenticated: opts.authenticated,
            has_more: opts.has_more,
            loading_older: opts.loading_older,
        },
    );

    match opts.format {
        OutputFormat::Json => {
            let envelope = TimelineEnvelope::new(status, &entries);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        OutputFormat::Text => {
            let formatter = DisplayFormatter::from_config(config, None, opts.utc);
            println!("{}", render_text(status, &entries, &formatter));
        }
    }
    Ok(())
}
