use chrono::DateTime;
use serde::Deserialize;
use thiserror::Error;

use chronocard_protocol::TimelineEvent;

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("invalid events JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event {id}: unparsable date {date:?}")]
    Date { id: String, date: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    /// Epoch milliseconds.
    Millis(f64),
    /// RFC 3339 date-time string.
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: String,
    date: RawDate,
    title: String,
    #[serde(default)]
    description: Option<String>,
}

/// Parse a JSON array of events into the engine's input representation.
///
/// Dates are accepted either as epoch milliseconds or as RFC 3339
/// strings; either way they are normalized to milliseconds here, so the
/// engine core never sees an unparsed date. Duplicate ids are allowed —
/// they only participate in sort tie-breaking.
pub fn parse_events(data: &[u8]) -> Result<Vec<TimelineEvent>, EventParseError> {
    let raw: Vec<RawEvent> = serde_json::from_slice(data)?;
    let mut events = Vec::with_capacity(raw.len());
    for entry in raw {
        let ts = match entry.date {
            RawDate::Millis(ms) => ms,
            RawDate::Text(ref text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.timestamp_millis() as f64)
                .map_err(|_| EventParseError::Date {
                    id: entry.id.clone(),
                    date: text.clone(),
                })?,
        };
        events.push(TimelineEvent {
            id: entry.id,
            ts,
            title: entry.title,
            description: entry.description,
        });
    }
    Ok(events)
}
