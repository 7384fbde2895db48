use serde::{Deserialize, Serialize};

/// A single chronological event — the engine's immutable input.
///
/// Timestamps are epoch milliseconds. Date parsing and validation happen
/// upstream (see `chronocard-core::input`); by the time an event reaches
/// the engine its timestamp is a plain finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Stable identifier, unique within one layout call.
    pub id: String,
    /// Epoch milliseconds.
    pub ts: f64,
    /// Display title.
    pub title: String,
    /// Optional longer text, shown on full cards only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TimelineEvent {
    pub fn new(id: impl Into<String>, ts: f64, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ts,
            title: title.into(),
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_omitted_when_absent() {
        let ev = TimelineEvent::new("e1", 1_000.0, "launch");
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("description"));
    }

    #[test]
    fn roundtrips_with_description() {
        let mut ev = TimelineEvent::new("e2", 2_000.0, "landing");
        ev.description = Some("touched down".into());
        let json = serde_json::to_string(&ev).unwrap();
        let back: TimelineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }
}
