use super::recurrence::RecurrenceRule;
use chrono::{DateTime, Utc};

/// One `NAME;PARAM=VALUE:VALUE` line of an iCalendar component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub value: String,
}

impl RawProperty {
    /// Look up a parameter by name (case-insensitive)
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A decoded `BEGIN:<KIND>` ... `END:<KIND>` block, as handed over by the feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawComponent {
    /// Upper-cased component kind, e.g. `VEVENT`, `VTODO`
    pub kind: String,
    pub properties: Vec<RawProperty>,
    pub children: Vec<RawComponent>,
}

impl RawComponent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    /// Only `VEVENT` entries take part in shift extraction
    pub fn is_event(&self) -> bool {
        self.kind == "VEVENT"
    }

    /// First property with the given name
    pub fn property(&self, name: &str) -> Option<&RawProperty> {
        self.properties
            .iter()
            .find(|prop| prop.name.eq_ignore_ascii_case(name))
    }

    /// Builder-style helper, mostly for assembling components in tests
    pub fn with_property(mut self, name: &str, params: &[(&str, &str)], value: &str) -> Self {
        self.properties.push(RawProperty {
            name: name.to_ascii_uppercase(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_ascii_uppercase(), v.to_string()))
                .collect(),
            value: value.to_string(),
        });
        self
    }
}

/// Normalized calendar entry the shift engine works on
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub uid: String,
    pub summary: Option<String>,
    /// Template start; the occurrence itself for single events
    pub start: DateTime<Utc>,
    /// Template end; only its distance from `start` matters for recurring events
    pub end: DateTime<Utc>,
    pub recurrence: Option<RecurrenceRule>,
}

impl CalendarEvent {
    /// Template duration, shared by every occurrence
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}
