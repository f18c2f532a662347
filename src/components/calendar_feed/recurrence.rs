use crate::error::{recurrence_error, BoardResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rrule::{RRuleSet, Tz};

/// Upper bound on occurrences produced by one window query
pub const MAX_OCCURRENCES: u16 = 1000;

/// Recurrence rule as the feed delivers it.
///
/// The rule is anchored on the template's wall-clock digits with the zone
/// label stripped (they are read as UTC). Generated occurrences therefore
/// carry the same systematic offset the feed does, which is what the shift
/// engine's drift correction undoes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// RRULE value, e.g. `FREQ=WEEKLY;BYDAY=MO,WE`
    pub rule: String,
    /// Template start as written in the feed, zone dropped
    pub wall_start: NaiveDateTime,
}

impl RecurrenceRule {
    pub fn new(rule: impl Into<String>, wall_start: NaiveDateTime) -> Self {
        Self {
            rule: rule.into(),
            wall_start,
        }
    }

    /// Occurrences within the closed interval `[window_start, window_end]`, ascending
    pub fn between(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoardResult<Vec<DateTime<Utc>>> {
        if window_end < window_start {
            return Ok(Vec::new());
        }

        let rule_text = self
            .rule
            .trim()
            .trim_start_matches("RRULE:")
            .trim_start_matches("rrule:");
        let source = format!(
            "DTSTART:{}\nRRULE:{}",
            self.wall_start.format("%Y%m%dT%H%M%SZ"),
            anchor_until(rule_text)
        );

        let rrule_set = source
            .parse::<RRuleSet>()
            .map_err(|e| recurrence_error(&format!("Invalid RRULE '{}': {}", rule_text, e)))?;

        // Pad by a second on each side and filter below, so the result is a
        // closed interval whatever the crate's own boundary semantics are.
        let padded_start = (window_start - Duration::seconds(1)).with_timezone(&Tz::UTC);
        let padded_end = (window_end + Duration::seconds(1)).with_timezone(&Tz::UTC);

        let result = rrule_set
            .after(padded_start)
            .before(padded_end)
            .all(MAX_OCCURRENCES);

        let mut occurrences: Vec<DateTime<Utc>> = result
            .dates
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc))
            .filter(|dt| *dt >= window_start && *dt <= window_end)
            .collect();
        occurrences.sort();
        occurrences.dedup();

        Ok(occurrences)
    }
}

/// Move a floating or date-only `UNTIL` into the UTC-labeled anchor frame.
///
/// A date-only bound covers its whole day. A `...Z` bound is left as written.
fn anchor_until(rule: &str) -> String {
    rule.split(';')
        .map(|part| {
            let Some((key, value)) = part.split_once('=') else {
                return part.to_string();
            };
            if !key.trim().eq_ignore_ascii_case("UNTIL") {
                return part.to_string();
            }

            let value = value.trim();
            if value.len() == 8 && value.chars().all(|c| c.is_ascii_digit()) {
                format!("{}={}T235959Z", key, value)
            } else if value.contains(['T', 't']) && !value.ends_with(['Z', 'z']) {
                format!("{}={}Z", key, value)
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}
