use super::ics::unescape_text;
use super::models::{CalendarEvent, RawComponent, RawProperty};
use super::recurrence::RecurrenceRule;
use crate::utils::time::{localize, resolve_zone};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// A decoded DTSTART/DTEND value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedTime {
    /// The instant the feed means, with its zone honoured
    pub instant: DateTime<Utc>,
    /// The digits as written, zone dropped
    pub wall: NaiveDateTime,
}

/// Normalize a raw component into a [`CalendarEvent`].
///
/// Returns `None` for anything that is not a usable VEVENT: other component
/// kinds, modified single occurrences (`RECURRENCE-ID`), and events with a
/// missing or unreadable start or an end before the start.
pub fn to_calendar_event(key: &str, raw: &RawComponent, zone: &Tz) -> Option<CalendarEvent> {
    if !raw.is_event() {
        return None;
    }

    if raw.property("RECURRENCE-ID").is_some() {
        debug!("Skipping overridden occurrence {}", key);
        return None;
    }

    let Some(start) = raw.property("DTSTART").and_then(|p| decode_time(p, zone)) else {
        warn!("Skipping event {} without a readable DTSTART", key);
        return None;
    };

    let end = match raw.property("DTEND") {
        Some(prop) => match decode_time(prop, zone) {
            Some(end) => end.instant,
            None => {
                warn!("Skipping event {} with an unreadable DTEND", key);
                return None;
            }
        },
        None => {
            let duration = raw
                .property("DURATION")
                .and_then(|p| parse_duration(&p.value))
                .unwrap_or_else(Duration::zero);
            start.instant + duration
        }
    };

    if end < start.instant {
        warn!("Skipping event {} that ends before it starts", key);
        return None;
    }

    let uid = raw
        .property("UID")
        .map(|p| p.value.clone())
        .unwrap_or_else(|| key.to_string());

    let summary = raw
        .property("SUMMARY")
        .map(|p| unescape_text(&p.value))
        .filter(|s| !s.trim().is_empty());

    let recurrence = raw
        .property("RRULE")
        .map(|p| RecurrenceRule::new(p.value.trim(), start.wall));

    Some(CalendarEvent {
        uid,
        summary,
        start: start.instant,
        end,
        recurrence,
    })
}

/// Decode a date or date-time property.
///
/// `...Z` values are UTC, `TZID=` values are read in that zone, and floating
/// values and `VALUE=DATE` days are read in the target zone.
pub fn decode_time(prop: &RawProperty, zone: &Tz) -> Option<DecodedTime> {
    let value = prop.value.trim();
    let is_date = prop
        .param("VALUE")
        .map(|v| v.eq_ignore_ascii_case("DATE"))
        .unwrap_or(false)
        || (value.len() == 8 && !value.contains('T'));

    if is_date {
        let wall = NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?;
        let instant = localize(zone, &wall)?.with_timezone(&Utc);
        return Some(DecodedTime { instant, wall });
    }

    if let Some(utc_digits) = value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        let wall = NaiveDateTime::parse_from_str(utc_digits, "%Y%m%dT%H%M%S").ok()?;
        let instant = Utc.from_utc_datetime(&wall);
        return Some(DecodedTime { instant, wall });
    }

    let wall = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    let source_zone = match prop.param("TZID") {
        Some(tzid) => resolve_zone(tzid).unwrap_or_else(|| {
            warn!("Unknown TZID '{}', reading it as {}", tzid, zone.name());
            *zone
        }),
        None => *zone,
    };
    let instant = localize(&source_zone, &wall)?.with_timezone(&Utc);
    Some(DecodedTime { instant, wall })
}

/// Parse an RFC 5545 duration such as `PT4H`, `P1DT30M` or `-P1W`
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for ch in rest.chars() {
        match ch {
            '0'..='9' => number.push(ch),
            'T' if !in_time && number.is_empty() => in_time = true,
            'W' | 'D' | 'H' | 'M' | 'S' => {
                let amount: i64 = number.parse().ok()?;
                number.clear();
                total += match (ch, in_time) {
                    ('W', false) => Duration::weeks(amount),
                    ('D', false) => Duration::days(amount),
                    ('H', true) => Duration::hours(amount),
                    ('M', true) => Duration::minutes(amount),
                    ('S', true) => Duration::seconds(amount),
                    _ => return None,
                };
                saw_component = true;
            }
            _ => return None,
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }

    Some(if negative { -total } else { total })
}
