use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Windows zone names Outlook/Exchange put in TZID, mapped to IANA
const WINDOWS_ZONES: &[(&str, Tz)] = &[
    ("Eastern Standard Time", Tz::America__New_York),
    ("US Eastern Standard Time", Tz::America__Indiana__Indianapolis),
    ("Central Standard Time", Tz::America__Chicago),
    ("Mountain Standard Time", Tz::America__Denver),
    ("US Mountain Standard Time", Tz::America__Phoenix),
    ("Pacific Standard Time", Tz::America__Los_Angeles),
    ("Alaskan Standard Time", Tz::America__Anchorage),
    ("Hawaiian Standard Time", Tz::Pacific__Honolulu),
    ("Atlantic Standard Time", Tz::America__Halifax),
    ("GMT Standard Time", Tz::Europe__London),
    ("Greenwich Standard Time", Tz::Atlantic__Reykjavik),
    ("W. Europe Standard Time", Tz::Europe__Berlin),
    ("Central Europe Standard Time", Tz::Europe__Budapest),
    ("Central European Standard Time", Tz::Europe__Warsaw),
    ("Romance Standard Time", Tz::Europe__Paris),
    ("FLE Standard Time", Tz::Europe__Helsinki),
    ("India Standard Time", Tz::Asia__Kolkata),
    ("China Standard Time", Tz::Asia__Shanghai),
    ("Tokyo Standard Time", Tz::Asia__Tokyo),
    ("AUS Eastern Standard Time", Tz::Australia__Sydney),
    ("UTC", Tz::UTC),
];

/// Display names such as `(UTC-05:00) Eastern Time (US & Canada)`
const DISPLAY_ZONES: &[(&str, Tz)] = &[
    ("Eastern Time (US & Canada)", Tz::America__New_York),
    ("Central Time (US & Canada)", Tz::America__Chicago),
    ("Mountain Time (US & Canada)", Tz::America__Denver),
    ("Pacific Time (US & Canada)", Tz::America__Los_Angeles),
];

/// Resolve a TZID parameter to a zone, accepting IANA and Windows names
pub fn resolve_zone(tzid: &str) -> Option<Tz> {
    let tzid = tzid.trim().trim_matches('"');
    if let Ok(tz) = tzid.parse::<Tz>() {
        return Some(tz);
    }

    if let Some((_, tz)) = WINDOWS_ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tzid))
    {
        return Some(*tz);
    }

    DISPLAY_ZONES
        .iter()
        .find(|(name, _)| tzid.ends_with(name))
        .map(|(_, tz)| *tz)
}

/// Interpret wall-clock fields in a zone.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// spring-forward gap are pushed forward by the gap.
pub fn localize(tz: &Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            let shifted = *naive + Duration::hours(1);
            tz.from_local_datetime(&shifted).earliest()
        }
    }
}

/// Local midnight of a calendar date in a zone
pub fn start_of_day(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    localize(tz, &date.and_hms_opt(0, 0, 0)?)
}

/// Render as a 12-hour clock, e.g. `2:00 PM`
pub fn format_clock(dt: &DateTime<Tz>) -> String {
    dt.format("%-I:%M %p").to_string()
}
