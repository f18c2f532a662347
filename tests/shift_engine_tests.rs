use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::America::New_York;
use shiftboard::components::calendar_feed::{decode_calendar, to_calendar_event};
use shiftboard::components::shifts::{
    DayWindows, EarlyHourReassignment, NoCorrection, ShiftBuckets, ShiftEngine, UtcDigitsAsLocal,
};
use shiftboard::components::shifts::correction::DriftCorrection;
use std::sync::Arc;

/// A week of help-desk shifts the way an Outlook calendar publishes them
const FEED: &str = "BEGIN:VCALENDAR\r
PRODID:Microsoft Exchange Server 2010\r
VERSION:2.0\r
BEGIN:VTIMEZONE\r
TZID:Eastern Standard Time\r
BEGIN:STANDARD\r
DTSTART:16010101T020000\r
TZOFFSETFROM:-0400\r
TZOFFSETTO:-0500\r
END:STANDARD\r
END:VTIMEZONE\r
BEGIN:VEVENT\r
UID:desk-daily\r
SUMMARY:Morning Desk\r
DTSTART:20240110T140000Z\r
DTEND:20240110T180000Z\r
RRULE:FREQ=DAILY\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:standup-weekly\r
SUMMARY:Team Stand-up\r
DTSTART;TZID=Eastern Standard Time:20240108T100000\r
DTEND;TZID=Eastern Standard Time:20240108T101500\r
RRULE:FREQ=WEEKLY;BYDAY=MO,TU\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:nine\r
SUMMARY:Lab Coverage\r
DTSTART;TZID=America/New_York:20240115T090000\r
DTEND;TZID=America/New_York:20240115T120000\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:eight\r
SUMMARY:Early Inventory\r
DTSTART;TZID=America/New_York:20240115T080000\r
DTEND;TZID=America/New_York:20240115T083000\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:anon-tomorrow\r
DTSTART;TZID=America/New_York:20240116T163000\r
DTEND;TZID=America/New_York:20240116T210000\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:broken-rule\r
SUMMARY:Corrupt Series\r
DTSTART:20240101T150000Z\r
DTEND:20240101T160000Z\r
RRULE:FREQ=SOMETIMES;BYDAY=??\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:next-week\r
SUMMARY:Training\r
DTSTART;TZID=America/New_York:20240122T090000\r
DTEND;TZID=America/New_York:20240122T170000\r
END:VEVENT\r
BEGIN:VTODO\r
UID:todo-1\r
SUMMARY:Restock printers\r
DTSTART:20240115T150000Z\r
END:VTODO\r
END:VCALENDAR\r
";

fn now() -> DateTime<Utc> {
    // Monday 2024-01-15, 07:00 in New York
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

fn run(correction: Arc<dyn DriftCorrection>) -> ShiftBuckets {
    let snapshot = decode_calendar(FEED).unwrap();
    ShiftEngine::new(New_York, correction, "Unnamed Shift")
        .extract(&snapshot, now())
        .unwrap()
}

fn names(shifts: &[shiftboard::components::shifts::Shift]) -> Vec<&str> {
    shifts.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn test_today_and_tomorrow() {
    let buckets = run(Arc::new(UtcDigitsAsLocal));

    assert_eq!(
        names(&buckets.today),
        vec!["Early Inventory", "Lab Coverage", "Team Stand-up", "Morning Desk"]
    );
    let ranges: Vec<&str> = buckets.today.iter().map(|s| s.time_range.as_str()).collect();
    assert_eq!(
        ranges,
        vec![
            "8:00 AM - 8:30 AM",
            "9:00 AM - 12:00 PM",
            "10:00 AM - 10:15 AM",
            "2:00 PM - 6:00 PM",
        ]
    );

    assert_eq!(
        names(&buckets.tomorrow),
        vec!["Team Stand-up", "Morning Desk", "Unnamed Shift"]
    );
    assert_eq!(buckets.tomorrow[2].time_range, "4:30 PM - 9:00 PM");
}

#[test]
fn test_example_sort_key() {
    let buckets = run(Arc::new(UtcDigitsAsLocal));
    let desk = buckets
        .today
        .iter()
        .find(|s| s.name == "Morning Desk")
        .unwrap();
    assert_eq!(
        desk.sort_time,
        New_York.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap().timestamp()
    );
}

#[test]
fn test_buckets_are_ordered_and_inside_their_windows() {
    let buckets = run(Arc::new(UtcDigitsAsLocal));
    let windows = DayWindows::around(now(), &New_York).unwrap();

    for (shifts, window) in [(&buckets.today, &windows.today), (&buckets.tomorrow, &windows.tomorrow)] {
        assert!(shifts.windows(2).all(|pair| pair[0].sort_time <= pair[1].sort_time));
        for shift in shifts.iter() {
            assert!(shift.sort_time >= window.start.timestamp());
            assert!(shift.sort_time <= window.end.timestamp());
        }
    }
}

#[test]
fn test_duration_preserved_for_every_occurrence() {
    let snapshot = decode_calendar(FEED).unwrap();
    let engine = ShiftEngine::new(New_York, Arc::new(UtcDigitsAsLocal), "Unnamed Shift");

    for (key, raw) in &snapshot {
        let Some(event) = to_calendar_event(key, raw, &New_York) else {
            continue;
        };
        let Ok(buckets) = engine.extract_events(std::slice::from_ref(&event), now()) else {
            continue;
        };
        for shift in buckets.today.iter().chain(buckets.tomorrow.iter()) {
            let start = New_York.timestamp_opt(shift.sort_time, 0).unwrap();
            let end = start + event.duration();
            let expected_end = end.format("%-I:%M %p").to_string();
            assert!(
                shift.time_range.ends_with(&expected_end),
                "{} does not end at {}",
                shift.time_range,
                expected_end
            );
        }
    }

    let standup = snapshot
        .iter()
        .find_map(|(k, raw)| to_calendar_event(k, raw, &New_York).filter(|e| e.uid == "standup-weekly"))
        .unwrap();
    assert_eq!(standup.duration(), Duration::minutes(15));
}

#[test]
fn test_idempotent() {
    assert_eq!(run(Arc::new(UtcDigitsAsLocal)), run(Arc::new(UtcDigitsAsLocal)));
}

#[test]
fn test_disabling_correction_regresses_recurring_only() {
    let corrected = run(Arc::new(UtcDigitsAsLocal));
    let raw = run(Arc::new(NoCorrection));

    // Single events are identical either way
    for name in ["Lab Coverage", "Early Inventory"] {
        let a = corrected.today.iter().find(|s| s.name == name).unwrap();
        let b = raw.today.iter().find(|s| s.name == name).unwrap();
        assert_eq!(a, b);
    }

    // Rule-generated occurrences drift by the feed's five-hour offset
    let a = corrected.today.iter().find(|s| s.name == "Team Stand-up").unwrap();
    let b = raw.today.iter().find(|s| s.name == "Team Stand-up").unwrap();
    assert_eq!(b.time_range, "5:00 AM - 5:15 AM");
    assert_eq!(a.sort_time - b.sort_time, 5 * 3600);
}

#[test]
fn test_early_hour_policy() {
    let buckets = run(Arc::new(EarlyHourReassignment { before_hour: 6 }));

    // The stand-up's raw 10:00Z reads as 5:00 AM locally, so it is reassigned
    let standup = buckets.today.iter().find(|s| s.name == "Team Stand-up").unwrap();
    assert_eq!(standup.time_range, "10:00 AM - 10:15 AM");

    // The desk's raw 14:00Z reads as 9:00 AM and is left alone
    let desk = buckets.today.iter().find(|s| s.name == "Morning Desk").unwrap();
    assert_eq!(desk.time_range, "9:00 AM - 1:00 PM");
}

/// Series whose local start is before New York's UTC offset, and series with end dates
const EARLY_AND_BOUNDED_FEED: &str = "BEGIN:VCALENDAR\r
BEGIN:VEVENT\r
UID:overnight\r
SUMMARY:Overnight\r
DTSTART;TZID=America/New_York:20240110T020000\r
DTEND;TZID=America/New_York:20240110T060000\r
RRULE:FREQ=DAILY\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:on-call\r
SUMMARY:OnCall\r
DTSTART;VALUE=DATE:20240110\r
DTEND;VALUE=DATE:20240111\r
RRULE:FREQ=DAILY\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:floating\r
SUMMARY:Floating\r
DTSTART:20240110T140000\r
DTEND:20240110T160000\r
RRULE:FREQ=DAILY;UNTIL=20240131T140000\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:all-day-until\r
SUMMARY:AllDayUntil\r
DTSTART;VALUE=DATE:20240110\r
RRULE:FREQ=DAILY;UNTIL=20240131\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:ended\r
SUMMARY:Ended\r
DTSTART:20240101T090000\r
DTEND:20240101T100000\r
RRULE:FREQ=DAILY;UNTIL=20240105\r
END:VEVENT\r
END:VCALENDAR\r
";

fn run_feed(feed: &str) -> ShiftBuckets {
    let snapshot = decode_calendar(feed).unwrap();
    ShiftEngine::new(New_York, Arc::new(UtcDigitsAsLocal), "Unnamed Shift")
        .extract(&snapshot, now())
        .unwrap()
}

fn range_of<'a>(shifts: &'a [shiftboard::components::shifts::Shift], name: &str) -> Option<&'a str> {
    shifts
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.time_range.as_str())
}

#[test]
fn test_early_morning_series_land_today() {
    let buckets = run_feed(EARLY_AND_BOUNDED_FEED);

    assert_eq!(range_of(&buckets.today, "Overnight"), Some("2:00 AM - 6:00 AM"));
    assert_eq!(range_of(&buckets.today, "OnCall"), Some("12:00 AM - 12:00 AM"));
    assert_eq!(
        buckets.today.iter().find(|s| s.name == "Overnight").unwrap().sort_time,
        New_York.with_ymd_and_hms(2024, 1, 15, 2, 0, 0).unwrap().timestamp()
    );

    // Each series occurs exactly once per day
    for name in ["Overnight", "OnCall"] {
        assert_eq!(buckets.today.iter().filter(|s| s.name == name).count(), 1);
        assert_eq!(buckets.tomorrow.iter().filter(|s| s.name == name).count(), 1);
    }
}

#[test]
fn test_series_with_floating_or_date_until() {
    let buckets = run_feed(EARLY_AND_BOUNDED_FEED);

    assert_eq!(range_of(&buckets.today, "Floating"), Some("2:00 PM - 4:00 PM"));
    assert_eq!(range_of(&buckets.today, "AllDayUntil"), Some("12:00 AM - 12:00 AM"));
    assert!(range_of(&buckets.tomorrow, "Floating").is_some());

    // A series that ended before today contributes nothing
    assert!(range_of(&buckets.today, "Ended").is_none());
    assert!(range_of(&buckets.tomorrow, "Ended").is_none());
}
