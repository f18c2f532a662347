use crate::components::calendar_feed::CalendarEvent;
use crate::config::ShiftView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an occurrence instant came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceOrigin {
    /// Generated by the event's recurrence rule
    Recurrence,
    /// The template start of a non-recurring event
    Single,
}

/// One point in time at which an event occurs, before correction
#[derive(Debug, Clone, Copy)]
pub struct Occurrence<'a> {
    pub event: &'a CalendarEvent,
    pub instant: DateTime<Utc>,
    pub origin: OccurrenceOrigin,
}

/// Which day a shift belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Today,
    Tomorrow,
}

/// A shift as served to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub name: String,
    /// e.g. `2:00 PM - 6:00 PM`
    #[serde(rename = "timeRange")]
    pub time_range: String,
    /// Epoch seconds of the corrected start; ordering only
    #[serde(rename = "sortTime")]
    pub sort_time: i64,
}

/// Today's and tomorrow's shifts, each in chronological order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftBuckets {
    pub today: Vec<Shift>,
    pub tomorrow: Vec<Shift>,
}

impl ShiftBuckets {
    pub fn push(&mut self, bucket: Bucket, shift: Shift) {
        match bucket {
            Bucket::Today => self.today.push(shift),
            Bucket::Tomorrow => self.tomorrow.push(shift),
        }
    }

    /// Stable ascending sort by `sort_time`; ties keep production order
    pub fn sort_chronologically(&mut self) {
        self.today.sort_by_key(|shift| shift.sort_time);
        self.tomorrow.sort_by_key(|shift| shift.sort_time);
    }

    /// Reduced single-bucket view
    pub fn today_only(self) -> Vec<Shift> {
        self.today
    }

    pub fn into_payload(self, view: ShiftView) -> ShiftsPayload {
        match view {
            ShiftView::Buckets => ShiftsPayload::Buckets(self),
            ShiftView::Today => ShiftsPayload::Today(self.today_only()),
        }
    }
}

/// Response body of the shifts endpoint in either deployment shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShiftsPayload {
    Buckets(ShiftBuckets),
    Today(Vec<Shift>),
}
