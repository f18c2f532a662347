//! Occurrence-correction policies.
//!
//! Some feeds (Outlook's published ICS among them) lose the zone of
//! rule-generated occurrences, so their UTC clock digits are really local
//! wall-clock digits. A policy decides, per occurrence, whether to trust the
//! instant or to keep the digits and swap the zone label.

use super::models::{Occurrence, OccurrenceOrigin};
use crate::config::DriftMode;
use crate::utils::time::localize;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

/// Turns a raw occurrence instant into the believed-correct local start
pub trait DriftCorrection: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn correct(&self, occurrence: &Occurrence<'_>, zone: &Tz) -> DateTime<Tz>;
}

/// Keep the instant's UTC clock digits and read them as local time in `zone`
pub fn reassign_zone(instant: &DateTime<Utc>, zone: &Tz) -> DateTime<Tz> {
    localize(zone, &instant.naive_utc()).unwrap_or_else(|| instant.with_timezone(zone))
}

/// Reassign rule-generated occurrences; convert single events normally
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcDigitsAsLocal;

impl DriftCorrection for UtcDigitsAsLocal {
    fn name(&self) -> &'static str {
        "recurring"
    }

    fn correct(&self, occurrence: &Occurrence<'_>, zone: &Tz) -> DateTime<Tz> {
        match occurrence.origin {
            OccurrenceOrigin::Recurrence => reassign_zone(&occurrence.instant, zone),
            OccurrenceOrigin::Single => occurrence.instant.with_timezone(zone),
        }
    }
}

/// Plain zone conversion for everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl DriftCorrection for NoCorrection {
    fn name(&self) -> &'static str {
        "off"
    }

    fn correct(&self, occurrence: &Occurrence<'_>, zone: &Tz) -> DateTime<Tz> {
        occurrence.instant.with_timezone(zone)
    }
}

/// Reassign any occurrence whose local hour is before `before_hour`.
///
/// Shifts rarely start in the small hours, so a start there is taken as a
/// sign of drift regardless of whether the event recurs.
#[derive(Debug, Clone, Copy)]
pub struct EarlyHourReassignment {
    pub before_hour: u32,
}

impl DriftCorrection for EarlyHourReassignment {
    fn name(&self) -> &'static str {
        "early-hours"
    }

    fn correct(&self, occurrence: &Occurrence<'_>, zone: &Tz) -> DateTime<Tz> {
        let converted = occurrence.instant.with_timezone(zone);
        if converted.hour() < self.before_hour {
            reassign_zone(&occurrence.instant, zone)
        } else {
            converted
        }
    }
}

/// Policy for a configured mode
pub fn policy_for(mode: DriftMode, early_hour: u32) -> Arc<dyn DriftCorrection> {
    match mode {
        DriftMode::Recurring => Arc::new(UtcDigitsAsLocal),
        DriftMode::Off => Arc::new(NoCorrection),
        DriftMode::EarlyHours => Arc::new(EarlyHourReassignment {
            before_hour: early_hour,
        }),
    }
}
