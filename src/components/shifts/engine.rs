use super::correction::{policy_for, DriftCorrection};
use super::expander::{expand, ExpansionOutcome};
use super::formatter::format_shift;
use super::models::{Occurrence, ShiftBuckets};
use super::window::DayWindows;
use crate::components::calendar_feed::{to_calendar_event, CalendarEvent, FeedSnapshot};
use crate::config::Config;
use crate::error::BoardResult;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extracts today's and tomorrow's shifts from a calendar snapshot.
///
/// Holds no state between calls; `now` is passed in so one request sees a
/// single reference time.
#[derive(Clone)]
pub struct ShiftEngine {
    zone: Tz,
    correction: Arc<dyn DriftCorrection>,
    placeholder: String,
}

impl fmt::Debug for ShiftEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShiftEngine")
            .field("zone", &self.zone)
            .field("correction", &self.correction.name())
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

impl ShiftEngine {
    pub fn new(zone: Tz, correction: Arc<dyn DriftCorrection>, placeholder: impl Into<String>) -> Self {
        Self {
            zone,
            correction,
            placeholder: placeholder.into(),
        }
    }

    pub fn from_config(config: &Config) -> BoardResult<Self> {
        Ok(Self::new(
            config.target_zone()?,
            policy_for(config.drift_correction, config.drift_early_hour),
            config.unnamed_shift_name.clone(),
        ))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Normalize a decoded feed and extract its shifts
    pub fn extract(&self, snapshot: &FeedSnapshot, now: DateTime<Utc>) -> BoardResult<ShiftBuckets> {
        let events: Vec<CalendarEvent> = snapshot
            .iter()
            .filter_map(|(key, raw)| to_calendar_event(key, raw, &self.zone))
            .collect();

        debug!(
            "{} of {} calendar components are usable events",
            events.len(),
            snapshot.len()
        );

        self.extract_events(&events, now)
    }

    /// Extract shifts from already-normalized events
    pub fn extract_events(
        &self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
    ) -> BoardResult<ShiftBuckets> {
        let windows = DayWindows::around(now, &self.zone)?;
        let mut buckets = ShiftBuckets::default();

        for event in events {
            let occurrences = match Self::occurrences(event, &windows) {
                Ok(occurrences) => occurrences,
                Err(reason) => {
                    warn!("Skipping event {}: {}", event.uid, reason);
                    continue;
                }
            };

            let duration = event.duration();
            for occurrence in occurrences {
                let corrected = self.correction.correct(&occurrence, &self.zone);
                let Some(bucket) = windows.classify(&corrected) else {
                    debug!(
                        "Occurrence of {} at {} left both windows after correction",
                        event.uid, corrected
                    );
                    continue;
                };

                buckets.push(
                    bucket,
                    format_shift(event.summary.as_deref(), &self.placeholder, duration, corrected),
                );
            }
        }

        buckets.sort_chronologically();
        debug!(
            "Extracted {} shifts for today and {} for tomorrow ({} correction)",
            buckets.today.len(),
            buckets.tomorrow.len(),
            self.correction.name()
        );

        Ok(buckets)
    }

    /// Occurrences of one event across both windows; any failure drops the whole event
    fn occurrences<'a>(
        event: &'a CalendarEvent,
        windows: &DayWindows,
    ) -> Result<Vec<Occurrence<'a>>, String> {
        let mut all = Vec::new();
        for (_, window) in windows.iter() {
            match expand(event, window) {
                ExpansionOutcome::Occurrences(found) => all.extend(found),
                ExpansionOutcome::Failed(reason) => return Err(reason),
            }
        }
        Ok(all)
    }
}
