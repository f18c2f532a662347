use super::models::{Occurrence, OccurrenceOrigin};
use super::window::DayWindow;
use crate::components::calendar_feed::CalendarEvent;

/// Result of asking one event for its occurrences in a window
#[derive(Debug)]
pub enum ExpansionOutcome<'a> {
    Occurrences(Vec<Occurrence<'a>>),
    Failed(String),
}

impl ExpansionOutcome<'_> {
    pub fn is_failed(&self) -> bool {
        matches!(self, ExpansionOutcome::Failed(_))
    }
}

/// Occurrences of `event` inside `window`.
///
/// Recurring events defer to their rule, queried over the window's wall-clock
/// digits since that is the frame the rule is anchored in. A single event
/// yields its template start when that falls inside the window.
pub fn expand<'a>(event: &'a CalendarEvent, window: &DayWindow) -> ExpansionOutcome<'a> {
    let Some(rule) = &event.recurrence else {
        let occurrences = if window.contains(&event.start) {
            vec![Occurrence {
                event,
                instant: event.start,
                origin: OccurrenceOrigin::Single,
            }]
        } else {
            Vec::new()
        };
        return ExpansionOutcome::Occurrences(occurrences);
    };

    match rule.between(window.wall_start(), window.wall_end()) {
        Ok(instants) => ExpansionOutcome::Occurrences(
            instants
                .into_iter()
                .map(|instant| Occurrence {
                    event,
                    instant,
                    origin: OccurrenceOrigin::Recurrence,
                })
                .collect(),
        ),
        Err(e) => ExpansionOutcome::Failed(e.to_string()),
    }
}
