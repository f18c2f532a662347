use super::models::Shift;
use crate::utils::time::format_clock;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Build the displayed shift for one corrected occurrence.
///
/// The end is the corrected start plus the template duration, so every
/// occurrence keeps the template's length.
pub fn format_shift(
    summary: Option<&str>,
    placeholder: &str,
    duration: Duration,
    corrected_start: DateTime<Tz>,
) -> Shift {
    let corrected_end = corrected_start + duration;

    Shift {
        name: summary.unwrap_or(placeholder).to_string(),
        time_range: format!(
            "{} - {}",
            format_clock(&corrected_start),
            format_clock(&corrected_end)
        ),
        sort_time: corrected_start.timestamp(),
    }
}
