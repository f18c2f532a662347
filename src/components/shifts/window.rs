use super::models::Bucket;
use crate::error::{BoardResult, Error};
use crate::utils::time::start_of_day;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// One target-zone calendar day as a closed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Tz>,
    /// Last millisecond before the next local midnight
    pub end: DateTime<Tz>,
}

impl DayWindow {
    /// The window for a local calendar date
    pub fn for_date(zone: &Tz, date: NaiveDate) -> BoardResult<Self> {
        let next_date = date
            .succ_opt()
            .ok_or_else(|| Error::Other(format!("No day after {}", date)))?;
        let start = start_of_day(zone, date)
            .ok_or_else(|| Error::Other(format!("No local midnight on {}", date)))?;
        let next = start_of_day(zone, next_date)
            .ok_or_else(|| Error::Other(format!("No local midnight on {}", next_date)))?;

        Ok(Self {
            start,
            end: next - Duration::milliseconds(1),
        })
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// Start as local wall-clock digits labeled UTC, the frame recurrence rules run in
    pub fn wall_start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.start.naive_local())
    }

    pub fn wall_end(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.end.naive_local())
    }

    /// Closed-interval membership
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start_utc() <= *instant && *instant <= self.end_utc()
    }
}

/// Today's and tomorrow's windows, derived once per request from `now`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindows {
    pub today: DayWindow,
    pub tomorrow: DayWindow,
}

impl DayWindows {
    pub fn around(now: DateTime<Utc>, zone: &Tz) -> BoardResult<Self> {
        let today = now.with_timezone(zone).date_naive();
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| Error::Other(format!("No day after {}", today)))?;

        Ok(Self {
            today: DayWindow::for_date(zone, today)?,
            tomorrow: DayWindow::for_date(zone, tomorrow)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &DayWindow)> {
        [(Bucket::Today, &self.today), (Bucket::Tomorrow, &self.tomorrow)].into_iter()
    }

    /// Assign an instant to at most one bucket
    pub fn classify(&self, instant: &DateTime<Tz>) -> Option<Bucket> {
        let instant = instant.with_timezone(&Utc);
        self.iter()
            .find(|(_, window)| window.contains(&instant))
            .map(|(bucket, _)| bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn test_windows_align_to_local_midnight() {
        // 2024-01-15 22:30 in New York is already the 16th in UTC
        let now = Utc.with_ymd_and_hms(2024, 1, 16, 3, 30, 0).unwrap();
        let windows = DayWindows::around(now, &New_York).unwrap();

        assert_eq!(
            windows.today.start_utc(),
            Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap()
        );
        assert_eq!(
            windows.tomorrow.start_utc(),
            Utc.with_ymd_and_hms(2024, 1, 16, 5, 0, 0).unwrap()
        );
        assert_eq!(
            windows.today.end_utc() + Duration::milliseconds(1),
            windows.tomorrow.start_utc()
        );
    }

    #[test]
    fn test_dst_day_is_23_hours() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap();
        let windows = DayWindows::around(now, &New_York).unwrap();
        let length = windows.today.end_utc() - windows.today.start_utc();
        assert_eq!(length, Duration::hours(23) - Duration::milliseconds(1));
    }

    #[test]
    fn test_wall_frame_is_the_local_day() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let windows = DayWindows::around(now, &New_York).unwrap();

        assert_eq!(
            windows.today.wall_start(),
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            windows.today.wall_end() + Duration::milliseconds(1),
            windows.tomorrow.wall_start()
        );

        // A 23-hour DST day still spans a full day of wall-clock digits
        let dst = DayWindows::around(Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap(), &New_York)
            .unwrap();
        assert_eq!(
            dst.today.wall_end() - dst.today.wall_start(),
            Duration::hours(24) - Duration::milliseconds(1)
        );
    }

    #[test]
    fn test_classify() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let windows = DayWindows::around(now, &New_York).unwrap();

        let midnight = New_York.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let late = New_York.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
        let next = New_York.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
        let day_after = New_York.with_ymd_and_hms(2024, 1, 17, 0, 0, 0).unwrap();
        let yesterday = New_York.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap();

        assert_eq!(windows.classify(&midnight), Some(Bucket::Today));
        assert_eq!(windows.classify(&late), Some(Bucket::Today));
        assert_eq!(windows.classify(&next), Some(Bucket::Tomorrow));
        assert_eq!(windows.classify(&day_after), None);
        assert_eq!(windows.classify(&yesterday), None);
    }
}
