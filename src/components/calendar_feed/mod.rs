//! Calendar feed collaborator: download, decode and normalize ICS data.

mod actor;
pub mod adapter;
mod handle;
pub mod ics;
pub mod models;
pub mod recurrence;

pub use actor::FeedSnapshot;
pub use adapter::to_calendar_event;
pub use handle::CalendarFeedHandle;
pub use ics::decode_calendar;
pub use models::{CalendarEvent, RawComponent, RawProperty};
pub use recurrence::RecurrenceRule;

use crate::error::BoardResult;
use async_trait::async_trait;

/// Source of calendar snapshots
#[async_trait]
pub trait CalendarFeed: Send + Sync + 'static {
    /// Fetch the whole feed; any failure aborts the request
    async fn fetch_snapshot(&self) -> BoardResult<FeedSnapshot>;
}

/// Feed backed by a fixed ICS document (for testing and offline runs)
#[derive(Debug, Clone)]
pub struct StaticFeed {
    ics: String,
}

impl StaticFeed {
    pub fn new(ics: impl Into<String>) -> Self {
        Self { ics: ics.into() }
    }
}

#[async_trait]
impl CalendarFeed for StaticFeed {
    async fn fetch_snapshot(&self) -> BoardResult<FeedSnapshot> {
        decode_calendar(&self.ics)
    }
}
