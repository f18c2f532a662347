// Export components
pub mod bridge;
pub mod calendar_feed;
pub mod shifts;

// Re-export the live feed handle
pub use calendar_feed::CalendarFeedHandle;
// Re-export the extraction engine
pub use shifts::ShiftEngine;
