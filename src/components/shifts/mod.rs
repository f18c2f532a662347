//! Shift extraction: recurrence expansion, drift correction, day-window
//! classification, formatting and ordering.

pub mod correction;
mod engine;
pub mod expander;
pub mod formatter;
pub mod models;
pub mod window;

pub use correction::{policy_for, DriftCorrection, EarlyHourReassignment, NoCorrection, UtcDigitsAsLocal};
pub use engine::ShiftEngine;
pub use models::{Bucket, Shift, ShiftBuckets, ShiftsPayload};
pub use window::{DayWindow, DayWindows};
