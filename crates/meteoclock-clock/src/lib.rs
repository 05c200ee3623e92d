//! Synchronized clock for Meteoclock
//!
//! Anchors a wall clock on one network time sync, falls back to the device
//! clock when the time service is unavailable, and refreshes the time and
//! date display slots once per second.

pub mod clock;
pub mod error;
pub mod format;
pub mod sink;
pub mod source;

pub use clock::{ClockState, SyncAttemptResult, SyncedClock, TickHandle, TimeOrigin, TICK_PERIOD};
pub use error::SyncUnavailable;
pub use format::{DisplayZone, RenderedTime};
pub use sink::DisplaySink;
pub use source::{HttpTimeSource, TimeSource, WORLD_TIME_API_URL};
