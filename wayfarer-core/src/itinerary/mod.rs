//! Scheduled stops and per-day plans.
//!
//! Day plans are created by the planner, edited by the traveller (reorder,
//! duration, pinned times) and discarded when the itinerary parameters
//! change.

mod day;
mod stop;
mod time;

use thiserror::Error;

pub use day::DayPlan;
pub use stop::{DEFAULT_STOP_MINUTES, Place, ScheduledStop, duration_label};
pub use time::{MealType, TimeSlot, TimeWindow};

/// Errors raised while building or editing itineraries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryError {
    /// A clock time could not be parsed or was out of range.
    #[error("invalid time {value:?}; expected HH:MM")]
    InvalidTime {
        /// Rejected input.
        value: String,
    },
    /// A scheduling window did not end after it started.
    #[error("time window {start}-{end} is empty")]
    EmptyWindow {
        /// Window start.
        start: TimeSlot,
        /// Window end.
        end: TimeSlot,
    },
    /// A stop index fell outside the day.
    #[error("stop index {index} is out of range for a day with {len} stops")]
    StopIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of stops in the day.
        len: usize,
    },
    /// A recompute was anchored on a stop that has no time yet.
    #[error("stop {index} has no time slot to anchor on")]
    MissingTimeSlot {
        /// Index of the unscheduled stop.
        index: usize,
    },
    /// A stop duration of zero minutes was requested.
    #[error("stop duration must be positive")]
    ZeroDuration,
}
