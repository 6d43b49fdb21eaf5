//! Day partitioning and time-slot scheduling for Wayfarer itineraries.
//!
//! [`SpotClusterer`] sequences points of interest with a greedy
//! nearest-neighbour tour and deals them round-robin across days.
//! [`TimeSlotScheduler`] assigns start times and meal tags within a day.
//! [`ItineraryPlanner`] combines both and memoises the result per point
//! set, day count and window.

#![forbid(unsafe_code)]

mod cluster;
mod planner;
mod schedule;

pub use cluster::SpotClusterer;
pub use planner::{ItineraryPlanner, PlanRequest};
pub use schedule::{MIN_SLOT_MINUTES, TimeSlotScheduler};
