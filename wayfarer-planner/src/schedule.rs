//! Time-slot allocation within a day.
//!
//! Two recompute paths exist and behave differently on purpose:
//!
//! - [`TimeSlotScheduler::schedule`] walks the whole day from the window
//!   start. Pinned stops keep their displayed time, but the running clock
//!   ignores it and keeps advancing by each stop's duration.
//! - [`TimeSlotScheduler::recalculate_from_index`] re-anchors the clock on
//!   one stop's time and overwrites every later stop, pinned or not.

use log::debug;
use wayfarer_core::{DayPlan, ItineraryError, TimeWindow};

/// Shortest slot ever allocated to a stop.
pub const MIN_SLOT_MINUTES: u32 = 30;

/// Assigns start times, default durations and meal tags.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{DayPlan, PointOfInterest, ScheduledStop, TimeWindow};
/// use wayfarer_planner::TimeSlotScheduler;
///
/// let window = TimeWindow::new("08:00".parse()?, "18:00".parse()?)?;
/// let mut day = DayPlan::new(
///     0,
///     vec![
///         ScheduledStop::unscheduled(PointOfInterest::new(1, "Fort", Coord { x: 123.905, y: 10.292 })),
///         ScheduledStop::unscheduled(PointOfInterest::new(2, "Museum", Coord { x: 123.901, y: 10.294 })),
///     ],
/// );
/// TimeSlotScheduler.schedule(&mut day, window);
///
/// let slots: Vec<String> = day
///     .stops
///     .iter()
///     .filter_map(|stop| stop.time_slot.map(|slot| slot.to_string()))
///     .collect();
/// assert_eq!(slots, ["08:00", "13:00"]);
/// # Ok::<(), wayfarer_core::ItineraryError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeSlotScheduler;

impl TimeSlotScheduler {
    /// Default slot length for `stop_count` stops: the window divided evenly,
    /// but never below [`MIN_SLOT_MINUTES`].
    #[must_use]
    pub fn slot_minutes(&self, window: TimeWindow, stop_count: usize) -> u32 {
        let count = u32::try_from(stop_count).unwrap_or(u32::MAX).max(1);
        (window.minutes() / count).max(MIN_SLOT_MINUTES)
    }

    /// Lay out every stop of `day` from the window start.
    ///
    /// Stops without a duration receive the default slot length. Stops not
    /// pinned by the traveller get the running clock as their time; pinned
    /// stops keep theirs. Either way the clock then advances by the stop's
    /// duration, and each stop's meal tag is re-derived from its time.
    pub fn schedule(&self, day: &mut DayPlan, window: TimeWindow) {
        if day.is_empty() {
            return;
        }
        let slot = self.slot_minutes(window, day.len());
        let mut clock = window.start();
        for stop in &mut day.stops {
            if stop.duration_minutes.is_none() {
                stop.set_duration(slot);
            }
            let shown = match stop.time_slot {
                Some(pinned) if stop.custom_time => pinned,
                _ => clock,
            };
            stop.set_time_slot(shown);
            clock = clock.advance(stop.effective_duration_minutes());
        }
        debug!(
            "scheduled day {} with {} stops of {slot} min from {}",
            day.day_index,
            day.len(),
            window.start()
        );
    }

    /// Schedule several days with the same window.
    pub fn schedule_all(&self, days: &mut [DayPlan], window: TimeWindow) {
        for day in days {
            self.schedule(day, window);
        }
    }

    /// Recompute times after `index`, anchored on that stop's time.
    ///
    /// Later stops are overwritten and lose their pinned flag. Stops before
    /// `index` are left alone.
    ///
    /// # Errors
    /// Returns [`ItineraryError::StopIndexOutOfRange`] for an unknown stop
    /// and [`ItineraryError::MissingTimeSlot`] when the anchor has no time.
    pub fn recalculate_from_index(
        &self,
        day: &mut DayPlan,
        index: usize,
    ) -> Result<(), ItineraryError> {
        let anchor = day.stop_mut(index)?;
        let start = anchor
            .time_slot
            .ok_or(ItineraryError::MissingTimeSlot { index })?;
        anchor.set_time_slot(start);
        let mut clock = start.advance(anchor.effective_duration_minutes());

        for stop in day.stops.iter_mut().skip(index + 1) {
            stop.set_time_slot(clock);
            stop.custom_time = false;
            clock = clock.advance(stop.effective_duration_minutes());
        }
        Ok(())
    }
}
