use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ItineraryError, Place, ScheduledStop, TimeSlot};

/// One day of an itinerary: an ordered list of stops.
///
/// The edit methods mirror what a traveller can do to a generated plan.
/// They never reschedule other stops; callers run the scheduler afterwards.
///
/// # Examples
/// ```
/// use wayfarer_core::{DayPlan, PointOfInterest, ScheduledStop};
///
/// let mut day = DayPlan::new(
///     0,
///     vec![
///         ScheduledStop::unscheduled(PointOfInterest::unlocated(1, "Temple")),
///         ScheduledStop::unscheduled(PointOfInterest::unlocated(2, "Beach")),
///     ],
/// );
/// day.move_stop(1, 0)?;
/// assert_eq!(day.stops[0].poi.id, 2);
/// # Ok::<(), wayfarer_core::ItineraryError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Zero-based day number within the trip.
    pub day_index: usize,
    /// Calendar date, when the trip has a start date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Stops in visiting order.
    pub stops: Vec<ScheduledStop>,
    /// Where the traveller sleeps at the end of the day.
    #[serde(default)]
    pub chosen_lodging: Option<Place>,
}

impl DayPlan {
    /// Construct an undated day without lodging.
    #[must_use]
    pub const fn new(day_index: usize, stops: Vec<ScheduledStop>) -> Self {
        Self {
            day_index,
            date: None,
            stops,
            chosen_lodging: None,
        }
    }

    /// Number of stops in the day.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the day has no stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Move the stop at `from` so that it ends up at index `to`.
    ///
    /// # Errors
    /// Returns [`ItineraryError::StopIndexOutOfRange`] when either index is
    /// outside the day.
    pub fn move_stop(&mut self, from: usize, to: usize) -> Result<(), ItineraryError> {
        self.check_index(from)?;
        self.check_index(to)?;
        let stop = self.stops.remove(from);
        self.stops.insert(to, stop);
        Ok(())
    }

    /// Override the visit length of one stop.
    ///
    /// # Errors
    /// Returns [`ItineraryError::ZeroDuration`] for a zero-minute visit and
    /// [`ItineraryError::StopIndexOutOfRange`] for an unknown stop.
    pub fn set_duration(&mut self, index: usize, minutes: u32) -> Result<(), ItineraryError> {
        if minutes == 0 {
            return Err(ItineraryError::ZeroDuration);
        }
        self.stop_mut(index)?.set_duration(minutes);
        Ok(())
    }

    /// Pin a stop to a hand-picked start time.
    ///
    /// # Errors
    /// Returns [`ItineraryError::StopIndexOutOfRange`] for an unknown stop.
    pub fn pin_time(&mut self, index: usize, slot: TimeSlot) -> Result<(), ItineraryError> {
        let stop = self.stop_mut(index)?;
        stop.set_time_slot(slot);
        stop.custom_time = true;
        Ok(())
    }

    /// Mutable access to one stop.
    ///
    /// # Errors
    /// Returns [`ItineraryError::StopIndexOutOfRange`] for an unknown stop.
    pub fn stop_mut(&mut self, index: usize) -> Result<&mut ScheduledStop, ItineraryError> {
        let len = self.stops.len();
        self.stops
            .get_mut(index)
            .ok_or(ItineraryError::StopIndexOutOfRange { index, len })
    }

    /// Lodging for the night: the day's choice, else the last stop's.
    #[must_use]
    pub fn lodging(&self) -> Option<&Place> {
        self.chosen_lodging.as_ref().or_else(|| {
            self.stops
                .last()
                .and_then(|stop| stop.chosen_lodging.as_ref())
        })
    }

    fn check_index(&self, index: usize) -> Result<(), ItineraryError> {
        if index < self.stops.len() {
            Ok(())
        } else {
            Err(ItineraryError::StopIndexOutOfRange {
                index,
                len: self.stops.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MealType, PointOfInterest};
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn day() -> DayPlan {
        DayPlan::new(
            0,
            (1..=3)
                .map(|id| ScheduledStop::unscheduled(PointOfInterest::unlocated(id, "stop")))
                .collect(),
        )
    }

    #[rstest]
    fn move_stop_reorders(mut day: DayPlan) {
        day.move_stop(0, 2).expect("valid indices");
        let ids: Vec<u64> = day.stops.iter().map(|stop| stop.poi.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[rstest]
    fn move_stop_rejects_out_of_range(mut day: DayPlan) {
        let err = day.move_stop(0, 3).expect_err("index 3 is out of range");
        assert_eq!(err, ItineraryError::StopIndexOutOfRange { index: 3, len: 3 });
        assert_eq!(day.stops[0].poi.id, 1, "failed edits leave the day untouched");
    }

    #[rstest]
    fn pin_time_marks_custom(mut day: DayPlan) {
        day.pin_time(1, TimeSlot::new(12, 15).expect("valid slot"))
            .expect("valid index");
        assert!(day.stops[1].custom_time);
        assert_eq!(day.stops[1].meal_type, MealType::Lunch);
    }

    #[rstest]
    fn set_duration_rejects_zero(mut day: DayPlan) {
        assert_eq!(day.set_duration(0, 0), Err(ItineraryError::ZeroDuration));
    }

    #[rstest]
    fn lodging_falls_back_to_last_stop(mut day: DayPlan) {
        let inn = Place::new("Inn", Coord { x: 123.9, y: 10.3 });
        if let Some(last) = day.stops.last_mut() {
            last.chosen_lodging = Some(inn.clone());
        }
        assert_eq!(day.lodging(), Some(&inn));

        let hotel = Place::new("Hotel", Coord { x: 123.8, y: 10.2 });
        day.chosen_lodging = Some(hotel.clone());
        assert_eq!(day.lodging(), Some(&hotel));
    }
}
