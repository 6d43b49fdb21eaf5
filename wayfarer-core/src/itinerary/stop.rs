use geo::Coord;
use serde::{Deserialize, Serialize};

use super::{MealType, TimeSlot};
use crate::PointOfInterest;

/// Visit length assumed for stops that carry no explicit duration.
pub const DEFAULT_STOP_MINUTES: u32 = 120;

/// A named food or lodging choice attached by the traveller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Display name.
    pub name: String,
    /// Position of the venue.
    pub location: Coord<f64>,
}

impl Place {
    /// Construct a place.
    #[must_use]
    pub fn new(name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}

/// A point of interest placed into a day with a time slot.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{PointOfInterest, ScheduledStop};
///
/// let mut stop = ScheduledStop::unscheduled(PointOfInterest::new(
///     1,
///     "Magellan's Cross",
///     Coord { x: 123.9019, y: 10.2934 },
/// ));
/// assert_eq!(stop.effective_duration_minutes(), 120);
///
/// stop.set_duration(90);
/// assert_eq!(stop.estimated_duration.as_deref(), Some("1h 30m"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStop {
    /// The visited point of interest.
    pub poi: PointOfInterest,
    /// Start time, once scheduled.
    #[serde(default)]
    pub time_slot: Option<TimeSlot>,
    /// Visit length in minutes.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// Human-readable visit length such as `"2h"`.
    #[serde(default)]
    pub estimated_duration: Option<String>,
    /// Meal tag derived from the time slot.
    #[serde(default)]
    pub meal_type: MealType,
    /// Restaurant chosen for the meal at this stop.
    #[serde(default)]
    pub chosen_food: Option<Place>,
    /// Lodging chosen near this stop.
    #[serde(default)]
    pub chosen_lodging: Option<Place>,
    /// Whether the traveller pinned the time slot by hand.
    #[serde(default)]
    pub custom_time: bool,
}

impl ScheduledStop {
    /// Wrap a point of interest with no time, duration or choices yet.
    #[must_use]
    pub fn unscheduled(poi: PointOfInterest) -> Self {
        Self {
            poi,
            time_slot: None,
            duration_minutes: None,
            estimated_duration: None,
            meal_type: MealType::None,
            chosen_food: None,
            chosen_lodging: None,
            custom_time: false,
        }
    }

    /// Visit length, falling back to [`DEFAULT_STOP_MINUTES`].
    #[must_use]
    pub fn effective_duration_minutes(&self) -> u32 {
        self.duration_minutes.unwrap_or(DEFAULT_STOP_MINUTES)
    }

    /// Set the visit length and refresh its label.
    pub fn set_duration(&mut self, minutes: u32) {
        self.duration_minutes = Some(minutes);
        self.estimated_duration = Some(duration_label(minutes));
    }

    /// Set the time slot and re-derive the meal tag from it.
    pub fn set_time_slot(&mut self, slot: TimeSlot) {
        self.time_slot = Some(slot);
        self.meal_type = MealType::for_slot(slot);
    }

    /// Location of the underlying point of interest, when valid.
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        self.poi.valid_location()
    }
}

/// Format a minute count as `"2h"`, `"45m"` or `"1h 30m"`.
#[must_use]
pub fn duration_label(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, rest) => format!("{rest}m"),
        (hours, 0) => format!("{hours}h"),
        (hours, rest) => format!("{hours}h {rest}m"),
    }
}
