//! Clock times, scheduling windows and meal tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ItineraryError;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// A wall-clock time of day with minute resolution, shown as `HH:MM`.
///
/// Advancing past midnight wraps around to the next day's early hours.
///
/// # Examples
/// ```
/// use wayfarer_core::TimeSlot;
///
/// let slot: TimeSlot = "08:00".parse()?;
/// assert_eq!(slot.advance(300).to_string(), "13:00");
/// assert_eq!(slot.advance(17 * 60).to_string(), "01:00");
/// # Ok::<(), wayfarer_core::ItineraryError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    minutes: u16,
}

impl TimeSlot {
    /// Build a slot from an hour (`0..24`) and minute (`0..60`).
    ///
    /// # Errors
    /// Returns [`ItineraryError::InvalidTime`] when either component is out
    /// of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ItineraryError> {
        if hour >= 24 || minute >= 60 {
            return Err(ItineraryError::InvalidTime {
                value: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self {
            minutes: u16::from(hour) * 60 + u16::from(minute),
        })
    }

    /// Build a slot from minutes since midnight, wrapping at 24 hours.
    #[must_use]
    pub fn from_minutes(total: u32) -> Self {
        let wrapped = total % MINUTES_PER_DAY;
        Self {
            minutes: u16::try_from(wrapped).unwrap_or(0),
        }
    }

    /// Minutes elapsed since midnight.
    #[must_use]
    pub const fn minutes_since_midnight(self) -> u32 {
        self.minutes as u32
    }

    /// Hour component in `0..24`.
    #[must_use]
    pub const fn hour(self) -> u32 {
        self.minutes_since_midnight() / MINUTES_PER_HOUR
    }

    /// Minute component in `0..60`.
    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minutes_since_midnight() % MINUTES_PER_HOUR
    }

    /// Return the slot `minutes` later, wrapping past midnight.
    #[must_use]
    pub fn advance(self, minutes: u32) -> Self {
        Self::from_minutes(self.minutes_since_midnight() + minutes % MINUTES_PER_DAY)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = ItineraryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ItineraryError::InvalidTime {
            value: value.to_owned(),
        };
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse::<u8>().map_err(|_| invalid())?;
        let minute = minute.parse::<u8>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = ItineraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// The part of a day available for sightseeing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: TimeSlot,
    end: TimeSlot,
}

#[derive(Deserialize)]
struct RawWindow {
    start: TimeSlot,
    end: TimeSlot,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = ItineraryError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Build a window that ends strictly after it starts.
    ///
    /// # Errors
    /// Returns [`ItineraryError::EmptyWindow`] when `end <= start`.
    pub fn new(start: TimeSlot, end: TimeSlot) -> Result<Self, ItineraryError> {
        if end <= start {
            return Err(ItineraryError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window start.
    #[must_use]
    pub const fn start(&self) -> TimeSlot {
        self.start
    }

    /// Window end.
    #[must_use]
    pub const fn end(&self) -> TimeSlot {
        self.end
    }

    /// Length of the window in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.end.minutes_since_midnight() - self.start.minutes_since_midnight()
    }
}

/// Meal tag derived from a stop's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Starts in `[06:00, 10:00)`.
    Breakfast,
    /// Starts in `[11:00, 14:00)`.
    Lunch,
    /// Starts in `[18:00, 21:00)`.
    Dinner,
    /// Any other start time.
    #[default]
    None,
}

impl MealType {
    /// Derive the meal tag purely from the hour of `slot`.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::{MealType, TimeSlot};
    ///
    /// assert_eq!(MealType::for_slot("12:30".parse()?), MealType::Lunch);
    /// assert_eq!(MealType::for_slot("16:00".parse()?), MealType::None);
    /// # Ok::<(), wayfarer_core::ItineraryError>(())
    /// ```
    #[must_use]
    pub const fn for_slot(slot: TimeSlot) -> Self {
        match slot.hour() {
            6..=9 => Self::Breakfast,
            11..=13 => Self::Lunch,
            18..=20 => Self::Dinner,
            _ => Self::None,
        }
    }

    /// Whether the tag names an actual meal.
    #[must_use]
    pub const fn is_meal(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("05:59", MealType::None)]
    #[case("06:00", MealType::Breakfast)]
    #[case("09:59", MealType::Breakfast)]
    #[case("10:30", MealType::None)]
    #[case("11:00", MealType::Lunch)]
    #[case("12:30", MealType::Lunch)]
    #[case("14:00", MealType::None)]
    #[case("16:00", MealType::None)]
    #[case("18:00", MealType::Dinner)]
    #[case("20:59", MealType::Dinner)]
    #[case("21:00", MealType::None)]
    fn meal_follows_slot_hour(#[case] slot: &str, #[case] expected: MealType) {
        let slot: TimeSlot = slot.parse().expect("valid slot");
        assert_eq!(MealType::for_slot(slot), expected);
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    #[case("noon")]
    #[case("12")]
    fn rejects_malformed_times(#[case] value: &str) {
        assert!(matches!(
            value.parse::<TimeSlot>(),
            Err(ItineraryError::InvalidTime { .. })
        ));
    }

    #[rstest]
    fn window_requires_end_after_start() {
        let eight = TimeSlot::new(8, 0).expect("valid slot");
        assert!(matches!(
            TimeWindow::new(eight, eight),
            Err(ItineraryError::EmptyWindow { .. })
        ));
    }

    #[rstest]
    fn window_measures_minutes() {
        let window = TimeWindow::new(
            TimeSlot::new(8, 0).expect("valid slot"),
            TimeSlot::new(18, 0).expect("valid slot"),
        )
        .expect("valid window");
        assert_eq!(window.minutes(), 600);
    }

    #[rstest]
    fn slot_serialises_as_clock_string() {
        let slot = TimeSlot::new(7, 5).expect("valid slot");
        assert_eq!(serde_json::to_string(&slot).expect("encode"), "\"07:05\"");
        let decoded: TimeSlot = serde_json::from_str("\"07:05\"").expect("decode");
        assert_eq!(decoded, slot);
    }

    #[rstest]
    fn window_deserialisation_validates_order() {
        let result: Result<TimeWindow, _> =
            serde_json::from_str(r#"{"start": "18:00", "end": "08:00"}"#);
        assert!(result.is_err());
    }
}
