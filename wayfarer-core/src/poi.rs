use geo::Coord;
use serde::{Deserialize, Serialize};

/// A location a traveller wants to visit.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Catalogue
/// entries occasionally lack a usable position, so `location` is optional and
/// [`PointOfInterest::valid_location`] filters out non-finite values.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::PointOfInterest;
///
/// let poi = PointOfInterest::new(1, "Fort San Pedro", Coord { x: 123.905, y: 10.292 });
///
/// assert_eq!(poi.id, 1);
/// assert!(poi.valid_location().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Catalogue identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Geospatial position, when the catalogue has one.
    #[serde(default)]
    pub location: Option<Coord<f64>>,
    /// Free-form category such as `"museum"` or `"beach"`.
    #[serde(default)]
    pub category: Option<String>,
    /// Suggested visit length from the catalogue.
    ///
    /// Informational only: it travels with the point into planned stops,
    /// but scheduling sizes stops from the daily window.
    #[serde(default)]
    pub default_duration_minutes: Option<u32>,
}

impl PointOfInterest {
    /// Construct a located `PointOfInterest` without category or duration.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            location: Some(location),
            category: None,
            default_duration_minutes: None,
        }
    }

    /// Construct a `PointOfInterest` that has no known position.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::PointOfInterest;
    ///
    /// let poi = PointOfInterest::unlocated(7, "Hidden Falls");
    /// assert!(poi.valid_location().is_none());
    /// ```
    #[must_use]
    pub fn unlocated(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: None,
            category: None,
            default_duration_minutes: None,
        }
    }

    /// Attach a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Return the location when present and finite in both axes.
    #[must_use]
    pub fn valid_location(&self) -> Option<Coord<f64>> {
        self.location
            .filter(|coord| coord.x.is_finite() && coord.y.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Coord { x: f64::NAN, y: 10.0 })]
    #[case(Coord { x: 123.0, y: f64::INFINITY })]
    fn non_finite_location_is_invalid(#[case] location: Coord<f64>) {
        let poi = PointOfInterest::new(1, "Broken", location);
        assert!(poi.valid_location().is_none());
    }

    #[rstest]
    fn deserialises_without_optional_fields() {
        let poi: PointOfInterest =
            serde_json::from_str(r#"{"id": 3, "name": "Museo Sugbo"}"#).expect("decode poi");
        assert_eq!(poi, PointOfInterest::unlocated(3, "Museo Sugbo"));
    }
}
