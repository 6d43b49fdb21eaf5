use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::{HopError, ResolutionStatus, TravelMode};
use crate::{Place, ScheduledStop};

/// A named or anonymous route endpoint.
///
/// The location is optional because stops may reference points of interest
/// without usable coordinates; such endpoints resolve to
/// [`ResolutionStatus::InvalidLocation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Coordinates, when known.
    #[serde(default)]
    pub location: Option<Coord<f64>>,
}

impl Waypoint {
    /// A named endpoint at `location`.
    #[must_use]
    pub fn named(name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            name: Some(name.into()),
            location: Some(location),
        }
    }

    /// An anonymous endpoint at `location`.
    #[must_use]
    pub const fn at(location: Coord<f64>) -> Self {
        Self {
            name: None,
            location: Some(location),
        }
    }

    /// Endpoint for a scheduled stop; invalid coordinates become `None`.
    #[must_use]
    pub fn from_stop(stop: &ScheduledStop) -> Self {
        Self {
            name: Some(stop.poi.name.clone()),
            location: stop.location(),
        }
    }

    /// Endpoint for a chosen food or lodging place.
    #[must_use]
    pub fn from_place(place: &Place) -> Self {
        Self::named(place.name.clone(), place.location)
    }

    /// Coordinates when present and finite.
    #[must_use]
    pub fn valid_location(&self) -> Option<Coord<f64>> {
        self.location
            .filter(|coord| coord.x.is_finite() && coord.y.is_finite())
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.location) {
            (Some(name), _) => f.write_str(name),
            (None, Some(coord)) => write!(f, "{:.5},{:.5}", coord.y, coord.x),
            (None, None) => f.write_str("unknown location"),
        }
    }
}

/// One movement between two waypoints.
///
/// Numeric fields are only populated for resolved segments. Unresolved hops
/// are represented by [`RouteSegment::placeholder`], which carries a status
/// and a description but no duration or distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    from: Waypoint,
    to: Waypoint,
    mode: Option<TravelMode>,
    route_code: Option<String>,
    duration_seconds: Option<u32>,
    distance_meters: Option<u32>,
    polyline: Option<String>,
    description: String,
    status: ResolutionStatus,
}

impl RouteSegment {
    /// A resolved segment with measured duration and distance.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use wayfarer_core::{ResolutionStatus, RouteSegment, TravelMode, Waypoint};
    ///
    /// let segment = RouteSegment::resolved(
    ///     Waypoint::at(Coord { x: 123.90, y: 10.29 }),
    ///     Waypoint::at(Coord { x: 123.89, y: 10.31 }),
    ///     TravelMode::Paratransit,
    ///     900,
    ///     3_200,
    /// )
    /// .with_route_code("04L");
    /// assert_eq!(segment.status(), ResolutionStatus::Resolved);
    /// assert_eq!(segment.duration_seconds(), Some(900));
    /// ```
    #[must_use]
    pub fn resolved(
        from: Waypoint,
        to: Waypoint,
        mode: TravelMode,
        duration_seconds: u32,
        distance_meters: u32,
    ) -> Self {
        Self {
            from,
            to,
            mode: Some(mode),
            route_code: None,
            duration_seconds: Some(duration_seconds),
            distance_meters: Some(distance_meters),
            polyline: None,
            description: String::new(),
            status: ResolutionStatus::Resolved,
        }
    }

    /// A segment standing in for a hop that could not be resolved.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::{HopError, ResolutionStatus, RouteSegment, Waypoint};
    ///
    /// let from = Waypoint { name: Some("Hotel".into()), location: None };
    /// let to = Waypoint { name: Some("Museum".into()), location: None };
    /// let segment = RouteSegment::placeholder(from, to, &HopError::NoRouteData);
    /// assert_eq!(segment.status(), ResolutionStatus::NoData);
    /// assert_eq!(segment.duration_seconds(), None);
    /// ```
    #[must_use]
    pub fn placeholder(from: Waypoint, to: Waypoint, error: &HopError) -> Self {
        Self {
            from,
            to,
            mode: None,
            route_code: None,
            duration_seconds: None,
            distance_meters: None,
            polyline: None,
            description: error.notice(),
            status: error.status(),
        }
    }

    /// Attach a route code such as `"04L"`.
    #[must_use]
    pub fn with_route_code(mut self, code: impl Into<String>) -> Self {
        self.route_code = Some(code.into());
        self
    }

    /// Attach an encoded polyline.
    #[must_use]
    pub fn with_polyline(mut self, polyline: impl Into<String>) -> Self {
        self.polyline = Some(polyline.into());
        self
    }

    /// Replace the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Start of the segment.
    #[must_use]
    pub const fn from(&self) -> &Waypoint {
        &self.from
    }

    /// End of the segment.
    #[must_use]
    pub const fn to(&self) -> &Waypoint {
        &self.to
    }

    /// Travel mode; `None` on placeholders.
    #[must_use]
    pub const fn mode(&self) -> Option<TravelMode> {
        self.mode
    }

    /// Short route code for transit segments.
    #[must_use]
    pub fn route_code(&self) -> Option<&str> {
        self.route_code.as_deref()
    }

    /// Duration in seconds; `None` on placeholders.
    #[must_use]
    pub const fn duration_seconds(&self) -> Option<u32> {
        self.duration_seconds
    }

    /// Distance in metres; `None` on placeholders.
    #[must_use]
    pub const fn distance_meters(&self) -> Option<u32> {
        self.distance_meters
    }

    /// Encoded path geometry.
    #[must_use]
    pub fn polyline(&self) -> Option<&str> {
        self.polyline.as_deref()
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Resolution status.
    #[must_use]
    pub const fn status(&self) -> ResolutionStatus {
        self.status
    }

    /// Whether the segment rides a transit vehicle.
    #[must_use]
    pub fn is_transit(&self) -> bool {
        self.mode.is_some_and(TravelMode::is_transit)
    }
}

/// An ordered list of resolved segments forming one candidate route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitRoute {
    /// Segments in travel order.
    pub segments: Vec<RouteSegment>,
}

impl TransitRoute {
    /// Wrap segments as a route.
    #[must_use]
    pub const fn new(segments: Vec<RouteSegment>) -> Self {
        Self { segments }
    }

    /// Summed duration of all segments.
    #[must_use]
    pub fn total_duration_seconds(&self) -> u64 {
        self.segments
            .iter()
            .filter_map(RouteSegment::duration_seconds)
            .map(u64::from)
            .sum()
    }

    /// Summed distance of all segments.
    #[must_use]
    pub fn total_distance_meters(&self) -> u64 {
        self.segments
            .iter()
            .filter_map(RouteSegment::distance_meters)
            .map(u64::from)
            .sum()
    }

    /// Number of transit vehicle rides.
    #[must_use]
    pub fn transit_segment_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_transit()).count()
    }
}
