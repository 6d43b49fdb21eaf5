//! Response types for Google-style transit directions.
//!
//! Only the fields the resolver consumes are modelled; everything else in
//! the payload is ignored.

use serde::Deserialize;

/// Top-level directions response.
#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    /// Status code such as `"OK"`, `"ZERO_RESULTS"` or `"REQUEST_DENIED"`.
    pub status: String,
    /// Optional explanation accompanying a non-`OK` status.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Candidate routes.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl DirectionsResponse {
    /// Whether the service produced routes.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }

    /// Whether the service found nothing between the endpoints.
    #[must_use]
    pub fn is_zero_results(&self) -> bool {
        self.status == "ZERO_RESULTS"
    }
}

/// One candidate route.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Legs; a request without waypoints has exactly one.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// One leg of a route.
#[derive(Debug, Deserialize)]
pub struct Leg {
    /// Steps in travel order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One step of a leg.
#[derive(Debug, Deserialize)]
pub struct Step {
    /// `"WALKING"`, `"TRANSIT"` and so on.
    pub travel_mode: String,
    /// Step duration.
    #[serde(default)]
    pub duration: Option<Measure>,
    /// Step distance.
    #[serde(default)]
    pub distance: Option<Measure>,
    /// Where the step starts.
    pub start_location: LatLng,
    /// Where the step ends.
    pub end_location: LatLng,
    /// Encoded geometry.
    #[serde(default)]
    pub polyline: Option<Polyline>,
    /// HTML instructions.
    #[serde(default)]
    pub html_instructions: Option<String>,
    /// Ride details on transit steps.
    #[serde(default)]
    pub transit_details: Option<TransitDetails>,
}

/// A numeric value with display text; only the value is kept.
#[derive(Debug, Deserialize)]
pub struct Measure {
    /// Seconds or metres.
    pub value: u32,
}

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Encoded polyline wrapper.
#[derive(Debug, Deserialize)]
pub struct Polyline {
    /// Encoded points.
    pub points: String,
}

/// Ride details of a transit step.
#[derive(Debug, Deserialize)]
pub struct TransitDetails {
    /// Line ridden.
    #[serde(default)]
    pub line: Option<Line>,
    /// Boarding stop.
    #[serde(default)]
    pub departure_stop: Option<Stop>,
    /// Alighting stop.
    #[serde(default)]
    pub arrival_stop: Option<Stop>,
}

/// Transit line names.
#[derive(Debug, Deserialize)]
pub struct Line {
    /// Long name.
    #[serde(default)]
    pub name: Option<String>,
    /// Short name, often the route number.
    #[serde(default)]
    pub short_name: Option<String>,
}

/// A named transit stop.
#[derive(Debug, Deserialize)]
pub struct Stop {
    /// Stop name.
    #[serde(default)]
    pub name: Option<String>,
}
