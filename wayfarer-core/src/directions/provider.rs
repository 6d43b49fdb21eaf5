//! Provider trait and the route shapes it returns.

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::error::DirectionsError;
use crate::RequestContext;

/// A transit-mode directions query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionsRequest {
    /// Journey origin.
    pub origin: Coord<f64>,
    /// Journey destination.
    pub destination: Coord<f64>,
    /// Whether alternative routes should be returned.
    pub alternatives: bool,
}

/// Travel mode reported for one provider step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepTravelMode {
    /// On foot.
    Walking,
    /// Aboard a transit line.
    Transit,
    /// Any other mode the provider may report.
    Other(String),
}

impl StepTravelMode {
    /// Parse the provider's upper-case mode tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "WALKING" => Self::Walking,
            "TRANSIT" => Self::Transit,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Transit line metadata attached to a transit step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitLine {
    /// Long line name, e.g. `"04L Lahug - Carbon"`.
    pub name: Option<String>,
    /// Short line name, e.g. `"04L"`.
    pub short_name: Option<String>,
}

/// One leg step as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStep {
    /// Reported travel mode.
    pub travel_mode: StepTravelMode,
    /// Step duration in seconds.
    pub duration_seconds: u32,
    /// Step distance in metres.
    pub distance_meters: u32,
    /// Where the step starts.
    pub start_location: Coord<f64>,
    /// Where the step ends.
    pub end_location: Coord<f64>,
    /// Encoded path geometry.
    pub polyline: Option<String>,
    /// Human-readable instruction text.
    pub instructions: Option<String>,
    /// Line metadata for transit steps.
    pub line: Option<TransitLine>,
    /// Boarding stop name for transit steps.
    pub departure_stop: Option<String>,
    /// Alighting stop name for transit steps.
    pub arrival_stop: Option<String>,
}

/// One candidate route: the steps of its first leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRoute {
    /// Ordered steps.
    pub steps: Vec<ProviderStep>,
}

impl ProviderRoute {
    /// Whether any step rides a transit line.
    #[must_use]
    pub fn has_transit(&self) -> bool {
        self.steps
            .iter()
            .any(|step| step.travel_mode == StepTravelMode::Transit)
    }
}

/// Fetch transit directions between two coordinates.
///
/// Implementations return `Ok(vec![])` when the provider finds no route;
/// errors are reserved for transport, HTTP, service and decoding failures.
///
/// # Examples
/// ```
/// use wayfarer_core::{
///     DirectionsError, DirectionsRequest, ProviderRoute, RequestContext,
///     TransitDirectionsProvider,
/// };
///
/// struct Offline;
///
/// impl TransitDirectionsProvider for Offline {
///     fn transit_directions(
///         &self,
///         _request: &DirectionsRequest,
///         _ctx: &RequestContext,
///     ) -> Result<Vec<ProviderRoute>, DirectionsError> {
///         Err(DirectionsError::NetworkError {
///             url: "offline".into(),
///             message: "no connectivity".into(),
///         })
///     }
/// }
/// ```
pub trait TransitDirectionsProvider {
    /// Return candidate routes for `request`.
    ///
    /// Implementations must return [`DirectionsError::Cancelled`] when `ctx`
    /// is done before the response arrives.
    fn transit_directions(
        &self,
        request: &DirectionsRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<ProviderRoute>, DirectionsError>;
}

impl<P: TransitDirectionsProvider + ?Sized> TransitDirectionsProvider for &P {
    fn transit_directions(
        &self,
        request: &DirectionsRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        (**self).transit_directions(request, ctx)
    }
}

impl<P: TransitDirectionsProvider + ?Sized> TransitDirectionsProvider for Box<P> {
    fn transit_directions(
        &self,
        request: &DirectionsRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        (**self).transit_directions(request, ctx)
    }
}
