use serde::{Deserialize, Serialize};

use super::{HopError, ResolutionStatus, RouteSegment, TransitRoute, Waypoint};

/// Role of a hop within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopKind {
    /// From the traveller's start location to the first stop.
    StartToStop,
    /// Between two consecutive stops.
    StopToStop,
    /// From a stop to the restaurant chosen for its meal.
    StopToFood,
    /// From the restaurant back to the next stop.
    FoodToStop,
    /// From the last stop to the night's lodging.
    StopToLodging,
}

/// One resolved or unresolved hop together with its segments.
///
/// An unresolved hop holds exactly one placeholder segment and no
/// alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainHop {
    /// Role of the hop.
    pub kind: HopKind,
    /// Hop origin.
    pub from: Waypoint,
    /// Hop destination.
    pub to: Waypoint,
    /// Outcome of resolution.
    pub status: ResolutionStatus,
    /// Segments of the chosen route, or a single placeholder.
    pub segments: Vec<RouteSegment>,
    /// Further ranked candidates, best first.
    #[serde(default)]
    pub alternatives: Vec<TransitRoute>,
}

impl ChainHop {
    /// Build a hop from ranked candidate routes; the first is chosen.
    ///
    /// An empty candidate list is recorded as
    /// [`ResolutionStatus::NoData`].
    #[must_use]
    pub fn resolved(kind: HopKind, from: Waypoint, to: Waypoint, routes: Vec<TransitRoute>) -> Self {
        let mut routes = routes.into_iter();
        let Some(chosen) = routes.next() else {
            return Self::failed(kind, from, to, &HopError::NoRouteData);
        };
        Self {
            kind,
            from,
            to,
            status: ResolutionStatus::Resolved,
            segments: chosen.segments,
            alternatives: routes.collect(),
        }
    }

    /// Build a placeholder hop for a resolution failure.
    #[must_use]
    pub fn failed(kind: HopKind, from: Waypoint, to: Waypoint, error: &HopError) -> Self {
        let placeholder = RouteSegment::placeholder(from.clone(), to.clone(), error);
        Self {
            kind,
            from,
            to,
            status: error.status(),
            segments: vec![placeholder],
            alternatives: Vec::new(),
        }
    }

    /// Build a hop from a resolver outcome.
    #[must_use]
    pub fn from_outcome(
        kind: HopKind,
        from: Waypoint,
        to: Waypoint,
        outcome: Result<Vec<TransitRoute>, HopError>,
    ) -> Self {
        match outcome {
            Ok(routes) => Self::resolved(kind, from, to, routes),
            Err(error) => Self::failed(kind, from, to, &error),
        }
    }

    /// Whether the hop was resolved.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.status.is_resolved()
    }
}

/// Ordered hops for one day.
///
/// Aggregates only count resolved segments, so a chain with failures
/// under-reports rather than inventing travel time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteChain {
    /// Day the chain belongs to.
    pub day_index: usize,
    /// Hops in travel order.
    pub hops: Vec<ChainHop>,
}

impl RouteChain {
    /// An empty chain for `day_index`.
    #[must_use]
    pub const fn new(day_index: usize) -> Self {
        Self {
            day_index,
            hops: Vec::new(),
        }
    }

    /// Append a hop.
    pub fn push(&mut self, hop: ChainHop) {
        self.hops.push(hop);
    }

    /// Number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Whether the chain has no hops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// All segments in travel order, placeholders included.
    pub fn segments(&self) -> impl Iterator<Item = &RouteSegment> {
        self.hops.iter().flat_map(|hop| hop.segments.iter())
    }

    /// Total duration over resolved segments.
    #[must_use]
    pub fn total_duration_seconds(&self) -> u64 {
        self.resolved_segments()
            .filter_map(RouteSegment::duration_seconds)
            .map(u64::from)
            .sum()
    }

    /// Total distance over resolved segments.
    #[must_use]
    pub fn total_distance_meters(&self) -> u64 {
        self.resolved_segments()
            .filter_map(RouteSegment::distance_meters)
            .map(u64::from)
            .sum()
    }

    /// Hops that could not be resolved.
    #[must_use]
    pub fn failures(&self) -> Vec<&ChainHop> {
        self.hops.iter().filter(|hop| !hop.is_resolved()).collect()
    }

    /// Whether every hop was resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.hops.iter().all(ChainHop::is_resolved)
    }

    fn resolved_segments(&self) -> impl Iterator<Item = &RouteSegment> {
        self.segments()
            .filter(|segment| segment.status().is_resolved())
    }
}
