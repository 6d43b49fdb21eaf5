//! Core domain types for the Wayfarer itinerary engine.
//!
//! The crate holds the value objects exchanged between the planner and the
//! routing layers (points of interest, scheduled stops, day plans, route
//! segments and chains) together with the boundary traits that external
//! collaborators implement: the transit directions provider, the quota log,
//! the geolocation sensor and the route-definition store.
//!
//! Boundaries:
//! - No network or disk I/O lives here; adapters live in `wayfarer-data`.
//! - Expected failures are values, never panics.

#![forbid(unsafe_code)]

pub mod clock;
pub mod context;
pub mod directions;
pub mod geometry;
mod itinerary;
pub mod location;
mod poi;
pub mod quota;
mod route;
pub mod route_definition;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, SystemClock};
pub use context::RequestContext;
pub use directions::{
    DirectionsError, DirectionsRequest, ProviderRoute, ProviderStep, StepTravelMode, TransitLine,
    TransitDirectionsProvider,
};
pub use geometry::{ServiceRegion, decode_polyline, encode_polyline, haversine_distance};
pub use itinerary::{
    DEFAULT_STOP_MINUTES, DayPlan, ItineraryError, MealType, Place, ScheduledStop, TimeSlot,
    TimeWindow, duration_label,
};
pub use location::{
    LocationSensor, PositionCallback, PositionFix, PositionOptions, SensorError, StartLocation,
    StartLocationConfig, StartLocationResolver, StartSource, UnavailableSensor, WatchId,
};
pub use poi::PointOfInterest;
pub use quota::{MemoryQuotaLog, QuotaGateway, QuotaGuard, QuotaLog, QuotaLogError, QuotaRecord};
pub use route::{
    ChainHop, HopEndpoint, HopError, HopKind, ResolutionStatus, RouteChain, RouteSegment,
    TransitRoute, TravelMode, Waypoint,
};
pub use route_definition::{MemoryRouteDefinitionStore, RouteDefinition, RouteDefinitionStore};
