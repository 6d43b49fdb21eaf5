//! Facade crate for the Wayfarer itinerary engine.
//!
//! This crate re-exports the core domain types and exposes the planner, the
//! transit routing layer and the HTTP/SQLite adapters behind feature flags.

#![forbid(unsafe_code)]

pub use wayfarer_core::{
    ChainHop, DayPlan, DirectionsError, DirectionsRequest, HopError, HopKind, ItineraryError,
    MealType, MemoryQuotaLog, MemoryRouteDefinitionStore, Place, PointOfInterest, ProviderRoute,
    QuotaGateway, QuotaGuard, QuotaLog, RequestContext, ResolutionStatus, RouteChain,
    RouteDefinition, RouteDefinitionStore, RouteSegment, ScheduledStop, ServiceRegion,
    StartLocationConfig, StartLocationResolver, TimeSlot, TimeWindow, TransitDirectionsProvider,
    TransitRoute, TravelMode, Waypoint, haversine_distance,
};

#[cfg(feature = "planner")]
pub use wayfarer_planner::{ItineraryPlanner, PlanRequest, SpotClusterer, TimeSlotScheduler};

#[cfg(feature = "transit")]
pub use wayfarer_transit::{HopResolver, ResolverConfig, RouteChainAssembler, TransitRouteResolver};

#[cfg(feature = "http")]
pub use wayfarer_data::directions::{HttpDirectionsProvider, HttpDirectionsProviderConfig};
#[cfg(feature = "http")]
pub use wayfarer_data::{SqliteQuotaLog, load_route_store};
