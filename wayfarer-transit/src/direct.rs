//! Estimated routes along stored paratransit lines.
//!
//! A stored route qualifies when one of its waypoints lies within the
//! search radius of the destination and an earlier waypoint lies within
//! the radius of the origin. The resulting walk, ride, walk route uses
//! distance-based time estimates rather than provider timings.

use geo::Coord;
use log::{debug, warn};
use wayfarer_core::{
    RouteDefinition, RouteDefinitionStore, RouteSegment, TransitRoute, TravelMode, Waypoint,
    encode_polyline, haversine_distance,
};
use wayfarer_core::geometry::path_length;

use crate::ResolverConfig;

/// Walks shorter than this are dropped from estimated routes.
const MIN_WALK_METERS: f64 = 1.0;

/// Candidate routes from `store` for travelling `origin` to `destination`.
///
/// Both waypoints must carry valid coordinates; the caller checks them.
/// Results are ordered by estimated duration and capped at the configured
/// maximum number of alternatives. Without a positive, finite walking and
/// paratransit speed no duration can be estimated, so nothing is returned.
pub(crate) fn direct_routes(
    store: &(dyn RouteDefinitionStore + Send + Sync),
    origin: (&Waypoint, Coord<f64>),
    destination: (&Waypoint, Coord<f64>),
    config: &ResolverConfig,
) -> Vec<TransitRoute> {
    if !usable_speed(config.walking_speed_kmh) || !usable_speed(config.paratransit_speed_kmh) {
        warn!(
            "cannot estimate stored routes with walking speed {} km/h and paratransit speed {} km/h",
            config.walking_speed_kmh, config.paratransit_speed_kmh
        );
        return Vec::new();
    }
    let radius = config.direct_search_radius_m;
    let mut routes: Vec<TransitRoute> = store
        .routes_near(destination.1, radius)
        .filter_map(|definition| {
            let (board, alight) = boarding_span(&definition, origin.1, destination.1, radius)?;
            Some(build_route(&definition, board, alight, origin, destination, config))
        })
        .collect();
    routes.sort_by_key(TransitRoute::total_duration_seconds);
    routes.truncate(config.max_alternatives);
    debug!(
        "found {} stored route(s) within {radius} m of the destination",
        routes.len()
    );
    routes
}

/// Boarding and alighting waypoint indices, boarding strictly first.
fn boarding_span(
    definition: &RouteDefinition,
    origin: Coord<f64>,
    destination: Coord<f64>,
    radius: f64,
) -> Option<(usize, usize)> {
    let (board, board_distance) = definition.nearest_waypoint(origin)?;
    let (alight, alight_distance) = definition.nearest_waypoint(destination)?;
    (board_distance <= radius && alight_distance <= radius && board < alight)
        .then_some((board, alight))
}

fn build_route(
    definition: &RouteDefinition,
    board: usize,
    alight: usize,
    origin: (&Waypoint, Coord<f64>),
    destination: (&Waypoint, Coord<f64>),
    config: &ResolverConfig,
) -> TransitRoute {
    let ride: Vec<Coord<f64>> = definition
        .waypoints
        .iter()
        .skip(board)
        .take(alight - board + 1)
        .copied()
        .collect();
    let (Some(&board_at), Some(&alight_at)) = (ride.first(), ride.last()) else {
        return TransitRoute::default();
    };
    let boarding = Waypoint::named(format!("{} stop", definition.code), board_at);
    let alighting = Waypoint::named(format!("{} stop", definition.code), alight_at);

    let mut segments = Vec::with_capacity(3);
    if let Some(walk) = walk_segment(origin.0, origin.1, &boarding, board_at, config) {
        segments.push(walk);
    }
    let ride_meters = path_length(&ride);
    segments.push(
        RouteSegment::resolved(
            boarding.clone(),
            alighting.clone(),
            TravelMode::Paratransit,
            travel_seconds(ride_meters, config.paratransit_speed_kmh),
            rounded(ride_meters),
        )
        .with_route_code(definition.code.clone())
        .with_polyline(encode_polyline(&ride))
        .with_description(format!(
            "Take paratransit {} from {boarding} to {alighting} (estimated)",
            definition.code
        )),
    );
    if let Some(walk) = walk_segment(&alighting, alight_at, destination.0, destination.1, config) {
        segments.push(walk);
    }
    TransitRoute::new(segments)
}

fn walk_segment(
    from: &Waypoint,
    from_at: Coord<f64>,
    to: &Waypoint,
    to_at: Coord<f64>,
    config: &ResolverConfig,
) -> Option<RouteSegment> {
    let meters = haversine_distance(from_at, to_at);
    (meters >= MIN_WALK_METERS).then(|| {
        RouteSegment::resolved(
            from.clone(),
            to.clone(),
            TravelMode::Walk,
            travel_seconds(meters, config.walking_speed_kmh),
            rounded(meters),
        )
        .with_polyline(encode_polyline(&[from_at, to_at]))
        .with_description(format!("Walk to {to} (estimated)"))
    })
}

fn usable_speed(speed_kmh: f64) -> bool {
    speed_kmh.is_finite() && speed_kmh > 0.0
}

/// Seconds to cover `meters`; `speed_kmh` must satisfy [`usable_speed`].
fn travel_seconds(meters: f64, speed_kmh: f64) -> u32 {
    rounded(meters / (speed_kmh / 3.6))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to the u32 range before the cast"
)]
fn rounded(value: f64) -> u32 {
    if value.is_finite() {
        value.round().clamp(0.0, f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
