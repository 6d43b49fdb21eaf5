//! Ordering of alternative routes for one hop.

use std::time::Duration;

use wayfarer_core::TransitRoute;

/// Order `routes` by travel time plus `transfer_penalty` per transit ride,
/// keeping at most `max` of them.
///
/// The sort is stable, so equally ranked routes keep provider order.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use wayfarer_transit::rank_routes;
///
/// assert!(rank_routes(Vec::new(), Duration::from_secs(300), 3).is_empty());
/// ```
#[must_use]
pub fn rank_routes(
    mut routes: Vec<TransitRoute>,
    transfer_penalty: Duration,
    max: usize,
) -> Vec<TransitRoute> {
    let penalty = transfer_penalty.as_secs();
    routes.sort_by_cached_key(|route| cost(route, penalty));
    routes.truncate(max);
    routes
}

fn cost(route: &TransitRoute, penalty_secs: u64) -> u64 {
    let rides = u64::try_from(route.transit_segment_count()).unwrap_or(u64::MAX);
    route
        .total_duration_seconds()
        .saturating_add(penalty_secs.saturating_mul(rides))
}
