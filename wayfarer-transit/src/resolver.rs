//! Quota-gated transit directions for a single hop.

use std::fmt;

use geo::Coord;
use log::{debug, info, warn};
use serde_json::json;
use wayfarer_core::{
    DirectionsError, DirectionsRequest, HopEndpoint, HopError, QuotaGuard, RequestContext,
    RouteDefinitionStore, ServiceRegion, TransitDirectionsProvider, TransitRoute, Waypoint,
};

use crate::direct::direct_routes;
use crate::{ResolverConfig, convert_route, rank_routes};

/// API name under which directions calls are budgeted.
pub const DIRECTIONS_API: &str = "directions";

/// Endpoint recorded with each budgeted directions call.
pub const DIRECTIONS_ENDPOINT: &str = "/maps/api/directions/json";

/// Resolve one hop into candidate routes, best first.
///
/// Implemented by [`TransitRouteResolver`]; the route-chain assembler only
/// depends on this trait so tests can substitute scripted resolvers.
pub trait HopResolver {
    /// Routes from `from` to `to`, best first and never empty on success.
    ///
    /// # Errors
    /// Returns a [`HopError`] describing why no route is available.
    fn resolve_hop(
        &self,
        from: &Waypoint,
        to: &Waypoint,
        ctx: &RequestContext,
    ) -> Result<Vec<TransitRoute>, HopError>;
}

impl<R: HopResolver + ?Sized> HopResolver for &R {
    fn resolve_hop(
        &self,
        from: &Waypoint,
        to: &Waypoint,
        ctx: &RequestContext,
    ) -> Result<Vec<TransitRoute>, HopError> {
        (**self).resolve_hop(from, to, ctx)
    }
}

impl<R: HopResolver + ?Sized> HopResolver for Box<R> {
    fn resolve_hop(
        &self,
        from: &Waypoint,
        to: &Waypoint,
        ctx: &RequestContext,
    ) -> Result<Vec<TransitRoute>, HopError> {
        (**self).resolve_hop(from, to, ctx)
    }
}

type SharedRouteStore = Box<dyn RouteDefinitionStore + Send + Sync>;

/// Resolves hops through a [`TransitDirectionsProvider`] behind a
/// [`QuotaGuard`].
///
/// Every provider call is checked against the daily directions budget and
/// logged before it is issued. Routes without any transit ride are
/// discarded, since a walking-only answer means the provider found no
/// public transport. With a [`RouteDefinitionStore`] attached and
/// [`ResolverConfig::direct_fallback`] enabled, hops the provider cannot
/// serve are retried against stored paratransit routes.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::test_support::{
///     ScriptedDirectionsProvider, UnlimitedQuota, route, transit_step, walk_step,
/// };
/// use wayfarer_core::{RequestContext, ServiceRegion, Waypoint};
/// use wayfarer_transit::{ResolverConfig, TransitRouteResolver};
///
/// let hotel = Coord { x: 123.900, y: 10.300 };
/// let stop = Coord { x: 123.901, y: 10.301 };
/// let museum = Coord { x: 123.910, y: 10.320 };
/// let provider = ScriptedDirectionsProvider::new([Ok(vec![route(vec![
///     walk_step(hotel, stop, 120, 150),
///     transit_step(stop, museum, 900, 3_000, Some("04L Lahug"), None),
/// ])])]);
/// let resolver = TransitRouteResolver::new(
///     provider,
///     UnlimitedQuota::default(),
///     ServiceRegion::from_bounds(9.4, 123.2, 11.3, 124.1),
///     ResolverConfig::default(),
/// );
///
/// let routes = resolver.resolve(
///     &Waypoint::named("Hotel", hotel),
///     &Waypoint::named("Museum", museum),
///     &RequestContext::new(),
/// )?;
/// assert_eq!(routes[0].segments[1].route_code(), Some("04L"));
/// # Ok::<(), wayfarer_core::HopError>(())
/// ```
pub struct TransitRouteResolver<P, G> {
    provider: P,
    quota: G,
    region: ServiceRegion,
    config: ResolverConfig,
    route_definitions: Option<SharedRouteStore>,
}

impl<P: fmt::Debug, G: fmt::Debug> fmt::Debug for TransitRouteResolver<P, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitRouteResolver")
            .field("provider", &self.provider)
            .field("quota", &self.quota)
            .field("region", &self.region)
            .field("config", &self.config)
            .field(
                "route_definitions",
                &self.route_definitions.as_ref().map(|_| "<store>"),
            )
            .finish()
    }
}

impl<P, G> TransitRouteResolver<P, G>
where
    P: TransitDirectionsProvider,
    G: QuotaGuard,
{
    /// Resolver serving `region` through `provider`, budgeted by `quota`.
    #[must_use]
    pub const fn new(provider: P, quota: G, region: ServiceRegion, config: ResolverConfig) -> Self {
        Self {
            provider,
            quota,
            region,
            config,
            route_definitions: None,
        }
    }

    /// Attach a store of stored paratransit routes.
    #[must_use]
    pub fn with_route_definitions(
        mut self,
        store: impl RouteDefinitionStore + Send + Sync + 'static,
    ) -> Self {
        self.route_definitions = Some(Box::new(store));
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Region served by this resolver.
    #[must_use]
    pub const fn region(&self) -> ServiceRegion {
        self.region
    }

    /// Ask the provider for transit routes between two waypoints.
    ///
    /// Returns one route, or up to [`ResolverConfig::max_alternatives`]
    /// ranked routes when alternatives are enabled.
    ///
    /// # Errors
    /// - [`HopError::Cancelled`] when `ctx` is done before or during the call.
    /// - [`HopError::InvalidLocation`] when an endpoint lacks coordinates or
    ///   lies outside the region. No quota is consumed.
    /// - [`HopError::QuotaExceeded`] when the daily budget is spent.
    /// - [`HopError::ProviderError`] when the provider fails.
    /// - [`HopError::NoRouteData`] when no returned route includes transit.
    pub fn resolve(
        &self,
        from: &Waypoint,
        to: &Waypoint,
        ctx: &RequestContext,
    ) -> Result<Vec<TransitRoute>, HopError> {
        if ctx.is_done() {
            return Err(HopError::Cancelled);
        }
        let (origin, destination) = self.endpoints(from, to)?;

        if !self
            .quota
            .can_call(DIRECTIONS_API, self.config.directions_daily_limit)
        {
            info!("directions budget spent; skipping {from} -> {to}");
            return Err(HopError::QuotaExceeded {
                api: DIRECTIONS_API.to_owned(),
            });
        }

        let request = DirectionsRequest {
            origin,
            destination,
            alternatives: self.config.request_alternatives,
        };
        self.quota.log_call(
            DIRECTIONS_API,
            DIRECTIONS_ENDPOINT,
            json!({
                "origin": format!("{},{}", origin.y, origin.x),
                "destination": format!("{},{}", destination.y, destination.x),
                "mode": "transit",
                "alternatives": request.alternatives,
            }),
        );

        let provider_routes = self
            .provider
            .transit_directions(&request, ctx)
            .map_err(|err| match err {
                DirectionsError::Cancelled => HopError::Cancelled,
                other => {
                    warn!("directions lookup {from} -> {to} failed: {other}");
                    HopError::ProviderError {
                        message: other.to_string(),
                    }
                }
            })?;

        let candidates: Vec<TransitRoute> = provider_routes
            .iter()
            .filter(|route| route.has_transit())
            .filter_map(|route| convert_route(route, from, to))
            .collect();
        debug!(
            "{} of {} provider route(s) usable for {from} -> {to}",
            candidates.len(),
            provider_routes.len()
        );
        if candidates.is_empty() {
            return Err(HopError::NoRouteData);
        }

        if self.config.request_alternatives {
            Ok(rank_routes(
                candidates,
                self.config.transfer_penalty,
                self.config.max_alternatives.max(1),
            ))
        } else {
            Ok(candidates.into_iter().take(1).collect())
        }
    }

    /// Estimate routes along stored paratransit lines without calling the
    /// provider or consuming quota.
    ///
    /// # Errors
    /// - [`HopError::InvalidLocation`] for a missing or out-of-region
    ///   endpoint.
    /// - [`HopError::NoRouteData`] when no store is attached or no stored
    ///   route connects the endpoints.
    pub fn resolve_direct(
        &self,
        from: &Waypoint,
        to: &Waypoint,
    ) -> Result<Vec<TransitRoute>, HopError> {
        let (origin, destination) = self.endpoints(from, to)?;
        let Some(store) = self.route_definitions.as_deref() else {
            return Err(HopError::NoRouteData);
        };
        let routes = direct_routes(store, (from, origin), (to, destination), &self.config);
        if routes.is_empty() {
            Err(HopError::NoRouteData)
        } else {
            Ok(routes)
        }
    }

    fn endpoints(
        &self,
        from: &Waypoint,
        to: &Waypoint,
    ) -> Result<(Coord<f64>, Coord<f64>), HopError> {
        let origin = self.in_region(from, HopEndpoint::Origin)?;
        let destination = self.in_region(to, HopEndpoint::Destination)?;
        Ok((origin, destination))
    }

    fn in_region(&self, waypoint: &Waypoint, which: HopEndpoint) -> Result<Coord<f64>, HopError> {
        waypoint
            .valid_location()
            .filter(|location| self.region.contains(*location))
            .ok_or_else(|| {
                debug!("{which} {waypoint} is unusable for routing");
                HopError::InvalidLocation { which }
            })
    }

    const fn falls_back(&self, error: &HopError) -> bool {
        self.config.direct_fallback
            && self.route_definitions.is_some()
            && matches!(error, HopError::NoRouteData | HopError::QuotaExceeded { .. })
    }
}

impl<P, G> HopResolver for TransitRouteResolver<P, G>
where
    P: TransitDirectionsProvider,
    G: QuotaGuard,
{
    fn resolve_hop(
        &self,
        from: &Waypoint,
        to: &Waypoint,
        ctx: &RequestContext,
    ) -> Result<Vec<TransitRoute>, HopError> {
        match self.resolve(from, to, ctx) {
            Err(error) if self.falls_back(&error) => {
                debug!("trying stored routes for {from} -> {to} after: {error}");
                self.resolve_direct(from, to).map_err(|_| error)
            }
            outcome => outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use rstest::{fixture, rstest};
    use wayfarer_core::test_support::{
        FailingQuotaLog, ManualClock, ScriptedDirectionsProvider, UnlimitedQuota, route,
        transit_step, walk_step,
    };
    use wayfarer_core::{
        MemoryQuotaLog, MemoryRouteDefinitionStore, QuotaGateway, RouteDefinition, TravelMode,
    };

    const HOTEL: Coord<f64> = Coord { x: 123.900, y: 10.300 };
    const STOP: Coord<f64> = Coord { x: 123.901, y: 10.301 };
    const MUSEUM: Coord<f64> = Coord { x: 123.900, y: 10.330 };

    fn region() -> ServiceRegion {
        ServiceRegion::from_bounds(9.4, 123.2, 11.3, 124.1)
    }

    fn hotel() -> Waypoint {
        Waypoint::named("Hotel", HOTEL)
    }

    fn museum() -> Waypoint {
        Waypoint::named("Museum", MUSEUM)
    }

    fn jeepney_route(seconds: u32, name: &str) -> wayfarer_core::ProviderRoute {
        route(vec![
            walk_step(HOTEL, STOP, 120, 150),
            transit_step(STOP, MUSEUM, seconds, 3_000, Some(name), None),
        ])
    }

    fn resolver(
        provider: ScriptedDirectionsProvider,
    ) -> TransitRouteResolver<ScriptedDirectionsProvider, UnlimitedQuota> {
        TransitRouteResolver::new(
            provider,
            UnlimitedQuota::default(),
            region(),
            ResolverConfig::default(),
        )
    }

    #[fixture]
    fn stored_line() -> MemoryRouteDefinitionStore {
        MemoryRouteDefinitionStore::new(vec![RouteDefinition::new(
            "17B",
            vec![HOTEL, Coord { x: 123.900, y: 10.315 }, MUSEUM],
        )])
    }

    #[rstest]
    fn resolves_and_logs_before_calling() {
        let provider = ScriptedDirectionsProvider::new([Ok(vec![jeepney_route(900, "04L")])]);
        let quota = UnlimitedQuota::default();
        let resolver =
            TransitRouteResolver::new(provider.clone(), &quota, region(), ResolverConfig::default());

        let routes = resolver
            .resolve(&hotel(), &museum(), &RequestContext::new())
            .expect("route resolves");

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].segments[0].from(), &hotel());
        assert_eq!(routes[0].segments[1].mode(), Some(TravelMode::Paratransit));
        assert_eq!(quota.logged(), vec![DIRECTIONS_API.to_owned()]);
        assert_eq!(provider.calls(), 1);
        assert!(!provider.requests()[0].alternatives);
    }

    #[rstest]
    fn walking_only_answers_are_no_data() {
        let provider =
            ScriptedDirectionsProvider::new([Ok(vec![route(vec![walk_step(HOTEL, MUSEUM, 600, 700)])])]);
        let outcome = resolver(provider).resolve(&hotel(), &museum(), &RequestContext::new());
        assert_eq!(outcome, Err(HopError::NoRouteData));
    }

    #[rstest]
    fn empty_answers_are_no_data() {
        let provider = ScriptedDirectionsProvider::new([Ok(Vec::new())]);
        let outcome = resolver(provider).resolve(&hotel(), &museum(), &RequestContext::new());
        assert_eq!(outcome, Err(HopError::NoRouteData));
    }

    #[rstest]
    #[case(Waypoint::named("Nowhere", Coord { x: 121.0, y: 14.6 }), Waypoint::named("Museum", MUSEUM), HopEndpoint::Origin)]
    #[case(Waypoint::named("Hotel", HOTEL), Waypoint { name: Some("Lost".into()), location: None }, HopEndpoint::Destination)]
    #[case(Waypoint::named("Hotel", HOTEL), Waypoint::at(Coord { x: f64::NAN, y: 10.3 }), HopEndpoint::Destination)]
    fn invalid_locations_skip_the_provider(
        #[case] from: Waypoint,
        #[case] to: Waypoint,
        #[case] which: HopEndpoint,
    ) {
        let provider = ScriptedDirectionsProvider::default();
        let quota = UnlimitedQuota::default();
        let resolver =
            TransitRouteResolver::new(provider.clone(), &quota, region(), ResolverConfig::default());

        let outcome = resolver.resolve(&from, &to, &RequestContext::new());

        assert_eq!(outcome, Err(HopError::InvalidLocation { which }));
        assert_eq!(provider.calls(), 0);
        assert!(quota.logged().is_empty());
    }

    #[rstest]
    fn spent_budget_blocks_the_call() {
        let clock = ManualClock::at("2025-03-14T09:00:00+08:00");
        let gateway = QuotaGateway::with_clock(MemoryQuotaLog::new(), clock.clone(), "alice");
        let provider = ScriptedDirectionsProvider::always(Ok(vec![jeepney_route(900, "04L")]));
        let resolver = TransitRouteResolver::new(
            provider.clone(),
            &gateway,
            region(),
            ResolverConfig::default().with_daily_limit(1),
        );
        let ctx = RequestContext::new();

        assert!(resolver.resolve(&hotel(), &museum(), &ctx).is_ok());
        assert_eq!(
            resolver.resolve(&hotel(), &museum(), &ctx),
            Err(HopError::QuotaExceeded {
                api: DIRECTIONS_API.to_owned()
            })
        );
        assert_eq!(provider.calls(), 1);

        clock.advance(TimeDelta::days(1));
        assert!(resolver.resolve(&hotel(), &museum(), &ctx).is_ok());
    }

    #[rstest]
    fn unreadable_quota_log_fails_closed() {
        let gateway = QuotaGateway::new(FailingQuotaLog, "alice");
        let provider = ScriptedDirectionsProvider::always(Ok(vec![jeepney_route(900, "04L")]));
        let resolver =
            TransitRouteResolver::new(provider.clone(), gateway, region(), ResolverConfig::default());
        let outcome = resolver.resolve(&hotel(), &museum(), &RequestContext::new());
        assert!(matches!(outcome, Err(HopError::QuotaExceeded { .. })));
        assert_eq!(provider.calls(), 0);
    }

    #[rstest]
    fn provider_failures_keep_the_message() {
        let provider = ScriptedDirectionsProvider::new([Err(DirectionsError::ServiceError {
            code: "OVER_QUERY_LIMIT".into(),
            message: "slow down".into(),
        })]);
        let outcome = resolver(provider).resolve(&hotel(), &museum(), &RequestContext::new());
        match outcome {
            Err(HopError::ProviderError { message }) => assert!(message.contains("OVER_QUERY_LIMIT")),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[rstest]
    fn cancelled_context_short_circuits() {
        let provider = ScriptedDirectionsProvider::always(Ok(vec![jeepney_route(900, "04L")]));
        let ctx = RequestContext::new();
        ctx.cancel();
        let resolver = resolver(provider.clone());
        assert_eq!(
            resolver.resolve(&hotel(), &museum(), &ctx),
            Err(HopError::Cancelled)
        );
        assert_eq!(provider.calls(), 0);
    }

    #[rstest]
    fn alternatives_are_ranked_and_capped() {
        let provider = ScriptedDirectionsProvider::new([Ok(vec![
            jeepney_route(1_800, "01K"),
            jeepney_route(600, "04L"),
            jeepney_route(900, "MyBus 21"),
            jeepney_route(1_200, "12G"),
        ])]);
        let resolver = TransitRouteResolver::new(
            provider.clone(),
            UnlimitedQuota::default(),
            region(),
            ResolverConfig::default().with_alternatives(true),
        );

        let routes = resolver
            .resolve(&hotel(), &museum(), &RequestContext::new())
            .expect("routes resolve");

        let codes: Vec<Option<&str>> = routes
            .iter()
            .map(|route| route.segments[1].route_code())
            .collect();
        assert_eq!(codes, vec![Some("04L"), Some("21"), Some("12G")]);
        assert_eq!(routes[1].segments[1].mode(), Some(TravelMode::Bus));
        assert!(provider.requests()[0].alternatives);
    }

    #[rstest]
    fn falls_back_to_stored_routes(stored_line: MemoryRouteDefinitionStore) {
        let provider = ScriptedDirectionsProvider::new([Ok(Vec::new())]);
        let resolver = resolver(provider).with_route_definitions(stored_line);

        let routes = resolver
            .resolve_hop(&hotel(), &museum(), &RequestContext::new())
            .expect("stored route found");

        assert_eq!(routes[0].segments[0].route_code(), Some("17B"));
    }

    #[rstest]
    fn fallback_keeps_the_original_error(stored_line: MemoryRouteDefinitionStore) {
        let provider = ScriptedDirectionsProvider::new([Ok(Vec::new())]);
        let resolver = resolver(provider).with_route_definitions(stored_line);
        let backwards = resolver.resolve_hop(&museum(), &hotel(), &RequestContext::new());
        assert_eq!(backwards, Err(HopError::NoRouteData));
    }

    #[rstest]
    fn provider_errors_do_not_fall_back(stored_line: MemoryRouteDefinitionStore) {
        let provider = ScriptedDirectionsProvider::new([Err(DirectionsError::ParseError {
            message: "truncated".into(),
        })]);
        let resolver = resolver(provider).with_route_definitions(stored_line);
        let outcome = resolver.resolve_hop(&hotel(), &museum(), &RequestContext::new());
        assert!(matches!(outcome, Err(HopError::ProviderError { .. })));
    }

    #[rstest]
    fn direct_resolution_needs_a_store() {
        let resolver = resolver(ScriptedDirectionsProvider::default());
        assert_eq!(
            resolver.resolve_direct(&hotel(), &museum()),
            Err(HopError::NoRouteData)
        );
    }
}
