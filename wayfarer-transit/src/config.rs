//! Resolver tuning knobs.

use std::time::Duration;

/// Configuration for [`crate::TransitRouteResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Directions calls allowed per principal per local day.
    pub directions_daily_limit: u32,
    /// Ask the provider for alternative routes and rank them.
    pub request_alternatives: bool,
    /// Cost added per transit ride when ranking alternatives.
    pub transfer_penalty: Duration,
    /// Most routes returned for one hop.
    pub max_alternatives: usize,
    /// Fall back to stored paratransit routes when the provider has no
    /// data or the quota is spent.
    pub direct_fallback: bool,
    /// How close a stored route must pass to board or alight, in metres.
    pub direct_search_radius_m: f64,
    /// Walking speed for estimated segments.
    ///
    /// Both speeds must be positive and finite; otherwise stored routes
    /// yield no estimates.
    pub walking_speed_kmh: f64,
    /// Paratransit speed for estimated segments.
    pub paratransit_speed_kmh: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            directions_daily_limit: 100,
            request_alternatives: false,
            transfer_penalty: Duration::from_secs(300),
            max_alternatives: 3,
            direct_fallback: true,
            direct_search_radius_m: 400.0,
            walking_speed_kmh: 5.0,
            paratransit_speed_kmh: 15.0,
        }
    }
}

impl ResolverConfig {
    /// Set the daily directions budget.
    #[must_use]
    pub const fn with_daily_limit(mut self, limit: u32) -> Self {
        self.directions_daily_limit = limit;
        self
    }

    /// Enable or disable alternative routes.
    #[must_use]
    pub const fn with_alternatives(mut self, enabled: bool) -> Self {
        self.request_alternatives = enabled;
        self
    }

    /// Enable or disable the stored-route fallback.
    #[must_use]
    pub const fn with_direct_fallback(mut self, enabled: bool) -> Self {
        self.direct_fallback = enabled;
        self
    }

    /// Set the boarding and alighting search radius.
    #[must_use]
    pub const fn with_direct_search_radius(mut self, radius_m: f64) -> Self {
        self.direct_search_radius_m = radius_m;
        self
    }
}
