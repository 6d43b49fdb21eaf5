//! Stored paratransit route documents.
//!
//! Local fixed routes are not always known to the external provider. A
//! [`RouteDefinitionStore`] answers "which routes pass near this point",
//! letting the resolver build a direct walk → ride → walk route without
//! spending directions quota.

use std::collections::BTreeSet;
use std::fmt;

use geo::Coord;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use serde::{Deserialize, Serialize};

use crate::geometry::{EARTH_RADIUS_METERS, haversine_distance};

/// One stored route: a code and its ordered waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Route code shown to travellers, e.g. `"04L"`.
    pub code: String,
    /// Optional descriptive name.
    #[serde(default)]
    pub name: Option<String>,
    /// Waypoints in travel order.
    pub waypoints: Vec<Coord<f64>>,
}

impl RouteDefinition {
    /// Construct a route definition.
    #[must_use]
    pub fn new(code: impl Into<String>, waypoints: Vec<Coord<f64>>) -> Self {
        Self {
            code: code.into(),
            name: None,
            waypoints,
        }
    }

    /// Index and distance of the waypoint closest to `point`.
    ///
    /// Ties keep the earliest waypoint.
    #[must_use]
    pub fn nearest_waypoint(&self, point: Coord<f64>) -> Option<(usize, f64)> {
        self.waypoints
            .iter()
            .enumerate()
            .map(|(index, waypoint)| (index, haversine_distance(*waypoint, point)))
            .fold(None, |best, candidate| match best {
                Some((_, best_distance)) if best_distance <= candidate.1 => best,
                _ => Some(candidate),
            })
    }
}

/// Read-only access to stored route definitions.
pub trait RouteDefinitionStore {
    /// Routes with at least one waypoint within `radius_m` metres of
    /// `point`.
    fn routes_near(
        &self,
        point: Coord<f64>,
        radius_m: f64,
    ) -> Box<dyn Iterator<Item = RouteDefinition> + Send + '_>;
}

type IndexedWaypoint = GeomWithData<[f64; 2], usize>;

/// In-memory [`RouteDefinitionStore`] indexing waypoints in an R\*-tree.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{MemoryRouteDefinitionStore, RouteDefinition, RouteDefinitionStore};
///
/// let store = MemoryRouteDefinitionStore::new(vec![RouteDefinition::new(
///     "04L",
///     vec![Coord { x: 123.900, y: 10.300 }, Coord { x: 123.910, y: 10.330 }],
/// )]);
/// let near: Vec<_> = store.routes_near(Coord { x: 123.9101, y: 10.3301 }, 100.0).collect();
/// assert_eq!(near.len(), 1);
/// ```
pub struct MemoryRouteDefinitionStore {
    routes: Vec<RouteDefinition>,
    index: RTree<IndexedWaypoint>,
}

impl fmt::Debug for MemoryRouteDefinitionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRouteDefinitionStore")
            .field("routes", &self.routes.len())
            .field("waypoints", &self.index.size())
            .finish()
    }
}

impl MemoryRouteDefinitionStore {
    /// Index `routes`; waypoints with non-finite coordinates are skipped.
    #[must_use]
    pub fn new(routes: Vec<RouteDefinition>) -> Self {
        let entries = routes
            .iter()
            .enumerate()
            .flat_map(|(route, definition)| {
                definition
                    .waypoints
                    .iter()
                    .filter(|coord| coord.x.is_finite() && coord.y.is_finite())
                    .map(move |coord| IndexedWaypoint::new([coord.x, coord.y], route))
            })
            .collect();
        Self {
            routes,
            index: RTree::bulk_load(entries),
        }
    }

    /// Number of stored routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the store holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteDefinitionStore for MemoryRouteDefinitionStore {
    fn routes_near(
        &self,
        point: Coord<f64>,
        radius_m: f64,
    ) -> Box<dyn Iterator<Item = RouteDefinition> + Send + '_> {
        if !(point.x.is_finite() && point.y.is_finite() && radius_m.is_finite()) {
            return Box::new(std::iter::empty());
        }
        let envelope = search_envelope(point, radius_m);
        // Deduplicate by route index and keep storage order.
        let matches: BTreeSet<usize> = self
            .index
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| {
                let [x, y] = *entry.geom();
                haversine_distance(Coord { x, y }, point) <= radius_m
            })
            .map(|entry| entry.data)
            .collect();
        Box::new(
            matches
                .into_iter()
                .filter_map(move |route| self.routes.get(route).cloned()),
        )
    }
}

/// Degree-space box enclosing a circle of `radius_m` around `point`.
fn search_envelope(point: Coord<f64>, radius_m: f64) -> AABB<[f64; 2]> {
    let lat_delta = (radius_m / EARTH_RADIUS_METERS).to_degrees();
    let cos_lat = point.y.to_radians().cos().abs().max(1e-6);
    let lng_delta = (lat_delta / cos_lat).min(180.0);
    AABB::from_corners(
        [point.x - lng_delta, point.y - lat_delta],
        [point.x + lng_delta, point.y + lat_delta],
    )
}
