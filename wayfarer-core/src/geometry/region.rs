use geo::{Coord, Intersects, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box the transit provider can serve.
///
/// Coordinates outside the box are rejected before any provider call is
/// issued. Containment includes boundary points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::ServiceRegion;
///
/// let region = ServiceRegion::from_bounds(9.4, 123.2, 11.3, 124.1);
/// assert!(region.contains(Coord { x: 123.8854, y: 10.3157 }));
/// assert!(!region.contains(Coord { x: 121.0, y: 14.6 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRegion {
    bounds: Rect<f64>,
}

impl ServiceRegion {
    /// Build a region from two opposite corners; corner order is normalised.
    #[must_use]
    pub fn new(corner_a: Coord<f64>, corner_b: Coord<f64>) -> Self {
        Self {
            bounds: Rect::new(corner_a, corner_b),
        }
    }

    /// Build a region from south/west/north/east bounds in degrees.
    #[must_use]
    pub fn from_bounds(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(Coord { x: west, y: south }, Coord { x: east, y: north })
    }

    /// Return the underlying rectangle.
    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Test whether `location` lies inside the region.
    ///
    /// Non-finite coordinates are never inside.
    #[must_use]
    pub fn contains(&self, location: Coord<f64>) -> bool {
        location.x.is_finite() && location.y.is_finite() && self.bounds.intersects(&location)
    }

    /// Latitude/longitude form of [`ServiceRegion::contains`].
    #[must_use]
    pub fn contains_lat_lng(&self, lat: f64, lng: f64) -> bool {
        self.contains(Coord { x: lng, y: lat })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn region() -> ServiceRegion {
        ServiceRegion::from_bounds(-1.0, -1.0, 1.0, 1.0)
    }

    #[rstest]
    #[case(-1.0, 0.0)] // south edge
    #[case(1.0, 0.0)] // north edge
    #[case(0.0, -1.0)] // west edge
    #[case(1.0, 1.0)] // north-east corner
    fn includes_boundary(region: ServiceRegion, #[case] lat: f64, #[case] lng: f64) {
        assert!(region.contains_lat_lng(lat, lng));
    }

    #[rstest]
    #[case(1.000_000_1, 0.0)]
    #[case(0.0, -1.000_000_1)]
    #[case(f64::NAN, 0.0)]
    fn excludes_outside_and_non_finite(region: ServiceRegion, #[case] lat: f64, #[case] lng: f64) {
        assert!(!region.contains_lat_lng(lat, lng));
    }

    #[rstest]
    fn corner_order_is_normalised() {
        let flipped = ServiceRegion::from_bounds(1.0, 1.0, -1.0, -1.0);
        assert!(flipped.contains_lat_lng(0.0, 0.0));
    }
}
