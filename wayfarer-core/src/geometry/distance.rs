use geo::Coord;

/// Earth radius used for great-circle distances.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in metres between two coordinates.
///
/// The latitude and longitude deltas are taken as absolute values before the
/// half-angle sines are squared, so swapping the arguments yields a
/// bit-identical result.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::haversine_distance;
///
/// let a = Coord { x: 123.8854, y: 10.3157 };
/// let b = Coord { x: 123.9050, y: 10.2925 };
///
/// assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
/// assert_eq!(haversine_distance(a, a), 0.0);
/// ```
#[must_use]
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).abs().to_radians();
    let d_lng = (b.x - a.x).abs().to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.y.to_radians().cos() * b.y.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Sum of haversine distances along consecutive points of `path`.
#[must_use]
pub fn path_length(path: &[Coord<f64>]) -> f64 {
    path.windows(2)
        .map(|pair| match pair {
            [from, to] => haversine_distance(*from, *to),
            _ => 0.0,
        })
        .sum()
}
