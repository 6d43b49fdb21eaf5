//! Geometry helpers shared by the planner and the routing layers.
//!
//! Coordinates are WGS84 [`Coord`](geo::Coord) values with `x = longitude`
//! and `y = latitude`, matching the rest of the crate.

mod distance;
mod polyline;
mod region;

pub use distance::{EARTH_RADIUS_METERS, haversine_distance, path_length};
pub use polyline::{PolylineError, decode_polyline, encode_polyline};
pub use region::ServiceRegion;
