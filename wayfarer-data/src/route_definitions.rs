//! Loading stored paratransit routes from JSON documents.

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use thiserror::Error;
use wayfarer_core::{MemoryRouteDefinitionStore, RouteDefinition};

use crate::fs::read_to_string;

/// Errors raised when loading route definitions.
#[derive(Debug, Error)]
pub enum RouteDefinitionError {
    /// The file could not be read.
    #[error("failed to read route definitions from {path:?}")]
    Read {
        /// Source file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a JSON array of route documents.
    #[error("failed to parse route definitions in {path:?}")]
    Parse {
        /// Source file.
        path: Utf8PathBuf,
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
}

/// Parse route documents from JSON text.
///
/// Documents with fewer than two waypoints, or with non-finite
/// coordinates, cannot be ridden and are skipped with a warning.
///
/// # Errors
/// Returns the `serde_json` error when `json` is not an array of route
/// documents.
///
/// # Examples
/// ```
/// use wayfarer_data::parse_route_definitions;
///
/// let routes = parse_route_definitions(
///     r#"[{"code": "04L", "waypoints": [{"x": 123.90, "y": 10.30}, {"x": 123.90, "y": 10.33}]}]"#,
/// )?;
/// assert_eq!(routes[0].code, "04L");
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn parse_route_definitions(json: &str) -> Result<Vec<RouteDefinition>, serde_json::Error> {
    let documents: Vec<RouteDefinition> = serde_json::from_str(json)?;
    Ok(documents.into_iter().filter(is_rideable).collect())
}

/// Load route documents from a JSON file.
///
/// # Errors
/// Returns [`RouteDefinitionError`] when the file cannot be read or parsed.
pub fn load_route_definitions(
    path: &Utf8Path,
) -> Result<Vec<RouteDefinition>, RouteDefinitionError> {
    let json = read_to_string(path).map_err(|source| RouteDefinitionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let routes = parse_route_definitions(&json).map_err(|source| RouteDefinitionError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loaded {} route definition(s) from {path}", routes.len());
    Ok(routes)
}

/// Load route documents from a JSON file into an indexed store.
///
/// # Errors
/// Returns [`RouteDefinitionError`] when the file cannot be read or parsed.
pub fn load_route_store(
    path: &Utf8Path,
) -> Result<MemoryRouteDefinitionStore, RouteDefinitionError> {
    load_route_definitions(path).map(MemoryRouteDefinitionStore::new)
}

fn is_rideable(route: &RouteDefinition) -> bool {
    let finite = route
        .waypoints
        .iter()
        .all(|point| point.x.is_finite() && point.y.is_finite());
    let rideable = finite && route.waypoints.len() >= 2;
    if !rideable {
        warn!("skipping route definition {}: unusable waypoints", route.code);
    }
    rideable
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;
    use wayfarer_core::RouteDefinitionStore;

    const DOCUMENTS: &str = r#"[
        {"code": "04L", "name": "Lahug - Carbon", "waypoints": [
            {"x": 123.900, "y": 10.300}, {"x": 123.900, "y": 10.330}
        ]},
        {"code": "stub", "waypoints": [{"x": 123.9, "y": 10.3}]}
    ]"#;

    #[rstest]
    fn skips_routes_that_cannot_be_ridden() {
        let routes = parse_route_definitions(DOCUMENTS).expect("valid json");
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].name.as_deref(), Some("Lahug - Carbon"));
    }

    #[rstest]
    fn loads_an_indexed_store_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("routes.json"))
            .expect("utf-8 temp path");
        std::fs::write(path.as_std_path(), DOCUMENTS).expect("write fixture");

        let store = load_route_store(&path).expect("load store");
        let near: Vec<RouteDefinition> = store
            .routes_near(geo::Coord { x: 123.9001, y: 10.3301 }, 50.0)
            .collect();
        assert_eq!(near.len(), 1);
    }

    #[rstest]
    fn reports_missing_files() {
        let err = load_route_definitions(Utf8Path::new("/nonexistent/routes.json"))
            .expect_err("missing file");
        assert!(matches!(err, RouteDefinitionError::Read { .. }));
    }

    #[rstest]
    fn reports_malformed_json() {
        let dir = TempDir::new().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("routes.json"))
            .expect("utf-8 temp path");
        std::fs::write(path.as_std_path(), "{\"code\": 1}").expect("write fixture");

        let err = load_route_definitions(&path).expect_err("malformed file");
        assert!(matches!(err, RouteDefinitionError::Parse { .. }));
    }
}
