//! HTTP-based [`TransitDirectionsProvider`] for Google-style directions.
//!
//! The [`TransitDirectionsProvider`] trait is synchronous so the resolver
//! stays embeddable in synchronous callers. This provider bridges the async
//! HTTP call to the sync interface by blocking on a Tokio runtime
//! internally, racing the request against the caller's cancellation token.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use wayfarer_core::{DirectionsRequest, RequestContext, TransitDirectionsProvider};
//! use wayfarer_data::directions::{HttpDirectionsProvider, HttpDirectionsProviderConfig};
//!
//! let config = HttpDirectionsProviderConfig::new("secret-key");
//! let provider = HttpDirectionsProvider::with_config(config)?;
//! let request = DirectionsRequest {
//!     origin: Coord { x: 123.8854, y: 10.3157 },
//!     destination: Coord { x: 123.9019, y: 10.2934 },
//!     alternatives: false,
//! };
//! let routes = provider.transit_directions(&request, &RequestContext::new())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use geo::Coord;
use log::{debug, warn};
use reqwest::{Client, Url};
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use wayfarer_core::{
    DirectionsError, DirectionsRequest, ProviderRoute, ProviderStep, RequestContext,
    StepTravelMode, TransitDirectionsProvider, TransitLine,
};

use super::google::{DirectionsResponse, LatLng, Step};

/// Error type for [`HttpDirectionsProvider`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// The configured base URL is not a valid absolute URL.
    InvalidBaseUrl(url::ParseError),
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl(err) => write!(f, "invalid directions base URL: {err}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBaseUrl(err) => Some(err),
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for directions requests.
pub const DEFAULT_USER_AGENT: &str = "wayfarer-directions/0.1";

/// Default directions service origin.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Path of the directions endpoint below the base URL.
const DIRECTIONS_PATH: &str = "maps/api/directions/json";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 12;

/// Configuration for [`HttpDirectionsProvider`].
#[derive(Clone)]
pub struct HttpDirectionsProviderConfig {
    /// Service origin, e.g. `"https://maps.googleapis.com"`.
    pub base_url: String,
    /// API key appended to every request.
    pub api_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpDirectionsProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDirectionsProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpDirectionsProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpDirectionsProviderConfig {
    /// Create a configuration for the default service with `api_key`.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the service origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP transit directions provider.
///
/// Owns a Tokio runtime that is reused across calls. When called from
/// within a multi-threaded Tokio runtime it blocks through that runtime's
/// handle with [`tokio::task::block_in_place`]; otherwise it uses its own
/// runtime.
///
/// Each request is bounded by the configured timeout, shortened to the
/// request context's deadline when one is set, and abandoned as soon as the
/// context is cancelled. The API key never appears in returned errors.
pub struct HttpDirectionsProvider {
    client: Client,
    config: HttpDirectionsProviderConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpDirectionsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDirectionsProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("endpoint", &self.endpoint.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl HttpDirectionsProvider {
    /// Create a provider for the default service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDirectionsProviderConfig::new(api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: HttpDirectionsProviderConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))
            .and_then(|base| base.join(DIRECTIONS_PATH))
            .map_err(ProviderBuildError::InvalidBaseUrl)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// Build the request URL without the API key.
    ///
    /// The format is
    /// `{base_url}/maps/api/directions/json?origin=lat,lng&destination=lat,lng&mode=transit&alternatives=bool`.
    fn request_url(&self, request: &DirectionsRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("origin", &lat_lng(request.origin))
            .append_pair("destination", &lat_lng(request.destination))
            .append_pair("mode", "transit")
            .append_pair(
                "alternatives",
                if request.alternatives { "true" } else { "false" },
            );
        url
    }

    /// Fetch and convert routes asynchronously.
    async fn fetch_routes_async(
        &self,
        request: &DirectionsRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        let url = self.request_url(request);
        let redacted = url.to_string();
        let mut keyed = url;
        keyed
            .query_pairs_mut()
            .append_pair("key", &self.config.api_key);
        let timeout = ctx.clamp_timeout(self.config.timeout);
        debug!("requesting transit directions from {redacted}");

        let exchange = async {
            let response = self
                .client
                .get(keyed)
                .timeout(timeout)
                .send()
                .await
                .map_err(|err| convert_reqwest_error(err, &redacted, timeout))?
                .error_for_status()
                .map_err(|err| convert_reqwest_error(err, &redacted, timeout))?;
            response
                .json::<DirectionsResponse>()
                .await
                .map_err(|err| DirectionsError::ParseError {
                    message: err.without_url().to_string(),
                })
        };

        let body = tokio::select! {
            () = ctx.cancellation().cancelled() => return Err(DirectionsError::Cancelled),
            body = exchange => body?,
        };
        convert_response(body)
    }
}

impl TransitDirectionsProvider for HttpDirectionsProvider {
    /// Fetch transit routes between the request's endpoints.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. From a `current_thread` runtime the provider falls
    /// back to its own runtime, which blocks the caller's runtime.
    fn transit_directions(
        &self,
        request: &DirectionsRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        if ctx.is_done() {
            return Err(DirectionsError::Cancelled);
        }
        let future = self.fetch_routes_async(request, ctx);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

/// Convert a reqwest error to a `DirectionsError`, dropping its URL.
fn convert_reqwest_error(error: reqwest::Error, url: &str, timeout: Duration) -> DirectionsError {
    if error.is_timeout() {
        return DirectionsError::Timeout {
            url: url.to_owned(),
            timeout_secs: timeout.as_secs(),
        };
    }

    let error = error.without_url();
    if let Some(status) = error.status() {
        return DirectionsError::HttpError {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    DirectionsError::NetworkError {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

/// Convert a directions response to provider routes.
///
/// `ZERO_RESULTS` is an empty answer rather than a failure. A route with a
/// step lacking `duration.value` or `distance.value` is discarded, since its
/// totals cannot be reported.
fn convert_response(response: DirectionsResponse) -> Result<Vec<ProviderRoute>, DirectionsError> {
    if response.is_zero_results() {
        return Ok(Vec::new());
    }
    if !response.is_ok() {
        return Err(DirectionsError::ServiceError {
            code: response.status,
            message: response.error_message.unwrap_or_default(),
        });
    }

    Ok(response
        .routes
        .into_iter()
        .enumerate()
        .filter_map(|(index, route)| {
            let steps: Option<Vec<ProviderStep>> = route
                .legs
                .into_iter()
                .flat_map(|leg| leg.steps)
                .map(convert_step)
                .collect();
            if steps.is_none() {
                warn!("discarding directions route {index}: step without duration or distance");
            }
            steps
        })
        .filter(|steps| !steps.is_empty())
        .map(|steps| ProviderRoute { steps })
        .collect())
}

/// Convert one wire step; `None` when either measurement is missing.
fn convert_step(step: Step) -> Option<ProviderStep> {
    let duration_seconds = step.duration?.value;
    let distance_meters = step.distance?.value;
    let (line, departure_stop, arrival_stop) = step.transit_details.map_or(
        (None, None, None),
        |details| {
            (
                details.line.map(|line| TransitLine {
                    name: line.name,
                    short_name: line.short_name,
                }),
                details.departure_stop.and_then(|stop| stop.name),
                details.arrival_stop.and_then(|stop| stop.name),
            )
        },
    );
    Some(ProviderStep {
        travel_mode: StepTravelMode::from_tag(&step.travel_mode),
        duration_seconds,
        distance_meters,
        start_location: coord(step.start_location),
        end_location: coord(step.end_location),
        polyline: step.polyline.map(|polyline| polyline.points),
        instructions: step
            .html_instructions
            .as_deref()
            .map(strip_tags)
            .filter(|text| !text.is_empty()),
        line,
        departure_stop,
        arrival_stop,
    })
}

const fn coord(point: LatLng) -> Coord<f64> {
    Coord {
        x: point.lng,
        y: point.lat,
    }
}

fn lat_lng(point: Coord<f64>) -> String {
    format!("{},{}", point.y, point.x)
}

/// Drop HTML markup from provider instructions.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> DirectionsRequest {
        DirectionsRequest {
            origin: Coord {
                x: 123.8854,
                y: 10.3157,
            },
            destination: Coord {
                x: 123.9019,
                y: 10.2934,
            },
            alternatives: true,
        }
    }

    fn provider(base_url: &str) -> HttpDirectionsProvider {
        HttpDirectionsProvider::with_config(
            HttpDirectionsProviderConfig::new("secret-key").with_base_url(base_url),
        )
        .expect("provider should build")
    }

    #[rstest]
    fn request_url_formats_coordinates(request: DirectionsRequest) {
        let url = provider("https://maps.example.com").request_url(&request);
        assert_eq!(
            url.as_str(),
            "https://maps.example.com/maps/api/directions/json?origin=10.3157%2C123.8854&destination=10.2934%2C123.9019&mode=transit&alternatives=true"
        );
        assert!(!url.as_str().contains("secret-key"));
    }

    #[rstest]
    fn request_url_strips_trailing_slash(request: DirectionsRequest) {
        let url = provider("https://maps.example.com/").request_url(&request);
        assert!(
            url.as_str()
                .starts_with("https://maps.example.com/maps/api/directions/json?")
        );
    }

    #[rstest]
    fn invalid_base_url_is_rejected() {
        let err = HttpDirectionsProvider::with_config(
            HttpDirectionsProviderConfig::new("key").with_base_url("not a url"),
        )
        .expect_err("relative base URL should fail");
        assert!(matches!(err, ProviderBuildError::InvalidBaseUrl(_)));
    }

    #[rstest]
    fn convert_response_handles_transit_route() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "routes": [{"legs": [{"steps": [
                    {
                        "travel_mode": "WALKING",
                        "duration": {"value": 120},
                        "distance": {"value": 150},
                        "start_location": {"lat": 10.3157, "lng": 123.8854},
                        "end_location": {"lat": 10.316, "lng": 123.886},
                        "html_instructions": "Walk to <b>Ayala</b> terminal"
                    },
                    {
                        "travel_mode": "TRANSIT",
                        "duration": {"value": 900},
                        "distance": {"value": 3200},
                        "start_location": {"lat": 10.316, "lng": 123.886},
                        "end_location": {"lat": 10.2934, "lng": 123.9019},
                        "transit_details": {
                            "line": {"name": "Lahug - Carbon", "short_name": "04L"},
                            "departure_stop": {"name": "Ayala"},
                            "arrival_stop": {"name": "Carbon"}
                        }
                    }
                ]}]}]
            }"#,
        )
        .expect("fixture should parse");

        let routes = convert_response(response).expect("should convert");

        assert_eq!(routes.len(), 1);
        let steps = &routes[0].steps;
        assert_eq!(steps[0].travel_mode, StepTravelMode::Walking);
        assert_eq!(steps[0].instructions.as_deref(), Some("Walk to Ayala terminal"));
        assert_eq!(steps[0].start_location, Coord { x: 123.8854, y: 10.3157 });
        assert_eq!(steps[1].travel_mode, StepTravelMode::Transit);
        assert_eq!(steps[1].departure_stop.as_deref(), Some("Ayala"));
        assert_eq!(
            steps[1].line.as_ref().and_then(|line| line.short_name.as_deref()),
            Some("04L")
        );
        assert!(routes[0].has_transit());
    }

    #[rstest]
    fn convert_response_discards_routes_with_unmeasured_steps() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "routes": [
                    {"legs": [{"steps": [{
                        "travel_mode": "TRANSIT",
                        "start_location": {"lat": 10.316, "lng": 123.886},
                        "end_location": {"lat": 10.2934, "lng": 123.9019},
                        "transit_details": {"line": {"short_name": "04L"}}
                    }]}]},
                    {"legs": [{"steps": [{
                        "travel_mode": "TRANSIT",
                        "duration": {"value": 600},
                        "distance": {"value": 2500},
                        "start_location": {"lat": 10.316, "lng": 123.886},
                        "end_location": {"lat": 10.2934, "lng": 123.9019},
                        "transit_details": {"line": {"short_name": "13C"}}
                    }]}]}
                ]
            }"#,
        )
        .expect("fixture should parse");

        let routes = convert_response(response).expect("should convert");

        assert_eq!(routes.len(), 1);
        let step = &routes[0].steps[0];
        assert_eq!(step.duration_seconds, 600);
        assert_eq!(step.distance_meters, 2500);
        assert_eq!(
            step.line.as_ref().and_then(|line| line.short_name.as_deref()),
            Some("13C")
        );
    }

    #[rstest]
    fn convert_response_without_measured_routes_is_empty() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "routes": [{"legs": [{"steps": [{
                    "travel_mode": "WALKING",
                    "duration": {"value": 60},
                    "start_location": {"lat": 10.316, "lng": 123.886},
                    "end_location": {"lat": 10.317, "lng": 123.887}
                }]}]}]
            }"#,
        )
        .expect("fixture should parse");

        assert_eq!(convert_response(response), Ok(Vec::new()));
    }

    #[rstest]
    fn convert_response_treats_zero_results_as_empty() {
        let response: DirectionsResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).expect("fixture should parse");
        assert_eq!(convert_response(response), Ok(Vec::new()));
    }

    #[rstest]
    fn convert_response_handles_service_error() {
        let response: DirectionsResponse = serde_json::from_str(
            r#"{"status": "OVER_QUERY_LIMIT", "error_message": "quota", "routes": []}"#,
        )
        .expect("fixture should parse");
        assert_eq!(
            convert_response(response),
            Err(DirectionsError::ServiceError {
                code: "OVER_QUERY_LIMIT".to_owned(),
                message: "quota".to_owned(),
            })
        );
    }

    #[rstest]
    fn cancelled_context_skips_the_request(request: DirectionsRequest) {
        let ctx = RequestContext::new();
        ctx.cancel();
        let outcome = provider("http://127.0.0.1:9").transit_directions(&request, &ctx);
        assert_eq!(outcome, Err(DirectionsError::Cancelled));
    }

    #[rstest]
    #[case("<div>Head <b>north</b></div>", "Head north")]
    #[case("plain", "plain")]
    #[case("", "")]
    fn strips_markup(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(strip_tags(html), expected);
    }

    #[rstest]
    fn config_debug_redacts_key() {
        let config = HttpDirectionsProviderConfig::new("secret-key")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test/1.0");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test/1.0");
    }
}
