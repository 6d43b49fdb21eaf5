//! Traveller start location from a geolocation sensor.
//!
//! Route chains begin at the traveller's current position. Fixes are cached
//! as fresh for a few minutes, watch callbacks keep the cache warm, and any
//! sensor failure falls back to a configured regional default rather than
//! blocking.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use geo::Coord;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RequestContext;

/// Default age after which a cached fix is considered stale.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(5 * 60);

/// Default sensor read timeout.
pub const DEFAULT_SENSOR_TIMEOUT: Duration = Duration::from_secs(12);

/// One position reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Reported coordinates.
    pub location: Coord<f64>,
    /// Horizontal accuracy radius in metres.
    pub accuracy_meters: f64,
}

/// Options passed to every sensor read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Request the most accurate fix the sensor can provide.
    pub high_accuracy: bool,
    /// Give up after this long.
    pub timeout: Duration,
    /// Accept a sensor-side cached fix up to this age.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_SENSOR_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

/// Errors reported by a [`LocationSensor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    /// The traveller refused location access.
    #[error("location permission denied")]
    PermissionDenied,
    /// No fix could be obtained.
    #[error("position unavailable: {message}")]
    Unavailable {
        /// Sensor-specific explanation.
        message: String,
    },
    /// The sensor did not answer in time.
    #[error("position request timed out after {timeout_secs}s")]
    Timeout {
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
}

/// Handle identifying a registered position watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Callback invoked by a sensor for each watched position update.
pub type PositionCallback = Box<dyn FnMut(Result<PositionFix, SensorError>) + Send>;

/// A geolocation sensor.
pub trait LocationSensor {
    /// Read the current position once.
    ///
    /// # Errors
    /// Returns [`SensorError`] when no fix is available within
    /// `options.timeout`.
    fn current_position(&self, options: &PositionOptions) -> Result<PositionFix, SensorError>;

    /// Register `callback` for continuous position updates.
    ///
    /// # Errors
    /// Returns [`SensorError`] when watching is not supported or denied.
    fn watch_position(
        &self,
        options: &PositionOptions,
        callback: PositionCallback,
    ) -> Result<WatchId, SensorError>;

    /// Stop a watch registered with [`LocationSensor::watch_position`].
    fn clear_watch(&self, id: WatchId);
}

/// Sensor for headless use that never produces a fix.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableSensor;

impl LocationSensor for UnavailableSensor {
    fn current_position(&self, _options: &PositionOptions) -> Result<PositionFix, SensorError> {
        Err(SensorError::Unavailable {
            message: "no location sensor attached".to_owned(),
        })
    }

    fn watch_position(
        &self,
        _options: &PositionOptions,
        _callback: PositionCallback,
    ) -> Result<WatchId, SensorError> {
        Err(SensorError::Unavailable {
            message: "no location sensor attached".to_owned(),
        })
    }

    fn clear_watch(&self, _id: WatchId) {}
}

/// Configuration for [`StartLocationResolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartLocationConfig {
    /// Coordinate used when the sensor cannot provide a fix.
    pub fallback: Coord<f64>,
    /// How long a fix stays fresh.
    pub freshness: Duration,
    /// Sensor read timeout.
    pub timeout: Duration,
    /// Request high-accuracy fixes.
    pub high_accuracy: bool,
}

impl Default for StartLocationConfig {
    fn default() -> Self {
        Self {
            // Cebu City centre.
            fallback: Coord {
                x: 123.8854,
                y: 10.3157,
            },
            freshness: DEFAULT_FRESHNESS,
            timeout: DEFAULT_SENSOR_TIMEOUT,
            high_accuracy: true,
        }
    }
}

impl StartLocationConfig {
    /// Configuration with the given fallback coordinate.
    #[must_use]
    pub fn new(fallback: Coord<f64>) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    /// Set how long fixes stay fresh.
    #[must_use]
    pub const fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Set the sensor read timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Choose between high-accuracy and coarse fixes.
    #[must_use]
    pub const fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }
}

/// Where a [`StartLocation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartSource {
    /// A fresh cached fix.
    Cached,
    /// A new sensor reading.
    Sensor,
    /// The configured default coordinate.
    Fallback,
}

/// Resolved start position for a route chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartLocation {
    /// Start coordinates.
    pub location: Coord<f64>,
    /// Provenance of the coordinates.
    pub source: StartSource,
    /// Accuracy radius when the position came from the sensor.
    pub accuracy_meters: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct CachedFix {
    fix: PositionFix,
    observed_at: Instant,
}

type FixCache = Arc<Mutex<Option<CachedFix>>>;

/// Resolve the traveller's start location with caching and fallback.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{
///     RequestContext, StartLocationConfig, StartLocationResolver, StartSource,
///     UnavailableSensor,
/// };
///
/// let fallback = Coord { x: 123.8854, y: 10.3157 };
/// let resolver =
///     StartLocationResolver::new(UnavailableSensor, StartLocationConfig::new(fallback));
/// let start = resolver.resolve(&RequestContext::new());
/// assert_eq!(start.source, StartSource::Fallback);
/// assert_eq!(start.location, fallback);
/// ```
#[derive(Debug)]
pub struct StartLocationResolver<S> {
    sensor: S,
    config: StartLocationConfig,
    cache: FixCache,
}

impl<S: LocationSensor> StartLocationResolver<S> {
    /// Wrap `sensor` with `config`.
    #[must_use]
    pub fn new(sensor: S, config: StartLocationConfig) -> Self {
        Self {
            sensor,
            config,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Return a fresh cached fix, a new sensor reading or the fallback.
    ///
    /// Never fails: sensor errors, timeouts and a done context all yield
    /// the configured fallback.
    #[must_use]
    pub fn resolve(&self, ctx: &RequestContext) -> StartLocation {
        if let Some(cached) = self.fresh_fix() {
            return StartLocation {
                location: cached.location,
                source: StartSource::Cached,
                accuracy_meters: Some(cached.accuracy_meters),
            };
        }
        if ctx.is_done() {
            debug!("request done before sensor read; using fallback start");
            return self.fallback();
        }
        let options = PositionOptions {
            timeout: ctx.clamp_timeout(self.config.timeout),
            ..self.options()
        };
        match self.sensor.current_position(&options) {
            Ok(fix) if is_finite(fix.location) => {
                store_fix(&self.cache, fix);
                StartLocation {
                    location: fix.location,
                    source: StartSource::Sensor,
                    accuracy_meters: Some(fix.accuracy_meters),
                }
            }
            Ok(fix) => {
                warn!("sensor returned non-finite fix {:?}; using fallback start", fix.location);
                self.fallback()
            }
            Err(err) => {
                warn!("location sensor failed: {err}; using fallback start");
                self.fallback()
            }
        }
    }

    /// Record a fix obtained elsewhere, e.g. from a watch callback.
    pub fn observe(&self, fix: PositionFix) {
        if is_finite(fix.location) {
            store_fix(&self.cache, fix);
        }
    }

    /// Keep the cache warm with watched position updates.
    ///
    /// # Errors
    /// Propagates [`SensorError`] when the sensor refuses the watch.
    pub fn start_watching(&self) -> Result<WatchId, SensorError> {
        let cache = Arc::clone(&self.cache);
        self.sensor.watch_position(
            &self.options(),
            Box::new(move |update| match update {
                Ok(fix) if is_finite(fix.location) => store_fix(&cache, fix),
                Ok(_) => debug!("ignoring non-finite watched fix"),
                Err(err) => debug!("watched position update failed: {err}"),
            }),
        )
    }

    /// Stop a watch started by [`StartLocationResolver::start_watching`].
    pub fn stop_watching(&self, id: WatchId) {
        self.sensor.clear_watch(id);
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &StartLocationConfig {
        &self.config
    }

    fn options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.config.high_accuracy,
            timeout: self.config.timeout,
            maximum_age: self.config.freshness,
        }
    }

    fn fresh_fix(&self) -> Option<PositionFix> {
        let guard = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        guard
            .filter(|cached| cached.observed_at.elapsed() < self.config.freshness)
            .map(|cached| cached.fix)
    }

    const fn fallback(&self) -> StartLocation {
        StartLocation {
            location: self.config.fallback,
            source: StartSource::Fallback,
            accuracy_meters: None,
        }
    }
}

fn store_fix(cache: &FixCache, fix: PositionFix) {
    let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = Some(CachedFix {
        fix,
        observed_at: Instant::now(),
    });
}

fn is_finite(coord: Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}
