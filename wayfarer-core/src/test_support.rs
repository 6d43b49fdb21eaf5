//! Deterministic test doubles shared by unit and behaviour tests.
//!
//! Available to other crates through the `test-support` feature.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use geo::Coord;
use serde_json::Value;

use crate::location::PositionCallback;
use crate::{
    Clock, DirectionsError, DirectionsRequest, LocationSensor, PositionFix, PositionOptions,
    ProviderRoute, ProviderStep, QuotaGuard, QuotaLog, QuotaLogError, QuotaRecord, RequestContext,
    SensorError, StepTravelMode, TransitDirectionsProvider, TransitLine, WatchId,
};

/// [`Clock`] frozen at a chosen instant until advanced.
///
/// Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<FixedOffset>>>,
}

impl ManualClock {
    /// Clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Clock frozen at an RFC 3339 timestamp such as
    /// `"2025-03-14T09:00:00+08:00"`.
    ///
    /// # Panics
    /// Panics when `timestamp` is not valid RFC 3339.
    #[must_use]
    pub fn at(timestamp: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(timestamp)
            .unwrap_or_else(|err| panic!("invalid test timestamp {timestamp:?}: {err}"));
        Self::new(now)
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`QuotaGuard`] that allows every call and counts logged calls.
#[derive(Debug, Clone, Default)]
pub struct UnlimitedQuota {
    logged: Arc<Mutex<Vec<String>>>,
}

impl UnlimitedQuota {
    /// APIs logged so far, in order.
    #[must_use]
    pub fn logged(&self) -> Vec<String> {
        self.logged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl QuotaGuard for UnlimitedQuota {
    fn can_call(&self, _api: &str, _daily_limit: u32) -> bool {
        true
    }

    fn log_call(&self, api: &str, _endpoint: &str, _params: Value) {
        self.logged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(api.to_owned());
    }
}

/// [`QuotaLog`] whose reads and writes always fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingQuotaLog;

impl QuotaLog for FailingQuotaLog {
    fn append(&self, _record: &QuotaRecord) -> Result<(), QuotaLogError> {
        Err(QuotaLogError::backend(std::io::Error::other("disk full")))
    }

    fn count_since(
        &self,
        _principal: &str,
        _api: &str,
        _since: DateTime<Utc>,
    ) -> Result<u64, QuotaLogError> {
        Err(QuotaLogError::backend(std::io::Error::other("disk unreadable")))
    }
}

type ScriptedResponse = Result<Vec<ProviderRoute>, DirectionsError>;

#[derive(Debug, Default)]
struct Script {
    responses: VecDeque<ScriptedResponse>,
    fallback: Option<ScriptedResponse>,
    requests: Vec<DirectionsRequest>,
}

/// [`TransitDirectionsProvider`] replaying queued responses in order.
///
/// Once the queue is empty the provider repeats its fallback response, or
/// fails with a network error when none was set. A done context yields
/// [`DirectionsError::Cancelled`] without consuming a response. Clones share
/// the script and the request log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDirectionsProvider {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDirectionsProvider {
    /// Provider replaying `responses`.
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        let script = Script {
            responses: responses.into_iter().collect(),
            ..Script::default()
        };
        Self {
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Provider answering every request with `response`.
    #[must_use]
    pub fn always(response: ScriptedResponse) -> Self {
        let provider = Self::default();
        provider.lock().fallback = Some(response);
        provider
    }

    /// Queue another response.
    pub fn push(&self, response: ScriptedResponse) {
        self.lock().responses.push_back(response);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<DirectionsRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransitDirectionsProvider for ScriptedDirectionsProvider {
    fn transit_directions(
        &self,
        request: &DirectionsRequest,
        ctx: &RequestContext,
    ) -> Result<Vec<ProviderRoute>, DirectionsError> {
        if ctx.is_done() {
            return Err(DirectionsError::Cancelled);
        }
        let mut script = self.lock();
        script.requests.push(*request);
        script
            .responses
            .pop_front()
            .or_else(|| script.fallback.clone())
            .unwrap_or_else(|| {
                Err(DirectionsError::NetworkError {
                    url: "scripted://directions".to_owned(),
                    message: "script exhausted".to_owned(),
                })
            })
    }
}

/// A walking step between two coordinates.
#[must_use]
pub fn walk_step(from: Coord<f64>, to: Coord<f64>, seconds: u32, meters: u32) -> ProviderStep {
    ProviderStep {
        travel_mode: StepTravelMode::Walking,
        duration_seconds: seconds,
        distance_meters: meters,
        start_location: from,
        end_location: to,
        polyline: Some(crate::encode_polyline(&[from, to])),
        instructions: Some("Walk".to_owned()),
        line: None,
        departure_stop: None,
        arrival_stop: None,
    }
}

/// A transit step riding a line with the given names.
#[must_use]
pub fn transit_step(
    from: Coord<f64>,
    to: Coord<f64>,
    seconds: u32,
    meters: u32,
    name: Option<&str>,
    short_name: Option<&str>,
) -> ProviderStep {
    ProviderStep {
        travel_mode: StepTravelMode::Transit,
        duration_seconds: seconds,
        distance_meters: meters,
        start_location: from,
        end_location: to,
        polyline: Some(crate::encode_polyline(&[from, to])),
        instructions: None,
        line: Some(TransitLine {
            name: name.map(str::to_owned),
            short_name: short_name.map(str::to_owned),
        }),
        departure_stop: Some("Boarding stop".to_owned()),
        arrival_stop: Some("Alighting stop".to_owned()),
    }
}

/// Wrap steps as a provider route.
#[must_use]
pub const fn route(steps: Vec<ProviderStep>) -> ProviderRoute {
    ProviderRoute { steps }
}

#[derive(Default)]
struct SensorState {
    response: Option<Result<PositionFix, SensorError>>,
    reads: usize,
    watcher: Option<(WatchId, PositionCallback)>,
    next_watch: u64,
}

/// Scriptable [`LocationSensor`].
///
/// Clones share state, so tests can keep a handle after moving the sensor
/// into a resolver.
#[derive(Clone, Default)]
pub struct StubLocationSensor {
    state: Arc<Mutex<SensorState>>,
}

impl std::fmt::Debug for StubLocationSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubLocationSensor")
            .field("reads", &self.reads())
            .field("watching", &self.is_watching())
            .finish()
    }
}

impl StubLocationSensor {
    /// Sensor answering every read with `fix`.
    #[must_use]
    pub fn with_fix(fix: PositionFix) -> Self {
        Self::with_response(Ok(fix))
    }

    /// Sensor failing every read with `error`.
    #[must_use]
    pub fn with_error(error: SensorError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<PositionFix, SensorError>) -> Self {
        let sensor = Self::default();
        sensor.lock().response = Some(response);
        sensor
    }

    /// Number of one-shot reads served.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    /// Whether a watch is registered.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.lock().watcher.is_some()
    }

    /// Deliver `update` to the registered watcher, if any.
    pub fn emit(&self, update: Result<PositionFix, SensorError>) {
        let mut state = self.lock();
        if let Some((_, callback)) = state.watcher.as_mut() {
            callback(update);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SensorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationSensor for StubLocationSensor {
    fn current_position(&self, _options: &PositionOptions) -> Result<PositionFix, SensorError> {
        let mut state = self.lock();
        state.reads += 1;
        state.response.clone().unwrap_or(Err(SensorError::Unavailable {
            message: "no scripted fix".to_owned(),
        }))
    }

    fn watch_position(
        &self,
        _options: &PositionOptions,
        callback: PositionCallback,
    ) -> Result<WatchId, SensorError> {
        let mut state = self.lock();
        state.next_watch += 1;
        let id = WatchId(state.next_watch);
        state.watcher = Some((id, callback));
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        let mut state = self.lock();
        if state.watcher.as_ref().is_some_and(|(current, _)| *current == id) {
            state.watcher = None;
        }
    }
}
