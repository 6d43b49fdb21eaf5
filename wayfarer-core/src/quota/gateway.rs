use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use log::{debug, warn};
use serde_json::Value;

use super::{QuotaLog, QuotaLogError, QuotaRecord};
use crate::{Clock, SystemClock};

/// Budget check consulted before every external call.
pub trait QuotaGuard {
    /// Whether another call to `api` fits within `daily_limit` today.
    fn can_call(&self, api: &str, daily_limit: u32) -> bool;

    /// Record a call. Failures are swallowed so logging never blocks the
    /// caller.
    fn log_call(&self, api: &str, endpoint: &str, params: Value);
}

impl<G: QuotaGuard + ?Sized> QuotaGuard for &G {
    fn can_call(&self, api: &str, daily_limit: u32) -> bool {
        (**self).can_call(api, daily_limit)
    }

    fn log_call(&self, api: &str, endpoint: &str, params: Value) {
        (**self).log_call(api, endpoint, params);
    }
}

/// [`QuotaGuard`] counting calls in a [`QuotaLog`] since local midnight.
///
/// The day boundary follows the clock's UTC offset, so budgets reset at
/// the traveller's midnight rather than UTC midnight. When the log cannot
/// be read the gateway refuses the call.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use wayfarer_core::{MemoryQuotaLog, QuotaGateway, QuotaGuard};
///
/// let gateway = QuotaGateway::new(MemoryQuotaLog::new(), "alice");
/// assert!(gateway.can_call("directions", 1));
/// gateway.log_call("directions", "/maps/api/directions/json", json!({}));
/// assert!(!gateway.can_call("directions", 1));
/// ```
#[derive(Debug)]
pub struct QuotaGateway<L, C = SystemClock> {
    log: L,
    clock: C,
    principal: String,
}

impl<L: QuotaLog> QuotaGateway<L> {
    /// Gateway for `principal` using the system clock.
    #[must_use]
    pub fn new(log: L, principal: impl Into<String>) -> Self {
        Self::with_clock(log, SystemClock, principal)
    }
}

impl<L: QuotaLog, C: Clock> QuotaGateway<L, C> {
    /// Gateway for `principal` with an explicit clock.
    #[must_use]
    pub fn with_clock(log: L, clock: C, principal: impl Into<String>) -> Self {
        Self {
            log,
            clock,
            principal: principal.into(),
        }
    }

    /// Principal the budget is scoped to.
    #[must_use]
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Underlying log.
    #[must_use]
    pub const fn log(&self) -> &L {
        &self.log
    }

    /// Number of calls to `api` made since local midnight.
    ///
    /// # Errors
    /// Propagates [`QuotaLogError`] from the log backend.
    pub fn calls_today(&self, api: &str) -> Result<u64, QuotaLogError> {
        let since = start_of_local_day(self.clock.now());
        self.log.count_since(&self.principal, api, since)
    }
}

impl<L: QuotaLog, C: Clock> QuotaGuard for QuotaGateway<L, C> {
    fn can_call(&self, api: &str, daily_limit: u32) -> bool {
        match self.calls_today(api) {
            Ok(count) => {
                let allowed = count < u64::from(daily_limit);
                debug!(
                    "quota check for {api}: {count}/{daily_limit} used by {}, allowed={allowed}",
                    self.principal
                );
                allowed
            }
            Err(err) => {
                warn!("quota log unreadable for {api}; refusing call: {err}");
                false
            }
        }
    }

    fn log_call(&self, api: &str, endpoint: &str, params: Value) {
        let record = QuotaRecord {
            principal: self.principal.clone(),
            api: api.to_owned(),
            endpoint: endpoint.to_owned(),
            params,
            timestamp: self.clock.now().with_timezone(&Utc),
        };
        if let Err(err) = self.log.append(&record) {
            warn!("failed to log {api} call for {}: {err}", self.principal);
        }
    }
}

/// UTC instant of the most recent local midnight before `now`.
fn start_of_local_day(now: DateTime<chrono::FixedOffset>) -> DateTime<Utc> {
    let local_midnight = now.date_naive().and_time(NaiveTime::MIN);
    let offset = TimeDelta::seconds(i64::from(now.offset().local_minus_utc()));
    (local_midnight - offset).and_utc()
}
