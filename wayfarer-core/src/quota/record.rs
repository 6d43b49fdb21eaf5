use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One logged external call, scoped to the calling principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaRecord {
    /// Caller the budget belongs to.
    pub principal: String,
    /// Quota bucket, e.g. `"directions"`.
    pub api: String,
    /// Endpoint that was called.
    pub endpoint: String,
    /// Request parameters worth keeping for diagnostics.
    pub params: Value,
    /// When the call was made.
    pub timestamp: DateTime<Utc>,
}
