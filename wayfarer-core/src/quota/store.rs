use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::{QuotaLogError, QuotaRecord};

/// Append-only store of [`QuotaRecord`]s.
///
/// Implementations take `&self` so one log can be shared by every request
/// of a principal.
pub trait QuotaLog {
    /// Append `record` to the log.
    ///
    /// # Errors
    /// Returns [`QuotaLogError`] when the backend rejects the write.
    fn append(&self, record: &QuotaRecord) -> Result<(), QuotaLogError>;

    /// Count records for `principal` and `api` at or after `since`.
    ///
    /// # Errors
    /// Returns [`QuotaLogError`] when the backend cannot be read.
    fn count_since(
        &self,
        principal: &str,
        api: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, QuotaLogError>;
}

impl<T: QuotaLog + ?Sized> QuotaLog for Arc<T> {
    fn append(&self, record: &QuotaRecord) -> Result<(), QuotaLogError> {
        (**self).append(record)
    }

    fn count_since(
        &self,
        principal: &str,
        api: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, QuotaLogError> {
        (**self).count_since(principal, api, since)
    }
}

impl<T: QuotaLog + ?Sized> QuotaLog for &T {
    fn append(&self, record: &QuotaRecord) -> Result<(), QuotaLogError> {
        (**self).append(record)
    }

    fn count_since(
        &self,
        principal: &str,
        api: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, QuotaLogError> {
        (**self).count_since(principal, api, since)
    }
}

/// In-process [`QuotaLog`] for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryQuotaLog {
    records: Mutex<Vec<QuotaRecord>>,
}

impl MemoryQuotaLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records in append order.
    ///
    /// # Errors
    /// Returns [`QuotaLogError::Poisoned`] when a writer panicked.
    pub fn records(&self) -> Result<Vec<QuotaRecord>, QuotaLogError> {
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|_| QuotaLogError::Poisoned)
    }
}

impl QuotaLog for MemoryQuotaLog {
    fn append(&self, record: &QuotaRecord) -> Result<(), QuotaLogError> {
        self.records
            .lock()
            .map_err(|_| QuotaLogError::Poisoned)?
            .push(record.clone());
        Ok(())
    }

    fn count_since(
        &self,
        principal: &str,
        api: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, QuotaLogError> {
        let records = self.records.lock().map_err(|_| QuotaLogError::Poisoned)?;
        let count = records
            .iter()
            .filter(|r| r.principal == principal && r.api == api && r.timestamp >= since)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
