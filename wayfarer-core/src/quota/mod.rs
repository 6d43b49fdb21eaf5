//! Per-API daily call budgets.
//!
//! Every external call site asks a [`QuotaGuard`] before issuing network
//! I/O and logs each call it lets through. The check and the log are not atomic:
//! two near-simultaneous calls from one principal may both pass the check.
//! That race is accepted; the budget is a soft guard against overuse.

mod error;
mod gateway;
mod record;
mod store;

pub use error::QuotaLogError;
pub use gateway::{QuotaGateway, QuotaGuard};
pub use record::QuotaRecord;
pub use store::{MemoryQuotaLog, QuotaLog};
