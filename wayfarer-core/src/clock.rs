//! Wall-clock access for quota day boundaries.
//!
//! Quota budgets reset at local midnight, so the gateway needs the current
//! time together with its UTC offset. Tests substitute a manual clock from
//! [`crate::test_support`].

use chrono::{DateTime, FixedOffset, Local};

/// Source of the current local time.
pub trait Clock {
    /// Current time carrying the local UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// [`Clock`] backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}
