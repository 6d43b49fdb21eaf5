use std::fmt;

use thiserror::Error;

use super::ResolutionStatus;

/// Which end of a hop an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HopEndpoint {
    /// Where the hop starts.
    Origin,
    /// Where the hop ends.
    Destination,
}

impl fmt::Display for HopEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
        })
    }
}

/// Failure to resolve a single hop.
///
/// These are expected outcomes. Callers turn them into placeholder
/// segments rather than aborting the surrounding chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HopError {
    /// No candidate route contained a transit leg.
    #[error("no transit route data for this hop")]
    NoRouteData,
    /// The daily budget for `api` is exhausted.
    #[error("daily quota for {api} exhausted")]
    QuotaExceeded {
        /// Quota bucket that refused the call.
        api: String,
    },
    /// The provider failed; the message is kept for diagnostics.
    #[error("directions provider failed: {message}")]
    ProviderError {
        /// Underlying failure description.
        message: String,
    },
    /// An endpoint has no usable coordinates or lies outside the region.
    #[error("{which} is missing or outside the service region")]
    InvalidLocation {
        /// Offending endpoint.
        which: HopEndpoint,
    },
    /// The request context was cancelled or expired.
    #[error("route resolution cancelled")]
    Cancelled,
}

impl HopError {
    /// Status recorded on the placeholder segment.
    #[must_use]
    pub const fn status(&self) -> ResolutionStatus {
        match self {
            Self::NoRouteData => ResolutionStatus::NoData,
            Self::QuotaExceeded { .. } => ResolutionStatus::QuotaExceeded,
            Self::ProviderError { .. } | Self::Cancelled => ResolutionStatus::ProviderError,
            Self::InvalidLocation { .. } => ResolutionStatus::InvalidLocation,
        }
    }

    /// Traveller-facing explanation, free of provider internals.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::NoRouteData => "No public transport route found for this leg.".to_owned(),
            Self::QuotaExceeded { .. } => {
                "Route lookups are paused for today; try again tomorrow.".to_owned()
            }
            Self::ProviderError { .. } => {
                "Directions are temporarily unavailable; try again shortly.".to_owned()
            }
            Self::InvalidLocation { which } => {
                format!("The {which} of this leg is outside the supported area.")
            }
            Self::Cancelled => "Route lookup was cancelled.".to_owned(),
        }
    }
}
