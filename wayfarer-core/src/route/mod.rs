//! Route segments and per-day route chains.
//!
//! Every hop between consecutive stops ends up in the chain, resolved or
//! not. Unresolved hops carry an explicit [`ResolutionStatus`] and a
//! placeholder segment without numeric values.

mod chain;
mod error;
mod segment;

use serde::{Deserialize, Serialize};

pub use chain::{ChainHop, HopKind, RouteChain};
pub use error::{HopEndpoint, HopError};
pub use segment::{RouteSegment, TransitRoute, Waypoint};

/// How a segment is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// On foot.
    Walk,
    /// Shared fixed-route local vehicle.
    Paratransit,
    /// Scheduled city or provincial bus.
    Bus,
}

impl TravelMode {
    /// Whether the mode rides a transit vehicle.
    #[must_use]
    pub const fn is_transit(self) -> bool {
        matches!(self, Self::Paratransit | Self::Bus)
    }
}

/// Outcome of resolving one hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionStatus {
    /// Real route data was obtained.
    Resolved,
    /// The provider knows no transit route for the hop.
    NoData,
    /// The daily directions budget is spent.
    QuotaExceeded,
    /// The provider failed or the request was abandoned.
    ProviderError,
    /// An endpoint is missing or outside the service region.
    InvalidLocation,
}

impl ResolutionStatus {
    /// Whether the status is [`ResolutionStatus::Resolved`].
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved)
    }
}
