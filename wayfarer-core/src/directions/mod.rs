//! Boundary to the external transit-directions provider.
//!
//! The [`TransitDirectionsProvider`] trait is synchronous so the core stays
//! embeddable without an async runtime. Network adapters bridge to async I/O
//! internally and honour the [`RequestContext`](crate::RequestContext)
//! passed with each call.

mod error;
mod provider;

pub use error::DirectionsError;
pub use provider::{
    DirectionsRequest, ProviderRoute, ProviderStep, StepTravelMode, TransitDirectionsProvider,
    TransitLine,
};
