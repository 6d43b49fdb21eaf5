//! HTTP-based transit directions.
//!
//! This module provides [`HttpDirectionsProvider`], an implementation of
//! [`wayfarer_core::TransitDirectionsProvider`] that fetches transit routes
//! from a Google-style directions service.
//!
//! # Architecture
//!
//! The provider requests `mode=transit` directions between two coordinates
//! and converts each returned route into walking and transit steps. The
//! synchronous provider trait is implemented by blocking on async HTTP calls
//! internally, keeping the resolver embeddable in synchronous contexts.
//! Status `ZERO_RESULTS` yields an empty route list; other non-`OK`
//! statuses become [`wayfarer_core::DirectionsError::ServiceError`].

mod google;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpDirectionsProvider, HttpDirectionsProviderConfig,
    ProviderBuildError,
};
