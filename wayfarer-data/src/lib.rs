//! Data access adapters for the Wayfarer itinerary engine.
//!
//! Responsibilities:
//! - Fetch transit directions over HTTP.
//! - Persist the external-call quota log in SQLite.
//! - Load stored paratransit route documents from JSON files.
//!
//! Boundaries:
//! - Do not encode domain rules (those live in `wayfarer-core` and
//!   `wayfarer-transit`).
//! - Keep blocking I/O off async executors; the HTTP provider blocks on its
//!   own runtime or through `block_in_place`.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.
//! - Credentials never appear in returned errors.

#![forbid(unsafe_code)]

pub mod directions;
pub mod fs;
mod quota;
mod route_definitions;

pub use quota::{OpenQuotaLogError, SqliteQuotaLog};
pub use route_definitions::{
    RouteDefinitionError, load_route_definitions, load_route_store, parse_route_definitions,
};
