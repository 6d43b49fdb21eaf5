//! Transit route resolution and per-day route-chain assembly.
//!
//! [`TransitRouteResolver`] turns one hop into classified walk, bus and
//! paratransit segments using a quota-gated directions provider, with an
//! optional fallback to stored paratransit routes.
//! [`RouteChainAssembler`] walks a day's stops, resolves each hop in order
//! and records failures as placeholder segments instead of aborting.

#![forbid(unsafe_code)]

mod assembler;
mod classify;
mod config;
mod direct;
mod rank;
mod resolver;

pub use assembler::RouteChainAssembler;
pub use classify::{BUS_KEYWORDS, UNKNOWN_ROUTE_CODE, classify_line, convert_route, route_code};
pub use config::ResolverConfig;
pub use rank::rank_routes;
pub use resolver::{DIRECTIONS_API, DIRECTIONS_ENDPOINT, HopResolver, TransitRouteResolver};
