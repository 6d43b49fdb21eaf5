//! Command-line interface for the Wayfarer itinerary engine.
//!
//! `wayfarer plan` partitions a list of points of interest into scheduled
//! days; `wayfarer route` resolves the transit route chain for each day of a
//! planned itinerary. Both commands print JSON to standard output.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod files;
mod plan;
mod route;

pub use error::CliError;
use plan::{PlanArgs, run_plan};
use route::{RouteArgs, run_route};

pub(crate) const ARG_PLAN_POIS: &str = "pois";
pub(crate) const ARG_PLAN_DAYS: &str = "days";
pub(crate) const ARG_PLAN_START_TIME: &str = "start-time";
pub(crate) const ARG_PLAN_END_TIME: &str = "end-time";
pub(crate) const ARG_PLAN_START_DATE: &str = "start-date";
pub(crate) const ENV_PLAN_POIS: &str = "WAYFARER_CMDS_PLAN_POIS_PATH";

pub(crate) const ARG_ROUTE_ITINERARY: &str = "itinerary";
pub(crate) const ARG_ROUTE_API_KEY: &str = "api-key";
pub(crate) const ARG_ROUTE_BASE_URL: &str = "base-url";
pub(crate) const ARG_ROUTE_QUOTA_DB: &str = "quota-db";
pub(crate) const ARG_ROUTE_DAILY_LIMIT: &str = "daily-limit";
pub(crate) const ARG_ROUTE_PRINCIPAL: &str = "principal";
pub(crate) const ARG_ROUTE_DEFINITIONS: &str = "route-definitions";
pub(crate) const ARG_ROUTE_REGION: &str = "region";
pub(crate) const ARG_ROUTE_START: &str = "start";
pub(crate) const ARG_ROUTE_ALTERNATIVES: &str = "alternatives";
pub(crate) const ARG_ROUTE_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ENV_ROUTE_ITINERARY: &str = "WAYFARER_CMDS_ROUTE_ITINERARY_PATH";
pub(crate) const ENV_ROUTE_API_KEY: &str = "WAYFARER_CMDS_ROUTE_API_KEY";

/// Run the Wayfarer CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, inputs or output
/// fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Route(args) => run_route(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    about = "Plan multi-day sightseeing trips and resolve their transit routes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Partition points of interest into scheduled days.
    Plan(PlanArgs),
    /// Resolve the transit route chain for each planned day.
    Route(RouteArgs),
}

#[cfg(test)]
mod tests;
