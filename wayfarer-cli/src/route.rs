//! Route command implementation for the Wayfarer CLI.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geo::Coord;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfarer_core::{
    DayPlan, QuotaGateway, RequestContext, RouteChain, ServiceRegion, StartLocationConfig,
    StartLocationResolver, UnavailableSensor,
};
use wayfarer_data::directions::{
    DEFAULT_BASE_URL, HttpDirectionsProvider, HttpDirectionsProviderConfig,
};
use wayfarer_data::{SqliteQuotaLog, load_route_store};
use wayfarer_transit::{HopResolver, ResolverConfig, RouteChainAssembler, TransitRouteResolver};

use crate::files::{load_json, require_existing, write_json};
use crate::{
    ARG_ROUTE_ALTERNATIVES, ARG_ROUTE_API_KEY, ARG_ROUTE_BASE_URL, ARG_ROUTE_DAILY_LIMIT,
    ARG_ROUTE_DEFINITIONS, ARG_ROUTE_ITINERARY, ARG_ROUTE_PRINCIPAL, ARG_ROUTE_QUOTA_DB,
    ARG_ROUTE_REGION, ARG_ROUTE_START, ARG_ROUTE_TIMEOUT_SECS, CliError, ENV_ROUTE_API_KEY,
    ENV_ROUTE_ITINERARY,
};

const DEFAULT_QUOTA_DB: &str = "wayfarer-quota.sqlite";
const DEFAULT_PRINCIPAL: &str = "default";
const DEFAULT_TIMEOUT_SECS: u64 = 12;
/// Metro Cebu and its neighbouring islands, as south, west, north, east.
const DEFAULT_REGION: [f64; 4] = [9.4, 123.2, 11.3, 124.1];

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve the transit route chain for every day of a \
                 planned itinerary (the JSON printed by `wayfarer plan`). \
                 Hops are resolved through the transit directions service \
                 within a persistent daily quota, falling back to stored \
                 paratransit routes when configured. Prints the chains as \
                 JSON.",
    about = "Resolve transit routes for a planned itinerary"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct RouteArgs {
    /// Path to a JSON array of day plans.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) itinerary_path: Option<Utf8PathBuf>,
    /// API key for the transit directions service.
    #[arg(long = ARG_ROUTE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Base URL of the directions service.
    #[arg(long = ARG_ROUTE_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// SQLite database recording directions calls.
    #[arg(long = ARG_ROUTE_QUOTA_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) quota_db: Option<Utf8PathBuf>,
    /// Directions calls allowed per local day.
    #[arg(long = ARG_ROUTE_DAILY_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) daily_limit: Option<u32>,
    /// Identity the daily quota is scoped to.
    #[arg(long = ARG_ROUTE_PRINCIPAL, value_name = "name")]
    #[serde(default)]
    pub(crate) principal: Option<String>,
    /// JSON file of stored paratransit routes.
    #[arg(long = ARG_ROUTE_DEFINITIONS, value_name = "path")]
    #[serde(default)]
    pub(crate) route_definitions: Option<Utf8PathBuf>,
    /// Service region as `south,west,north,east` degrees.
    #[arg(long = ARG_ROUTE_REGION, value_name = "bounds")]
    #[serde(default)]
    pub(crate) region: Option<String>,
    /// Start coordinates as `lat,lng`, used when no fix is available.
    #[arg(long = ARG_ROUTE_START, value_name = "lat,lng")]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Request and rank alternative routes.
    #[arg(long = ARG_ROUTE_ALTERNATIVES, value_name = "bool")]
    #[serde(default)]
    pub(crate) alternatives: Option<bool>,
    /// Per-request timeout in seconds (default 12).
    #[arg(long = ARG_ROUTE_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Clone)]
pub(crate) struct RouteConfig {
    /// Path to the JSON itinerary.
    pub(crate) itinerary_path: Utf8PathBuf,
    /// Directions service credential.
    pub(crate) api_key: String,
    /// Directions service base URL.
    pub(crate) base_url: String,
    /// Quota log database.
    pub(crate) quota_db: Utf8PathBuf,
    /// Quota principal.
    pub(crate) principal: String,
    /// Optional stored route file.
    pub(crate) route_definitions: Option<Utf8PathBuf>,
    /// Region served by the resolver.
    pub(crate) region: ServiceRegion,
    /// Fallback start coordinate.
    pub(crate) start: Coord<f64>,
    /// Resolver tuning.
    pub(crate) resolver: ResolverConfig,
    /// Per-request timeout.
    pub(crate) timeout: Duration,
}

impl fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteConfig")
            .field("itinerary_path", &self.itinerary_path)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("quota_db", &self.quota_db)
            .field("principal", &self.principal)
            .field("route_definitions", &self.route_definitions)
            .field("region", &self.region)
            .field("start", &self.start)
            .field("resolver", &self.resolver)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RouteConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.itinerary_path, ARG_ROUTE_ITINERARY)?;
        if let Some(path) = &self.route_definitions {
            require_existing(path, ARG_ROUTE_DEFINITIONS)?;
        }
        Ok(())
    }
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let itinerary_path = args.itinerary_path.ok_or(CliError::MissingArgument {
            field: ARG_ROUTE_ITINERARY,
            env: ENV_ROUTE_ITINERARY,
        })?;
        let api_key = args
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_ROUTE_API_KEY,
                env: ENV_ROUTE_API_KEY,
            })?;
        let region = match args.region.as_deref() {
            Some(raw) => parse_region(raw)?,
            None => {
                let [south, west, north, east] = DEFAULT_REGION;
                ServiceRegion::from_bounds(south, west, north, east)
            }
        };
        let start = match args.start.as_deref() {
            Some(raw) => parse_lat_lng(ARG_ROUTE_START, raw)?,
            None => StartLocationConfig::default().fallback,
        };

        let defaults = ResolverConfig::default();
        let resolver = ResolverConfig {
            directions_daily_limit: args
                .daily_limit
                .unwrap_or(defaults.directions_daily_limit),
            request_alternatives: args.alternatives.unwrap_or(defaults.request_alternatives),
            ..defaults
        };

        Ok(Self {
            itinerary_path,
            api_key,
            base_url: args.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            quota_db: args
                .quota_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_QUOTA_DB)),
            principal: args
                .principal
                .unwrap_or_else(|| DEFAULT_PRINCIPAL.to_owned()),
            route_definitions: args.route_definitions,
            region,
            start,
            resolver,
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

fn parse_numbers<const N: usize>(field: &'static str, raw: &str) -> Result<[f64; N], CliError> {
    let invalid = |reason: &str| CliError::InvalidValue {
        field,
        value: raw.to_owned(),
        reason: reason.to_owned(),
    };
    let values = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| invalid(&err.to_string()))?;
    let values: [f64; N] = values
        .try_into()
        .map_err(|_| invalid(&format!("expected {N} comma-separated numbers")))?;
    if values.iter().all(|value| value.is_finite()) {
        Ok(values)
    } else {
        Err(invalid("coordinates must be finite"))
    }
}

fn parse_lat_lng(field: &'static str, raw: &str) -> Result<Coord<f64>, CliError> {
    let [lat, lng] = parse_numbers::<2>(field, raw)?;
    Ok(Coord { x: lng, y: lat })
}

fn parse_region(raw: &str) -> Result<ServiceRegion, CliError> {
    let [south, west, north, east] = parse_numbers::<4>(ARG_ROUTE_REGION, raw)?;
    if south >= north || west >= east {
        return Err(CliError::InvalidValue {
            field: ARG_ROUTE_REGION,
            value: raw.to_owned(),
            reason: "south must be below north and west below east".to_owned(),
        });
    }
    Ok(ServiceRegion::from_bounds(south, west, north, east))
}

/// Builds the hop resolver for the current route invocation.
pub(crate) trait RouteResolverBuilder {
    fn build(&self, config: &RouteConfig) -> Result<Box<dyn HopResolver>, CliError>;
}

pub(crate) struct DefaultRouteResolverBuilder;

impl RouteResolverBuilder for DefaultRouteResolverBuilder {
    fn build(&self, config: &RouteConfig) -> Result<Box<dyn HopResolver>, CliError> {
        let provider = HttpDirectionsProvider::with_config(
            HttpDirectionsProviderConfig::new(config.api_key.clone())
                .with_base_url(config.base_url.clone())
                .with_timeout(config.timeout),
        )
        .map_err(|source| CliError::BuildDirectionsProvider {
            base_url: config.base_url.clone(),
            source,
        })?;
        let quota = QuotaGateway::new(SqliteQuotaLog::open(&config.quota_db)?, &config.principal);
        let resolver =
            TransitRouteResolver::new(provider, quota, config.region, config.resolver.clone());
        match &config.route_definitions {
            Some(path) => Ok(Box::new(
                resolver.with_route_definitions(load_route_store(path)?),
            )),
            None => Ok(Box::new(resolver)),
        }
    }
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &DefaultRouteResolverBuilder, &mut stdout)
}

pub(crate) fn run_route_with(
    args: RouteArgs,
    builder: &dyn RouteResolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let chains = execute_route(args, builder)?;
    write_json(writer, &chains)
}

fn execute_route(
    args: RouteArgs,
    builder: &dyn RouteResolverBuilder,
) -> Result<Vec<RouteChain>, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let days: Vec<DayPlan> = load_json(&config.itinerary_path, ARG_ROUTE_ITINERARY)?;
    let assembler = RouteChainAssembler::new(builder.build(&config)?);

    let ctx = RequestContext::new();
    let start = StartLocationResolver::new(UnavailableSensor, StartLocationConfig::new(config.start))
        .resolve(&ctx);
    info!(
        "routing {} day(s) from {:?} start {},{}",
        days.len(),
        start.source,
        start.location.y,
        start.location.x
    );
    let chains = assembler.assemble_all(&days, start.location, &ctx);
    report_incomplete(&chains, &config.itinerary_path);
    Ok(chains)
}

fn report_incomplete(chains: &[RouteChain], path: &Utf8Path) {
    let unresolved: usize = chains.iter().map(|chain| chain.failures().len()).sum();
    if unresolved > 0 {
        warn!("{unresolved} hop(s) in {path} could not be resolved");
    }
}
