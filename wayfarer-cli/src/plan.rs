//! Plan command implementation for the Wayfarer CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfarer_core::{DayPlan, PointOfInterest, TimeSlot, TimeWindow};
use wayfarer_planner::{ItineraryPlanner, PlanRequest};

use crate::files::{load_json, require_existing, write_json};
use crate::{
    ARG_PLAN_DAYS, ARG_PLAN_END_TIME, ARG_PLAN_POIS, ARG_PLAN_START_DATE, ARG_PLAN_START_TIME,
    CliError, ENV_PLAN_POIS,
};

const DEFAULT_DAYS: usize = 1;
const DEFAULT_START_TIME: &str = "08:00";
const DEFAULT_END_TIME: &str = "18:00";

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Partition a JSON array of points of interest into days \
                 with a nearest-neighbour tour, then assign each stop a \
                 time slot and meal tag within the daily window. Prints \
                 the day plans as JSON.",
    about = "Plan a multi-day itinerary"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct PlanArgs {
    /// Path to a JSON array of points of interest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) pois_path: Option<Utf8PathBuf>,
    /// Number of days to spread the points over (default 1).
    #[arg(long = ARG_PLAN_DAYS, value_name = "count")]
    #[serde(default)]
    pub(crate) days: Option<usize>,
    /// Start of the daily window as HH:MM (default 08:00).
    #[arg(long = ARG_PLAN_START_TIME, value_name = "HH:MM")]
    #[serde(default)]
    pub(crate) start_time: Option<String>,
    /// End of the daily window as HH:MM (default 18:00).
    #[arg(long = ARG_PLAN_END_TIME, value_name = "HH:MM")]
    #[serde(default)]
    pub(crate) end_time: Option<String>,
    /// Date of the first day, used to date every day plan.
    #[arg(long = ARG_PLAN_START_DATE, value_name = "YYYY-MM-DD")]
    #[serde(default)]
    pub(crate) start_date: Option<NaiveDate>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON points file.
    pub(crate) pois_path: Utf8PathBuf,
    /// Number of days.
    pub(crate) day_count: usize,
    /// Daily sightseeing window.
    pub(crate) window: TimeWindow,
    /// Date of the first day.
    pub(crate) start_date: Option<NaiveDate>,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let pois_path = args.pois_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_POIS,
            env: ENV_PLAN_POIS,
        })?;
        let start = parse_slot(
            ARG_PLAN_START_TIME,
            args.start_time.as_deref().unwrap_or(DEFAULT_START_TIME),
        )?;
        let end = parse_slot(
            ARG_PLAN_END_TIME,
            args.end_time.as_deref().unwrap_or(DEFAULT_END_TIME),
        )?;
        let window = TimeWindow::new(start, end).map_err(CliError::InvalidWindow)?;
        Ok(Self {
            pois_path,
            day_count: args.days.unwrap_or(DEFAULT_DAYS),
            window,
            start_date: args.start_date,
        })
    }
}

fn parse_slot(field: &'static str, value: &str) -> Result<TimeSlot, CliError> {
    value
        .parse::<TimeSlot>()
        .map_err(|err| CliError::InvalidValue {
            field,
            value: value.to_owned(),
            reason: err.to_string(),
        })
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &mut stdout)
}

pub(crate) fn run_plan_with(args: PlanArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let days = execute_plan(&config)?;
    write_json(writer, &days)
}

pub(crate) fn execute_plan(config: &PlanConfig) -> Result<Vec<DayPlan>, CliError> {
    require_existing(&config.pois_path, ARG_PLAN_POIS)?;
    let pois: Vec<PointOfInterest> = load_json(&config.pois_path, ARG_PLAN_POIS)?;
    let request = PlanRequest {
        pois,
        day_count: config.day_count,
        window: config.window,
        start_date: config.start_date,
    };
    let days = ItineraryPlanner::new().plan_request(&request);
    info!(
        "planned {} point(s) over {} day(s)",
        request.pois.len(),
        days.len()
    );
    Ok(days)
}
