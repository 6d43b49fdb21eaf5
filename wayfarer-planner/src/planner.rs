//! Memoised clustering and scheduling.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Days, NaiveDate};
use log::debug;
use serde::Deserialize;
use wayfarer_core::{DayPlan, PointOfInterest, TimeWindow};

use crate::{SpotClusterer, TimeSlotScheduler};

/// Everything needed to plan a trip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanRequest {
    /// Points of interest to visit.
    pub pois: Vec<PointOfInterest>,
    /// Number of days to spread them over.
    pub day_count: usize,
    /// Daily sightseeing window.
    pub window: TimeWindow,
    /// First day of the trip, used to date each day.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PlanKey {
    fingerprint: u64,
    day_count: usize,
    window: TimeWindow,
}

/// Stored plan together with the points it was computed from.
#[derive(Debug)]
struct CachedPlan {
    pois: Vec<PointOfInterest>,
    days: Vec<DayPlan>,
}

/// Cluster-then-schedule pipeline with a result cache.
///
/// Results are keyed by a fingerprint of the point set together with the
/// day count and window, so changing either parameter produces a fresh
/// plan while repeated requests reuse the cached one. A hit only counts
/// when the stored points equal the requested ones, so fingerprint
/// collisions and catalogue edits never serve a stale plan.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{PointOfInterest, TimeWindow};
/// use wayfarer_planner::ItineraryPlanner;
///
/// let pois = vec![
///     PointOfInterest::new(1, "Fort", Coord { x: 123.905, y: 10.292 }),
///     PointOfInterest::new(2, "Museum", Coord { x: 123.901, y: 10.294 }),
/// ];
/// let window = TimeWindow::new("08:00".parse()?, "18:00".parse()?)?;
///
/// let mut planner = ItineraryPlanner::new();
/// let days = planner.plan(&pois, 1, window);
/// assert_eq!(days[0].stops.len(), 2);
/// assert_eq!(planner.cached_plans(), 1);
/// # Ok::<(), wayfarer_core::ItineraryError>(())
/// ```
#[derive(Debug, Default)]
pub struct ItineraryPlanner {
    clusterer: SpotClusterer,
    scheduler: TimeSlotScheduler,
    cache: HashMap<PlanKey, CachedPlan>,
}

impl ItineraryPlanner {
    /// Planner with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition `pois` into days and schedule each day.
    pub fn plan(
        &mut self,
        pois: &[PointOfInterest],
        day_count: usize,
        window: TimeWindow,
    ) -> Vec<DayPlan> {
        let key = PlanKey {
            fingerprint: fingerprint(pois),
            day_count,
            window,
        };
        if let Some(cached) = self.cache.get(&key) {
            if cached.pois.as_slice() == pois {
                debug!("reusing cached plan for {} points over {day_count} days", pois.len());
                return cached.days.clone();
            }
            debug!("plan cache slot holds other points; replanning");
        }
        let mut days = self.clusterer.partition(pois, day_count);
        self.scheduler.schedule_all(&mut days, window);
        self.cache.insert(
            key,
            CachedPlan {
                pois: pois.to_vec(),
                days: days.clone(),
            },
        );
        days
    }

    /// Plan a [`PlanRequest`], dating each day from its start date.
    pub fn plan_request(&mut self, request: &PlanRequest) -> Vec<DayPlan> {
        let mut days = self.plan(&request.pois, request.day_count, request.window);
        if let Some(start) = request.start_date {
            for day in &mut days {
                day.date = u64::try_from(day.day_index)
                    .ok()
                    .and_then(|offset| start.checked_add_days(Days::new(offset)));
            }
        }
        days
    }

    /// Drop every cached plan.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Number of cached plans.
    #[must_use]
    pub fn cached_plans(&self) -> usize {
        self.cache.len()
    }
}

/// Order-sensitive hash of the fields that influence clustering.
///
/// Only selects the cache slot; hits are confirmed by comparing points.
fn fingerprint(pois: &[PointOfInterest]) -> u64 {
    let mut hasher = DefaultHasher::new();
    pois.len().hash(&mut hasher);
    for poi in pois {
        poi.id.hash(&mut hasher);
        poi.location
            .map(|coord| (coord.x.to_bits(), coord.y.to_bits()))
            .hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(
            start.parse().expect("valid start"),
            end.parse().expect("valid end"),
        )
        .expect("valid window")
    }

    #[fixture]
    fn pois() -> Vec<PointOfInterest> {
        (0..4_u32)
            .map(|i| {
                PointOfInterest::new(
                    u64::from(i),
                    format!("poi-{i}"),
                    Coord {
                        x: 123.9 + f64::from(i) * 0.01,
                        y: 10.3,
                    },
                )
            })
            .collect()
    }

    #[rstest]
    fn caches_by_parameters(pois: Vec<PointOfInterest>) {
        let mut planner = ItineraryPlanner::new();
        let first = planner.plan(&pois, 2, window("08:00", "18:00"));
        let again = planner.plan(&pois, 2, window("08:00", "18:00"));
        assert_eq!(first, again);
        assert_eq!(planner.cached_plans(), 1);

        let fewer_days = planner.plan(&pois, 1, window("08:00", "18:00"));
        assert_eq!(fewer_days.len(), 1);
        planner.plan(&pois, 2, window("09:00", "17:00"));
        assert_eq!(planner.cached_plans(), 3);

        planner.invalidate();
        assert_eq!(planner.cached_plans(), 0);
    }

    #[rstest]
    fn point_changes_change_the_fingerprint(pois: Vec<PointOfInterest>) {
        let mut moved = pois.clone();
        moved[0].location = Some(Coord { x: 124.0, y: 10.0 });
        assert_ne!(fingerprint(&pois), fingerprint(&moved));

        let mut reordered = pois.clone();
        reordered.swap(0, 1);
        assert_ne!(fingerprint(&pois), fingerprint(&reordered));
    }

    #[rstest]
    fn colliding_slot_is_replanned(pois: Vec<PointOfInterest>) {
        let mut planner = ItineraryPlanner::new();
        let daily = window("08:00", "18:00");
        let stale_points = vec![PointOfInterest::new(99, "Elsewhere", Coord { x: 0.0, y: 0.0 })];
        let stale_days = planner.plan(&stale_points, 1, daily);
        let key = PlanKey {
            fingerprint: fingerprint(&pois),
            day_count: 1,
            window: daily,
        };
        planner.cache.insert(
            key,
            CachedPlan {
                pois: stale_points,
                days: stale_days.clone(),
            },
        );

        let days = planner.plan(&pois, 1, daily);

        assert_ne!(days, stale_days);
        let ids: Vec<u64> = days[0].stops.iter().map(|stop| stop.poi.id).collect();
        assert_eq!(ids.len(), pois.len());
        assert!(!ids.contains(&99));
    }

    #[rstest]
    fn catalogue_edits_refresh_cached_stops(pois: Vec<PointOfInterest>) {
        let mut planner = ItineraryPlanner::new();
        let daily = window("08:00", "18:00");
        planner.plan(&pois, 1, daily);

        let mut edited = pois.clone();
        edited[0].default_duration_minutes = Some(45);
        assert_eq!(fingerprint(&pois), fingerprint(&edited));

        let days = planner.plan(&edited, 1, daily);
        let stop = days[0]
            .stops
            .iter()
            .find(|stop| stop.poi.id == edited[0].id)
            .expect("edited point is planned");
        assert_eq!(stop.poi.default_duration_minutes, Some(45));
        assert_eq!(planner.cached_plans(), 1);
    }

    #[rstest]
    fn dates_days_from_start(pois: Vec<PointOfInterest>) {
        let request = PlanRequest {
            pois,
            day_count: 2,
            window: window("08:00", "18:00"),
            start_date: NaiveDate::from_ymd_opt(2025, 12, 31),
        };
        let days = ItineraryPlanner::new().plan_request(&request);
        let dates: Vec<Option<NaiveDate>> = days.iter().map(|day| day.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 12, 31),
                NaiveDate::from_ymd_opt(2026, 1, 1),
            ]
        );
    }

    #[rstest]
    fn request_deserialises_from_json() {
        let request: PlanRequest = serde_json::from_str(
            r#"{
                "pois": [{"id": 1, "name": "Fort", "location": {"x": 123.905, "y": 10.292}}],
                "day_count": 1,
                "window": {"start": "08:00", "end": "18:00"}
            }"#,
        )
        .expect("decode request");
        assert_eq!(request.pois.len(), 1);
        assert!(request.start_date.is_none());
    }
}
