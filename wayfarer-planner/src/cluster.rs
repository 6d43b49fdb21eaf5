//! Greedy proximity sequencing and round-robin day assignment.
//!
//! The tour is a heuristic, not an optimal travelling-salesman solution.
//! Dealing one global tour round-robin across days can put distant points on
//! the same day when there are many points and few days; that grouping is
//! kept as-is.

use geo::{Centroid, Coord, MultiPoint, Point};
use log::debug;
use wayfarer_core::{DayPlan, PointOfInterest, ScheduledStop, haversine_distance};

/// Orders points of interest and partitions them into day groups.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::PointOfInterest;
/// use wayfarer_planner::SpotClusterer;
///
/// let pois = vec![
///     PointOfInterest::new(1, "Fort", Coord { x: 123.905, y: 10.292 }),
///     PointOfInterest::new(2, "Cathedral", Coord { x: 123.902, y: 10.295 }),
///     PointOfInterest::new(3, "Temple", Coord { x: 123.870, y: 10.341 }),
/// ];
/// let days = SpotClusterer.partition(&pois, 2);
/// assert_eq!(days.len(), 2);
/// assert_eq!(days.iter().map(|day| day.stops.len()).sum::<usize>(), 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotClusterer;

impl SpotClusterer {
    /// Sequence `pois` into a single nearest-neighbour tour.
    ///
    /// The tour starts at the valid point nearest the centroid and always
    /// moves to the closest unvisited point; ties keep input order. Points
    /// without a finite location are appended after the tour in input
    /// order.
    #[must_use]
    pub fn order(&self, pois: &[PointOfInterest]) -> Vec<PointOfInterest> {
        let (valid, invalid): (Vec<_>, Vec<_>) = pois
            .iter()
            .partition(|poi| poi.valid_location().is_some());
        let located: Vec<(Coord<f64>, &PointOfInterest)> = valid
            .into_iter()
            .filter_map(|poi| poi.valid_location().map(|coord| (coord, poi)))
            .collect();

        let mut ordered: Vec<PointOfInterest> = nearest_neighbour_tour(&located)
            .into_iter()
            .cloned()
            .collect();
        ordered.extend(invalid.into_iter().cloned());
        ordered
    }

    /// Deal the tour round-robin into `day_count` days.
    ///
    /// Tour position `i` goes to day `i % day_count`. Days left without
    /// stops are omitted. A zero day count or an input with no valid
    /// location yields no days.
    #[must_use]
    pub fn partition(&self, pois: &[PointOfInterest], day_count: usize) -> Vec<DayPlan> {
        if day_count == 0 || pois.iter().all(|poi| poi.valid_location().is_none()) {
            debug!(
                "nothing to partition: {} points, {day_count} days",
                pois.len()
            );
            return Vec::new();
        }

        let mut buckets: Vec<Vec<ScheduledStop>> = vec![Vec::new(); day_count];
        for (position, poi) in self.order(pois).into_iter().enumerate() {
            if let Some(bucket) = buckets.get_mut(position % day_count) {
                bucket.push(ScheduledStop::unscheduled(poi));
            }
        }

        buckets
            .into_iter()
            .filter(|stops| !stops.is_empty())
            .enumerate()
            .map(|(day_index, stops)| DayPlan::new(day_index, stops))
            .collect()
    }
}

fn nearest_neighbour_tour<'a>(
    located: &[(Coord<f64>, &'a PointOfInterest)],
) -> Vec<&'a PointOfInterest> {
    let points: MultiPoint<f64> = located
        .iter()
        .map(|(coord, _)| Point::from(*coord))
        .collect();
    let Some(centroid) = points.centroid() else {
        return Vec::new();
    };

    let mut remaining: Vec<(Coord<f64>, &PointOfInterest)> = located.to_vec();
    let mut tour = Vec::with_capacity(remaining.len());
    let mut cursor = centroid.0;
    while let Some(next) = closest_index(&remaining, cursor) {
        let (coord, poi) = remaining.remove(next);
        tour.push(poi);
        cursor = coord;
    }
    tour
}

/// Index of the entry closest to `target`; the first wins on ties.
fn closest_index(entries: &[(Coord<f64>, &PointOfInterest)], target: Coord<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, (coord, _)) in entries.iter().enumerate() {
        let distance = haversine_distance(*coord, target);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((index, distance));
        }
    }
    best.map(|(index, _)| index)
}
