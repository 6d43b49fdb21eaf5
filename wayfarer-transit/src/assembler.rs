//! Per-day route chains.

use geo::Coord;
use log::{info, warn};
use wayfarer_core::{ChainHop, DayPlan, HopError, HopKind, RequestContext, RouteChain, Waypoint};

use crate::HopResolver;

/// Label given to the traveller's starting point.
const START_LABEL: &str = "Start";

/// Stitches a day's stops, meals and lodging into a [`RouteChain`].
///
/// Hops are resolved one after another, in travel order:
///
/// 1. start → first stop;
/// 2. for each stop with a meal tag and a chosen restaurant, stop → food
///    and, unless it is the last stop, food → next stop; otherwise
///    stop → next stop;
/// 3. last stop → lodging, when the day has one.
///
/// A failing hop is recorded as a placeholder and assembly continues, so
/// the chain always has one entry per hop. Once the request context is
/// cancelled the remaining hops are recorded as cancelled without reaching
/// the resolver.
#[derive(Debug, Clone)]
pub struct RouteChainAssembler<R> {
    resolver: R,
}

struct PlannedHop {
    kind: HopKind,
    from: Waypoint,
    to: Waypoint,
}

impl<R: HopResolver> RouteChainAssembler<R> {
    /// Assembler resolving hops through `resolver`.
    #[must_use]
    pub const fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Borrow the underlying resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Build the chain for `day` starting from `start`.
    ///
    /// A day without stops yields an empty chain.
    #[must_use]
    pub fn assemble(&self, day: &DayPlan, start: Coord<f64>, ctx: &RequestContext) -> RouteChain {
        let mut chain = RouteChain::new(day.day_index);
        for hop in plan_hops(day, start) {
            let outcome = if ctx.is_done() {
                Err(HopError::Cancelled)
            } else {
                self.resolver.resolve_hop(&hop.from, &hop.to, ctx)
            };
            if let Err(error) = &outcome {
                warn!(
                    "day {} hop {:?} {} -> {} unresolved: {error}",
                    day.day_index, hop.kind, hop.from, hop.to
                );
            }
            chain.push(ChainHop::from_outcome(hop.kind, hop.from, hop.to, outcome));
        }
        info!(
            "day {}: {} hop(s), {} unresolved, {} s total",
            day.day_index,
            chain.len(),
            chain.failures().len(),
            chain.total_duration_seconds()
        );
        chain
    }

    /// Build chains for several days from the same start.
    #[must_use]
    pub fn assemble_all(
        &self,
        days: &[DayPlan],
        start: Coord<f64>,
        ctx: &RequestContext,
    ) -> Vec<RouteChain> {
        days.iter()
            .map(|day| self.assemble(day, start, ctx))
            .collect()
    }
}

fn plan_hops(day: &DayPlan, start: Coord<f64>) -> Vec<PlannedHop> {
    let Some(first) = day.stops.first() else {
        return Vec::new();
    };
    let mut hops = vec![PlannedHop {
        kind: HopKind::StartToStop,
        from: Waypoint::named(START_LABEL, start),
        to: Waypoint::from_stop(first),
    }];

    for (index, stop) in day.stops.iter().enumerate() {
        let here = Waypoint::from_stop(stop);
        let next = day.stops.get(index + 1).map(Waypoint::from_stop);
        match stop.chosen_food.as_ref().filter(|_| stop.meal_type.is_meal()) {
            Some(food) => {
                let restaurant = Waypoint::from_place(food);
                hops.push(PlannedHop {
                    kind: HopKind::StopToFood,
                    from: here,
                    to: restaurant.clone(),
                });
                if let Some(next) = next {
                    hops.push(PlannedHop {
                        kind: HopKind::FoodToStop,
                        from: restaurant,
                        to: next,
                    });
                }
            }
            None => {
                if let Some(next) = next {
                    hops.push(PlannedHop {
                        kind: HopKind::StopToStop,
                        from: here,
                        to: next,
                    });
                }
            }
        }
    }

    if let (Some(last), Some(lodging)) = (day.stops.last(), day.lodging()) {
        hops.push(PlannedHop {
            kind: HopKind::StopToLodging,
            from: Waypoint::from_stop(last),
            to: Waypoint::from_place(lodging),
        });
    }
    hops
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use rstest::{fixture, rstest};
    use wayfarer_core::{
        MealType, Place, PointOfInterest, ResolutionStatus, RouteSegment, ScheduledStop,
        TransitRoute, TravelMode,
    };

    /// Resolver returning a one-segment bus route, or scripted failures for
    /// selected call numbers.
    #[derive(Default)]
    struct RecordingResolver {
        failures: Vec<(usize, HopError)>,
        calls: RefCell<Vec<(String, String)>>,
        cancel_after: Option<(usize, RequestContext)>,
    }

    impl HopResolver for RecordingResolver {
        fn resolve_hop(
            &self,
            from: &Waypoint,
            to: &Waypoint,
            _ctx: &RequestContext,
        ) -> Result<Vec<TransitRoute>, HopError> {
            let call = self.calls.borrow().len();
            self.calls.borrow_mut().push((from.to_string(), to.to_string()));
            if let Some((after, ctx)) = &self.cancel_after {
                if call + 1 == *after {
                    ctx.cancel();
                }
            }
            if let Some((_, error)) = self.failures.iter().find(|(at, _)| *at == call) {
                return Err(error.clone());
            }
            Ok(vec![TransitRoute::new(vec![RouteSegment::resolved(
                from.clone(),
                to.clone(),
                TravelMode::Bus,
                600,
                2_000,
            )])])
        }
    }

    fn stop(id: u64, name: &str, y: f64) -> ScheduledStop {
        ScheduledStop::unscheduled(PointOfInterest::new(id, name, Coord { x: 123.9, y }))
    }

    #[fixture]
    fn day() -> DayPlan {
        DayPlan::new(
            0,
            vec![stop(1, "Fort", 10.29), stop(2, "Museum", 10.30), stop(3, "Temple", 10.34)],
        )
    }

    fn start() -> Coord<f64> {
        Coord { x: 123.8854, y: 10.3157 }
    }

    fn kinds(chain: &RouteChain) -> Vec<HopKind> {
        chain.hops.iter().map(|hop| hop.kind).collect()
    }

    #[rstest]
    fn plain_day_has_one_hop_per_stop(day: DayPlan) {
        let resolver = RecordingResolver::default();
        let chain = RouteChainAssembler::new(&resolver).assemble(&day, start(), &RequestContext::new());

        assert_eq!(
            kinds(&chain),
            vec![HopKind::StartToStop, HopKind::StopToStop, HopKind::StopToStop]
        );
        assert!(chain.is_complete());
        assert_eq!(chain.total_duration_seconds(), 1_800);
        assert_eq!(resolver.calls.borrow()[0], ("Start".to_owned(), "Fort".to_owned()));
    }

    #[rstest]
    fn meals_and_lodging_add_hops(mut day: DayPlan) {
        day.stops[1].meal_type = MealType::Lunch;
        day.stops[1].chosen_food = Some(Place::new("Carinderia", Coord { x: 123.91, y: 10.31 }));
        day.chosen_lodging = Some(Place::new("Inn", Coord { x: 123.92, y: 10.35 }));

        let resolver = RecordingResolver::default();
        let chain = RouteChainAssembler::new(&resolver).assemble(&day, start(), &RequestContext::new());

        assert_eq!(
            kinds(&chain),
            vec![
                HopKind::StartToStop,
                HopKind::StopToStop,
                HopKind::StopToFood,
                HopKind::FoodToStop,
                HopKind::StopToLodging,
            ]
        );
        assert_eq!(chain.hops[3].from.name.as_deref(), Some("Carinderia"));
        assert_eq!(chain.hops[3].to.name.as_deref(), Some("Temple"));
        assert_eq!(chain.hops[4].from.name.as_deref(), Some("Temple"));
    }

    #[rstest]
    fn food_without_meal_tag_is_ignored(mut day: DayPlan) {
        day.stops[0].chosen_food = Some(Place::new("Cafe", Coord { x: 123.91, y: 10.31 }));
        let resolver = RecordingResolver::default();
        let chain = RouteChainAssembler::new(&resolver).assemble(&day, start(), &RequestContext::new());
        assert_eq!(chain.len(), 3);
    }

    #[rstest]
    fn meal_at_last_stop_has_no_return_hop(mut day: DayPlan) {
        day.stops[2].meal_type = MealType::Dinner;
        day.stops[2].chosen_food = Some(Place::new("Grill", Coord { x: 123.91, y: 10.35 }));
        let resolver = RecordingResolver::default();
        let chain = RouteChainAssembler::new(&resolver).assemble(&day, start(), &RequestContext::new());
        assert_eq!(kinds(&chain).last(), Some(&HopKind::StopToFood));
        assert_eq!(chain.len(), 4);
    }

    #[rstest]
    fn failed_hop_keeps_chain_length(day: DayPlan) {
        let resolver = RecordingResolver {
            failures: vec![(
                1,
                HopError::ProviderError {
                    message: "HTTP 503".into(),
                },
            )],
            ..RecordingResolver::default()
        };
        let chain = RouteChainAssembler::new(&resolver).assemble(&day, start(), &RequestContext::new());

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.hops[1].status, ResolutionStatus::ProviderError);
        assert_eq!(chain.hops[1].segments.len(), 1);
        assert!(chain.hops[0].is_resolved());
        assert!(chain.hops[2].is_resolved());
        assert_eq!(chain.failures().len(), 1);
        assert_eq!(chain.total_duration_seconds(), 1_200);
    }

    #[rstest]
    fn cancellation_skips_remaining_hops(day: DayPlan) {
        let ctx = RequestContext::new();
        let resolver = RecordingResolver {
            cancel_after: Some((1, ctx.clone())),
            ..RecordingResolver::default()
        };
        let chain = RouteChainAssembler::new(&resolver).assemble(&day, start(), &ctx);

        assert_eq!(chain.len(), 3);
        assert!(chain.hops[0].is_resolved());
        assert_eq!(chain.hops[2].status, ResolutionStatus::ProviderError);
        assert_eq!(resolver.calls.borrow().len(), 1);
    }

    #[rstest]
    fn empty_day_has_empty_chain() {
        let resolver = RecordingResolver::default();
        let chain = RouteChainAssembler::new(&resolver).assemble(
            &DayPlan::new(4, Vec::new()),
            start(),
            &RequestContext::new(),
        );
        assert!(chain.is_empty());
        assert_eq!(chain.day_index, 4);
    }

    #[rstest]
    fn assembles_every_day(day: DayPlan) {
        let mut second = day.clone();
        second.day_index = 1;
        second.stops.truncate(1);
        let resolver = RecordingResolver::default();
        let chains = RouteChainAssembler::new(&resolver).assemble_all(
            &[day, second],
            start(),
            &RequestContext::new(),
        );
        let lengths: Vec<usize> = chains.iter().map(RouteChain::len).collect();
        assert_eq!(lengths, vec![3, 1]);
    }
}
