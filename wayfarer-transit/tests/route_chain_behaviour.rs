//! Behavioural tests for resolving and assembling a day's route chain.

use std::cell::RefCell;

use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use wayfarer_core::test_support::{
    ManualClock, ScriptedDirectionsProvider, route, transit_step, walk_step,
};
use wayfarer_core::{
    DayPlan, DirectionsError, MemoryQuotaLog, PointOfInterest, ProviderRoute, QuotaGateway,
    RequestContext, RouteChain, ScheduledStop, ServiceRegion,
};
use wayfarer_transit::{ResolverConfig, RouteChainAssembler, TransitRouteResolver};

const START: Coord<f64> = Coord {
    x: 123.8854,
    y: 10.3157,
};

#[derive(Debug)]
struct ChainWorld {
    day: RefCell<DayPlan>,
    provider: RefCell<ScriptedDirectionsProvider>,
    daily_limit: RefCell<u32>,
    chain: RefCell<Option<RouteChain>>,
}

impl ChainWorld {
    fn chain_status(&self, hop: usize) -> String {
        let chain = self.chain.borrow();
        let chain = chain.as_ref().expect("chain assembled");
        let status = chain.hops.get(hop - 1).expect("hop exists").status;
        serde_json::to_value(status)
            .expect("status serialises")
            .as_str()
            .expect("status is a string")
            .to_owned()
    }
}

fn jeepney(from: Coord<f64>, to: Coord<f64>) -> ProviderRoute {
    route(vec![
        walk_step(from, from, 60, 50),
        transit_step(from, to, 900, 3_500, Some("04L Lahug - Carbon"), Some("04L")),
    ])
}

#[fixture]
fn world() -> ChainWorld {
    ChainWorld {
        day: RefCell::new(DayPlan::new(0, Vec::new())),
        provider: RefCell::new(ScriptedDirectionsProvider::default()),
        daily_limit: RefCell::new(100),
        chain: RefCell::new(None),
    }
}

#[given("a day visiting {count:u32} stops in Cebu")]
fn given_day(world: &ChainWorld, count: u32) {
    let stops = (1..=count)
        .map(|id| {
            let poi = PointOfInterest::new(
                u64::from(id),
                format!("stop-{id}"),
                Coord {
                    x: 123.89 + f64::from(id) * 0.005,
                    y: 10.29 + f64::from(id) * 0.01,
                },
            );
            ScheduledStop::unscheduled(poi)
        })
        .collect();
    world.day.replace(DayPlan::new(0, stops));
}

#[given("stop {index:usize} lies in Manila")]
fn given_stop_in_manila(world: &ChainWorld, index: usize) {
    let mut day = world.day.borrow_mut();
    let stop = day.stop_mut(index - 1).expect("stop exists");
    stop.poi.location = Some(Coord { x: 120.98, y: 14.60 });
}

#[given("a directions provider that always finds a jeepney")]
fn given_reliable_provider(world: &ChainWorld) {
    world
        .provider
        .replace(ScriptedDirectionsProvider::always(Ok(vec![jeepney(
            START,
            Coord { x: 123.9, y: 10.3 },
        )])));
}

#[given("a directions provider that fails on call {call:usize}")]
fn given_flaky_provider(world: &ChainWorld, call: usize) {
    let responses = (1..=10).map(|n| {
        if n == call {
            Err(DirectionsError::HttpError {
                url: "https://maps.example/directions".to_owned(),
                status: 503,
                message: "service unavailable".to_owned(),
            })
        } else {
            Ok(vec![jeepney(START, Coord { x: 123.9, y: 10.3 })])
        }
    });
    world
        .provider
        .replace(ScriptedDirectionsProvider::new(responses));
}

#[given("a daily directions limit of {limit:u32}")]
fn given_limit(world: &ChainWorld, limit: u32) {
    world.daily_limit.replace(limit);
}

#[when("the route chain is assembled")]
fn when_assembled(world: &ChainWorld) {
    let gateway = QuotaGateway::with_clock(
        MemoryQuotaLog::new(),
        ManualClock::at("2025-03-14T09:00:00+08:00"),
        "traveller",
    );
    let resolver = TransitRouteResolver::new(
        world.provider.borrow().clone(),
        gateway,
        ServiceRegion::from_bounds(9.4, 123.2, 11.3, 124.1),
        ResolverConfig::default().with_daily_limit(*world.daily_limit.borrow()),
    );
    let chain = RouteChainAssembler::new(resolver).assemble(
        &world.day.borrow(),
        START,
        &RequestContext::new(),
    );
    world.chain.replace(Some(chain));
}

#[then("the chain has {count:usize} hops")]
fn then_hop_count(world: &ChainWorld, count: usize) {
    let chain = world.chain.borrow();
    assert_eq!(chain.as_ref().map(RouteChain::len), Some(count));
}

#[then("every hop is resolved")]
fn then_all_resolved(world: &ChainWorld) {
    let chain = world.chain.borrow();
    assert!(chain.as_ref().is_some_and(RouteChain::is_complete));
}

#[then("hop {hop:usize} has status {status}")]
fn then_hop_status(world: &ChainWorld, hop: usize, status: String) {
    assert_eq!(world.chain_status(hop), status.trim_matches('"'));
}

#[then("the provider was called {count:usize} times")]
fn then_provider_calls(world: &ChainWorld, count: usize) {
    assert_eq!(world.provider.borrow().calls(), count);
}

#[scenario(path = "tests/features/route_chain.feature", index = 0)]
fn plain_day(world: ChainWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_chain.feature", index = 1)]
fn provider_failure(world: ChainWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_chain.feature", index = 2)]
fn spent_budget(world: ChainWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/route_chain.feature", index = 3)]
fn out_of_region_stop(world: ChainWorld) {
    let _ = world;
}
